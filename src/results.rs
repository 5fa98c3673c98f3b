/*!
Control the appearance of trial result data

# Working with [`ResultsBuilder`]

## Examples

Creating a [`ResultsTable`] after running a batch of trials:

```
use std::num::NonZeroUsize;

use fiftyone_sim::prelude::*;

let trials = Trials::new(
    SimulatorBuilder::new(),
    Scenario::AttackDoubleSpend,
    NonZeroUsize::new(4).unwrap(),
    0,
);

let results = trials
    .run_all()
    .unwrap()
    .format(Format::CSV) // Output results as CSV
    .build();

println!("{}", results);
```
*/

use std::fmt::Display;

use crate::{scenario::Scenario, simulation::TrialOutput};

/// Builder for [`ResultsTable`]. Produced by running
/// [`Trials`](crate::simulation::Trials).
#[derive(Debug, Clone)]
pub struct ResultsBuilder {
    scenario: Scenario,
    data: Vec<TrialOutput>,
    format: Format,
}

/// Describes the appearance of a [`ResultsTable`] table as given by its
/// [`Display`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Comma-separated, without extra whitespace.
    CSV,
    /// Human-readable.
    #[default]
    PrettyPrint,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::CSV),
            "pretty" => Ok(Self::PrettyPrint),
            other => Err(format!("unknown output format `{}`", other)),
        }
    }
}

/// Counts over every trial in a [`ResultsBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub runs: usize,
    /// Trials in which a double spend was detected.
    pub unsafe_runs: usize,
    /// Trials in which the majority-run heuristic fired.
    pub suspected_runs: usize,
    /// Trials in which the heuristic and the double-spend check disagree.
    pub disagreements: usize,
}

impl ResultsBuilder {
    pub(crate) fn new(scenario: Scenario, data: Vec<TrialOutput>) -> Self {
        Self { scenario, data, format: Format::default() }
    }

    /// Raw trial data, ordered by seed.
    pub fn data(&self) -> &[TrialOutput] {
        &self.data
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            runs: self.data.len(),
            unsafe_runs: 0,
            suspected_runs: 0,
            disagreements: 0,
        };

        for trial in &self.data {
            let unsafe_run = !trial.report.is_safe();
            let suspected = trial.report.suspected_majority.is_some();
            summary.unsafe_runs += unsafe_run as usize;
            summary.suspected_runs += suspected as usize;
            summary.disagreements += (unsafe_run != suspected) as usize;
        }

        summary
    }

    /// Specify the [`Format`] of the results table.
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;

        self
    }

    /// Create new [`ResultsTable`].
    pub fn build(self) -> ResultsTable {
        let summary = self.summary();
        let ResultsBuilder { scenario, data, format } = self;

        let rows = data
            .iter()
            .map(|trial| {
                vec![
                    scenario.number().to_string(),
                    trial.seed.to_string(),
                    trial.public_len.to_string(),
                    trial.private_len.to_string(),
                    trial
                        .report
                        .suspected_majority
                        .map(|m| m.to_string())
                        .unwrap_or_default(),
                    trial
                        .report
                        .double_spend
                        .map(|c| c.output.to_string())
                        .unwrap_or_default(),
                    trial.report.is_safe().to_string(),
                ]
            })
            .collect();

        ResultsTable { format, rows, summary }
    }
}

/// Formatted results from the completion of
/// [`Trials`](crate::simulation::Trials). The results table is given by the
/// struct's [`Display`] implementation, as specified by its [`Format`].
pub struct ResultsTable {
    format: Format,
    rows: Vec<Vec<String>>,
    summary: Summary,
}

impl ResultsTable {
    const SEPARATOR_VERTICAL: char = '|';
    const SEPARATOR_HORIZONTAL: char = '-';
    const TITLES: [&'static str; 7] = [
        "Scenario",
        "Seed",
        "Public Blocks",
        "Private Blocks",
        "Suspected Miner",
        "Double Spent Output",
        "Safe",
    ];

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }
}

impl Display for ResultsTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.format {
            Format::CSV => {
                write!(f, "{}", Self::TITLES.join(","))?;

                for row in self.rows.iter() {
                    writeln!(f)?;
                    write!(f, "{}", row.join(","))?;
                }
            }
            Format::PrettyPrint => {
                let mut text_widths: Vec<_> =
                    Self::TITLES.iter().map(|title| title.len()).collect();

                for row in self.rows.iter() {
                    for (i, val) in row.iter().enumerate() {
                        text_widths[i] = text_widths[i].max(val.len());
                    }
                }

                for (i, title) in Self::TITLES.iter().enumerate() {
                    write!(
                        f,
                        " {:1$} {2}",
                        title,
                        text_widths[i],
                        Self::SEPARATOR_VERTICAL
                    )?;
                }
                writeln!(f)?;

                let total_width: usize =
                    text_widths.iter().map(|x| x + 3).sum();
                for _ in 0..total_width {
                    write!(f, "{}", Self::SEPARATOR_HORIZONTAL)?;
                }

                for row in self.rows.iter() {
                    writeln!(f)?;

                    for (i, val) in row.iter().enumerate() {
                        write!(
                            f,
                            " {:1$} {2}",
                            val,
                            text_widths[i],
                            Self::SEPARATOR_VERTICAL
                        )?;
                    }
                }

                let Summary {
                    runs,
                    unsafe_runs,
                    suspected_runs,
                    disagreements,
                } = self.summary;
                writeln!(f)?;
                writeln!(f)?;
                write!(
                    f,
                    "{} runs: {} unsafe, {} suspected, {} where the checks \
                     disagree",
                    runs, unsafe_runs, suspected_runs, disagreements
                )?;
            }
        }

        Ok(())
    }
}
