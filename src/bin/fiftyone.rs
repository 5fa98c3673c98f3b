use std::{io::Write, num::NonZeroUsize};

use anyhow::{Context, Result};
use clap::Parser;
use fiftyone_sim::prelude::*;
use tracing_subscriber::EnvFilter;

/// Simulate honest mining and 51% attacks, then check the chains for double
/// spending.
#[derive(Parser, Debug)]
#[command(name = "fiftyone")]
struct Cli {
    /// Scenario to run (1-4). Prompts for a choice when omitted.
    choice: Option<String>,

    /// Seed for miner selection and transaction content
    #[arg(long)]
    seed: Option<u64>,

    /// Number of miners in the network
    #[arg(long, default_value_t = SimulatorBuilder::DEFAULT_MINERS)]
    miners: usize,

    /// Id of the attacking miner
    #[arg(long, default_value_t = SimulatorBuilder::DEFAULT_ATTACKER)]
    attacker: usize,

    /// How honest blocks are assigned to miners: random or round-robin
    #[arg(long, default_value = "random")]
    selection: MinerSelection,

    /// Use sequential transaction ids and outputs instead of random ones
    #[arg(long)]
    sequential: bool,

    /// Repeat the scenario this many times with consecutive seeds and print
    /// a results table
    #[arg(long)]
    trials: Option<NonZeroUsize>,

    /// Results table format for --trials: pretty or csv
    #[arg(long, default_value = "pretty")]
    format: Format,
}

fn prompt(attacker: usize) -> Result<String> {
    println!("Choose an option:");
    for scenario in Scenario::ALL {
        println!(
            "{}) {}: {}",
            scenario.number(),
            scenario,
            scenario.describe(attacker)
        );
    }
    print!("Enter your choice (1, 2, 3, or 4): ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("could not read a choice from stdin")?;

    Ok(line)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let token = match cli.choice {
        Some(choice) => choice,
        None => prompt(cli.attacker)?,
    };
    let scenario: Scenario = token.parse()?;

    let mut builder = SimulatorBuilder::new()
        .miners(cli.miners)
        .attacker(cli.attacker.into())
        .selection(cli.selection);
    if cli.sequential {
        builder = builder.source(SequentialTransactions::new());
    }

    if let Some(runs) = cli.trials {
        let base_seed = cli.seed.unwrap_or_else(rand::random);
        let results = Trials::new(builder, scenario, runs, base_seed)
            .run_all()?
            .format(cli.format)
            .build();
        println!("{}", results);

        return Ok(());
    }

    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    let mut sim = builder.build()?;
    sim.run(scenario)?;

    println!(
        "{}: {} (seed {})",
        scenario,
        scenario.describe(sim.attacker()),
        sim.seed()
    );
    if !sim.private().is_empty() {
        println!("\nAttacker's private chain:\n{}", sim.private());
    }
    println!("\nPublic chain:\n{}", sim.public());

    let report = SafeModeDetector::default().detect(&sim);
    println!("\nSafe Mode Detection:\n{}", report);

    Ok(())
}
