//! The scenarios a simulation can run

use std::{fmt::Display, str::FromStr};

/// Blocks mined on the public chain in an honest-only run.
pub const HONEST_RUN_BLOCKS: usize = 5;
/// Blocks mined on the public chain while an attack is underway.
pub const ATTACK_HONEST_BLOCKS: usize = 3;
/// Length of the attacker's private chain.
pub const LONG_PRIVATE_CHAIN: usize = 6;
/// Length of the attacker's private chain when a short chain is requested.
pub const SHORT_PRIVATE_CHAIN: usize = 3;

/// How the attacker builds its private chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttackPlan {
    /// Spend the contested output in the first private block.
    pub double_spend: bool,
    /// Mine [`SHORT_PRIVATE_CHAIN`] instead of [`LONG_PRIVATE_CHAIN`] blocks.
    pub short_chain: bool,
}

impl AttackPlan {
    /// Number of blocks the attacker mines on the private chain.
    pub fn private_blocks(&self) -> usize {
        if self.short_chain {
            SHORT_PRIVATE_CHAIN
        } else {
            LONG_PRIVATE_CHAIN
        }
    }
}

/// One of the four selectable simulation scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// 1: no attacker, honest miners only.
    Honest,
    /// 2: the attacker mines a private chain without double spending.
    Attack,
    /// 3: the attacker double spends on a long private chain.
    AttackDoubleSpend,
    /// 4: the attacker double spends on a short private chain.
    AttackDoubleSpendShortChain,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioParseError {
    #[error("invalid choice `{0}`, please select either 1, 2, 3, or 4")]
    InvalidSelection(String),
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Honest,
        Scenario::Attack,
        Scenario::AttackDoubleSpend,
        Scenario::AttackDoubleSpendShortChain,
    ];

    /// Returns the attack carried out in this scenario, or `None` if every
    /// miner is honest.
    pub fn attack_plan(&self) -> Option<AttackPlan> {
        match self {
            Self::Honest => None,
            Self::Attack => Some(AttackPlan::default()),
            Self::AttackDoubleSpend => {
                Some(AttackPlan { double_spend: true, short_chain: false })
            }
            Self::AttackDoubleSpendShortChain => {
                Some(AttackPlan { double_spend: true, short_chain: true })
            }
        }
    }

    /// The menu number of this scenario.
    pub fn number(&self) -> usize {
        match self {
            Self::Honest => 1,
            Self::Attack => 2,
            Self::AttackDoubleSpend => 3,
            Self::AttackDoubleSpendShortChain => 4,
        }
    }

    /// Menu text describing this scenario. `attacker` is the attacking
    /// miner's id.
    pub fn describe(&self, attacker: impl Display) -> String {
        match self {
            Self::Honest => "No Attacker".into(),
            Self::Attack => format!("Miner {} is the Attacker", attacker),
            Self::AttackDoubleSpend => format!(
                "Miner {} is the Attacker with Double Spending",
                attacker
            ),
            Self::AttackDoubleSpendShortChain => format!(
                "Miner {} is the Attacker with Short Private Chain and Double \
                 Spending",
                attacker
            ),
        }
    }
}

impl FromStr for Scenario {
    type Err = ScenarioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::Honest),
            "2" => Ok(Self::Attack),
            "3" => Ok(Self::AttackDoubleSpend),
            "4" => Ok(Self::AttackDoubleSpendShortChain),
            other => Err(ScenarioParseError::InvalidSelection(other.into())),
        }
    }
}

impl Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Case {}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_menu_tokens() {
        for scenario in Scenario::ALL {
            let token = scenario.number().to_string();
            assert_eq!(token.parse(), Ok(scenario));
        }
        assert_eq!(" 3\n".parse(), Ok(Scenario::AttackDoubleSpend));
    }

    #[test]
    fn rejects_unknown_tokens() {
        for token in ["0", "5", "", "two", "1 2"] {
            assert_eq!(
                token.parse::<Scenario>(),
                Err(ScenarioParseError::InvalidSelection(token.trim().into()))
            );
        }
    }

    #[test]
    fn attack_plans() {
        assert_eq!(Scenario::Honest.attack_plan(), None);
        assert_eq!(
            Scenario::Attack.attack_plan().map(|p| p.private_blocks()),
            Some(LONG_PRIVATE_CHAIN)
        );
        let short =
            Scenario::AttackDoubleSpendShortChain.attack_plan().unwrap();
        assert!(short.double_spend);
        assert_eq!(short.private_blocks(), SHORT_PRIVATE_CHAIN);
    }
}
