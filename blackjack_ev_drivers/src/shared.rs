use anyhow::Context;
use blackjack_ev::betting::BetPolicyKind;
use blackjack_ev::statistics::ReportConfig;
use blackjack_ev::strategy::PlayingPolicyKind;
use blackjack_ev::{Rule, SimulationConfig, SimulationError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub rule: ConfigRule,
    pub simulation: ConfigSimulation,
    #[serde(default)]
    pub report: ConfigReport,
    pub policies: ConfigPolicies,
}

impl Config {
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            rule: self.rule.clone().into(),
            number_of_other_players: self.simulation.number_of_other_players,
            episodes: self.simulation.episodes,
            workers: self.simulation.workers,
            seed: self.simulation.seed,
        }
    }

    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            units: self.report.units,
            hands_played: self.report.hands_played,
            chunk_size: self.report.chunk_size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRule {
    pub number_of_decks: u8,
    pub shoe_penetration: f64,
    pub dealer_peeks: bool,
    pub allow_das: bool,
    pub dealer_stands_on_soft17: bool,
    pub allow_surrender: bool,
}

impl Default for ConfigRule {
    fn default() -> Self {
        let rule = Rule::default();
        ConfigRule {
            number_of_decks: rule.number_of_decks,
            shoe_penetration: rule.shoe_penetration,
            dealer_peeks: rule.dealer_peeks,
            allow_das: rule.allow_das,
            dealer_stands_on_soft17: rule.dealer_stands_on_soft17,
            allow_surrender: rule.allow_surrender,
        }
    }
}

impl From<ConfigRule> for Rule {
    fn from(rule: ConfigRule) -> Self {
        Rule {
            number_of_decks: rule.number_of_decks,
            shoe_penetration: rule.shoe_penetration,
            dealer_peeks: rule.dealer_peeks,
            allow_das: rule.allow_das,
            dealer_stands_on_soft17: rule.dealer_stands_on_soft17,
            allow_surrender: rule.allow_surrender,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSimulation {
    pub episodes: u64,
    /// 0 means one worker per available core.
    pub workers: usize,
    #[serde(default)]
    pub number_of_other_players: u8,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ConfigSimulation {
    fn default() -> Self {
        let simulation = SimulationConfig::default();
        ConfigSimulation {
            episodes: simulation.episodes,
            workers: 0,
            number_of_other_players: simulation.number_of_other_players,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigReport {
    pub units: f64,
    pub hands_played: usize,
    pub chunk_size: usize,
}

impl Default for ConfigReport {
    fn default() -> Self {
        let report = ReportConfig::default();
        ConfigReport {
            units: report.units,
            hands_played: report.hands_played,
            chunk_size: report.chunk_size,
        }
    }
}

/// Policy names as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigPolicies {
    pub mover: String,
    pub better: String,
}

impl Default for ConfigPolicies {
    fn default() -> Self {
        ConfigPolicies {
            mover: PlayingPolicyKind::BasicStrategyDeviations.to_string(),
            better: BetPolicyKind::CardCount.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policies {
    pub playing: PlayingPolicyKind,
    pub betting: BetPolicyKind,
}

impl TryInto<Policies> for ConfigPolicies {
    type Error = SimulationError;

    fn try_into(self) -> Result<Policies, Self::Error> {
        Ok(Policies {
            playing: PlayingPolicyKind::from_name(&self.mover)?,
            betting: BetPolicyKind::from_name(&self.better)?,
        })
    }
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &Path) -> anyhow::Result<Config> {
    let file_content = fs::read_to_string(filename)
        .with_context(|| format!("cannot read config file {}", filename.display()))?;
    serde_yaml::from_str(&file_content)
        .with_context(|| format!("cannot parse config file {}", filename.display()))
}
