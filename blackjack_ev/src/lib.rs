pub mod betting;
mod card_count;
mod error;
pub mod parallel;
pub mod simulation;
pub mod statistics;
pub mod strategy;

use strum_macros::Display;

pub use card_count::{true_count, CardCount};
pub use error::SimulationError;

/// A card in blackjack value. Ranks 2 to 10 are their face value (10 also
/// covers J, Q and K) and 11 is an ace.
pub type Card = u8;

pub const ACE: Card = 11;
pub const TEN: Card = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rule {
    pub number_of_decks: u8,
    /// Fraction of the starting shoe that is still undealt when the shoe is
    /// replaced. `0.25` means three quarters are dealt.
    pub shoe_penetration: f64,
    pub dealer_peeks: bool,
    pub allow_das: bool,
    pub dealer_stands_on_soft17: bool,
    pub allow_surrender: bool,
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            number_of_decks: 6,
            shoe_penetration: 0.25,
            dealer_peeks: true,
            allow_das: true,
            dealer_stands_on_soft17: true,
            allow_surrender: true,
        }
    }
}

/// Everything a simulation run needs besides the two policies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    pub rule: Rule,
    pub number_of_other_players: u8,
    pub episodes: u64,
    pub workers: usize,
    pub seed: Option<u64>,
}

pub const MAX_OTHER_PLAYERS: u8 = 4;

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.rule.number_of_decks == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "the shoe needs at least one deck".to_string(),
            ));
        }
        if !(self.rule.shoe_penetration > 0.0 && self.rule.shoe_penetration < 1.0) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "shoe penetration must be in (0, 1), got {}",
                self.rule.shoe_penetration
            )));
        }
        if self.number_of_other_players > MAX_OTHER_PLAYERS {
            return Err(SimulationError::InvalidConfiguration(format!(
                "at most {} other players are supported, got {}",
                MAX_OTHER_PLAYERS, self.number_of_other_players
            )));
        }
        // The first deal has to fit in the cards left at the reshuffle point.
        let starting_len = self.rule.number_of_decks as usize * 52;
        let reshuffle_at =
            simulation::shoe::reshuffle_point(starting_len, self.rule.shoe_penetration);
        let first_deal = 4 + 2 * self.number_of_other_players as usize;
        if reshuffle_at < first_deal {
            return Err(SimulationError::InvalidConfiguration(format!(
                "shoe penetration {} leaves {} cards at the reshuffle point, a deal needs {}",
                self.rule.shoe_penetration, reshuffle_at, first_deal
            )));
        }
        if self.workers == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "at least one worker is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            rule: Default::default(),
            number_of_other_players: 0,
            episodes: 100_000,
            workers: 1,
            seed: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}

/// What a playing policy answers for one hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    pub take_insurance: bool,
}

impl Decision {
    pub fn new(action: Action) -> Self {
        Decision {
            action,
            take_insurance: false,
        }
    }

    pub fn with_insurance(mut self, take_insurance: bool) -> Self {
        self.take_insurance = take_insurance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn should_reject_invalid_config() {
        let mut config = SimulationConfig::default();
        config.number_of_other_players = 5;
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfiguration(_))
        ));

        let mut config = SimulationConfig::default();
        config.rule.shoe_penetration = 0.0;
        assert!(config.validate().is_err());
        config.rule.shoe_penetration = 1.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.workers = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.rule.number_of_decks = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_penetration_that_leaves_no_deal() {
        let mut config = SimulationConfig::default();
        config.rule.number_of_decks = 1;
        config.rule.shoe_penetration = 0.01;
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfiguration(_))
        ));

        // 1 deck at 0.1 keeps 5 cards: enough alone, too few with another player.
        config.rule.shoe_penetration = 0.1;
        assert!(config.validate().is_ok());
        config.number_of_other_players = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn action_is_displayed_in_lowercase() {
        assert_eq!(Action::Surrender.to_string(), "surrender");
        assert_eq!(Action::Double.to_string(), "double");
    }
}
