use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum_macros::EnumIter;

use crate::{true_count, CardCount, SimulationError};

/// Bet placed below the entry count by the wong-in spreads: small but never
/// zero, so every round still shows up in the records.
pub const WONG_OUT_BET: f64 = 0.001;

/// Sizes the initial bet of a round, in betting units.
pub trait BetSizingPolicy: Send + Sync {
    fn bet(&self, cards_seen: &CardCount, number_of_decks: u8) -> f64;
}

/// How many cards are assumed left when turning the running count into a
/// true count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardsLeft {
    /// `decks * 52 - seen - 1`: leaves out the card about to be dealt.
    ExcludeNextCard,
    /// `decks * 52 - seen`.
    AllRemaining,
}

impl CardsLeft {
    pub fn true_count(self, cards_seen: &CardCount, number_of_decks: u8) -> f64 {
        let full = number_of_decks as i64 * 52 - cards_seen.get_total() as i64;
        let cards_left = match self {
            CardsLeft::ExcludeNextCard => full - 1,
            CardsLeft::AllRemaining => full,
        };
        true_count(cards_seen.running_count(), cards_left.max(0) as usize)
    }
}

/// The same bet every round.
pub struct FlatBet {
    pub units: f64,
}

impl BetSizingPolicy for FlatBet {
    fn bet(&self, _: &CardCount, _: u8) -> f64 {
        self.units
    }
}

/// `trunc(tc²)` from the entry count on, clamped to `[1, max]`; 1 below it.
pub struct SquareSpread {
    pub enter_at: f64,
    pub max: f64,
}

impl BetSizingPolicy for SquareSpread {
    fn bet(&self, cards_seen: &CardCount, number_of_decks: u8) -> f64 {
        let tc = CardsLeft::ExcludeNextCard.true_count(cards_seen, number_of_decks);
        if tc >= self.enter_at {
            (tc * tc).trunc().min(self.max).max(1.0)
        } else {
            1.0
        }
    }
}

/// `slope * (tc - offset)`, optionally truncated, clamped to `[min, max]`.
/// With an entry count, `below_entry` is bet until the count reaches it.
pub struct LinearSpread {
    pub cards_left: CardsLeft,
    pub enter_at: Option<f64>,
    pub below_entry: f64,
    pub offset: f64,
    pub slope: f64,
    pub truncate: bool,
    pub min: f64,
    pub max: f64,
}

impl BetSizingPolicy for LinearSpread {
    fn bet(&self, cards_seen: &CardCount, number_of_decks: u8) -> f64 {
        let tc = self.cards_left.true_count(cards_seen, number_of_decks);
        if self.enter_at.map_or(false, |enter_at| tc < enter_at) {
            return self.below_entry;
        }
        let raw = self.slope * (tc - self.offset);
        let raw = if self.truncate { raw.trunc() } else { raw };
        raw.min(self.max).max(self.min)
    }
}

/// Fixed bets per true count band. Below `floor` the bet is `below_floor`;
/// `steps[i]` holds for `floor + i <= tc < floor + i + 1`, and the last step
/// for everything above.
pub struct StepSpread {
    pub floor: f64,
    pub below_floor: f64,
    pub steps: &'static [f64],
}

impl BetSizingPolicy for StepSpread {
    fn bet(&self, cards_seen: &CardCount, number_of_decks: u8) -> f64 {
        let tc = CardsLeft::ExcludeNextCard.true_count(cards_seen, number_of_decks);
        if tc < self.floor {
            return self.below_floor;
        }
        let band = (tc - self.floor).floor() as usize;
        match self.steps.get(band).or_else(|| self.steps.last()) {
            Some(&bet) => bet,
            None => self.below_floor,
        }
    }
}

const BJA_7_STEPS: [f64; 7] = [1.0, 1.5, 3.3, 6.6, 10.0, 13.3, 16.6];

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Serialize_enum_str, Deserialize_enum_str)]
pub enum BetPolicyKind {
    #[serde(rename = "simple")]
    Simple,
    #[serde(rename = "card-count")]
    CardCount,
    #[serde(rename = "linear")]
    Linear,
    #[serde(rename = "linear-wong-in")]
    LinearWongIn,
    #[serde(rename = "linear-4")]
    Linear4,
    #[serde(rename = "linear-2d")]
    Linear2D,
    #[serde(rename = "linear-4-passive")]
    Linear4Passive,
    #[serde(rename = "wong-6")]
    Wong6,
    #[serde(rename = "wong-bja-7")]
    WongBja7,
    #[serde(rename = "wong-20")]
    Wong20,
}

impl BetPolicyKind {
    pub fn from_name(name: &str) -> Result<Self, SimulationError> {
        name.parse()
            .map_err(|_| SimulationError::UnknownPolicy(name.to_string()))
    }

    pub fn build(self) -> Box<dyn BetSizingPolicy> {
        match self {
            BetPolicyKind::Simple => Box::new(FlatBet { units: 1.0 }),
            BetPolicyKind::CardCount => Box::new(SquareSpread {
                enter_at: 2.0,
                max: 100.0,
            }),
            BetPolicyKind::Linear => Box::new(LinearSpread {
                cards_left: CardsLeft::ExcludeNextCard,
                enter_at: Some(2.0),
                below_entry: 1.0,
                offset: 1.0,
                slope: 0.5,
                truncate: true,
                min: 1.0,
                max: 10.0,
            }),
            BetPolicyKind::LinearWongIn => Box::new(wong_in(10.0)),
            BetPolicyKind::Linear4 => Box::new(LinearSpread {
                cards_left: CardsLeft::AllRemaining,
                enter_at: None,
                below_entry: 1.0,
                offset: 0.0,
                slope: 1.0,
                truncate: true,
                min: 1.0,
                max: 4.0,
            }),
            BetPolicyKind::Linear2D => Box::new(LinearSpread {
                cards_left: CardsLeft::AllRemaining,
                enter_at: None,
                below_entry: 1.0,
                offset: 0.0,
                slope: 0.6,
                truncate: false,
                min: 1.0,
                max: 4.0,
            }),
            BetPolicyKind::Linear4Passive => Box::new(LinearSpread {
                cards_left: CardsLeft::ExcludeNextCard,
                enter_at: None,
                below_entry: 1.0,
                offset: 1.0,
                slope: 0.5,
                truncate: false,
                min: 1.0,
                max: 4.0,
            }),
            BetPolicyKind::Wong6 => Box::new(wong_in(6.0)),
            BetPolicyKind::WongBja7 => Box::new(StepSpread {
                floor: 0.0,
                below_floor: WONG_OUT_BET,
                steps: &BJA_7_STEPS,
            }),
            BetPolicyKind::Wong20 => Box::new(wong_in(20.0)),
        }
    }
}

/// `trunc(tc)` from a true count of 1, the wong-out bet below.
fn wong_in(max: f64) -> LinearSpread {
    LinearSpread {
        cards_left: CardsLeft::ExcludeNextCard,
        enter_at: Some(1.0),
        below_entry: WONG_OUT_BET,
        offset: 0.0,
        slope: 1.0,
        truncate: true,
        min: 1.0,
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    /// One deck, `low` small cards and `high` tens seen.
    fn seen(low: u16, high: u16) -> CardCount {
        let mut counts = [0; 10];
        counts[0] = low;
        counts[8] = high;
        CardCount::new(&counts)
    }

    fn bet(kind: BetPolicyKind, cards_seen: &CardCount) -> f64 {
        kind.build().bet(cards_seen, 1)
    }

    #[test]
    fn cards_left_conventions_differ_by_one() {
        // Running count +3 with 39 cards seen.
        let cards_seen = seen(21, 18);
        assert_eq!(CardsLeft::AllRemaining.true_count(&cards_seen, 1), 12.0);
        assert_eq!(
            CardsLeft::ExcludeNextCard.true_count(&cards_seen, 1),
            true_count(3, 12)
        );
    }

    #[test]
    fn exhausted_shoe_counts_as_neutral() {
        // A whole deck seen, mostly low cards: no card left to normalise by.
        let cards_seen = seen(36, 16);
        assert_eq!(CardsLeft::AllRemaining.true_count(&cards_seen, 1), 0.0);
        assert_eq!(CardsLeft::ExcludeNextCard.true_count(&cards_seen, 1), 0.0);
        assert_eq!(bet(BetPolicyKind::Linear4, &cards_seen), 1.0);
        assert_eq!(bet(BetPolicyKind::Linear2D, &cards_seen), 1.0);
        assert_eq!(bet(BetPolicyKind::Wong20, &cards_seen), WONG_OUT_BET);
    }

    #[test]
    fn simple_always_bets_one() {
        assert_eq!(bet(BetPolicyKind::Simple, &seen(20, 0)), 1.0);
        assert_eq!(bet(BetPolicyKind::Simple, &seen(0, 20)), 1.0);
    }

    #[test]
    fn card_count_squares_the_true_count() {
        // tc = 1 / (50 / 52), then 2 / (49 / 52)
        assert_eq!(bet(BetPolicyKind::CardCount, &seen(1, 0)), 1.0);
        assert_eq!(bet(BetPolicyKind::CardCount, &seen(2, 0)), 4.0);
        assert_eq!(bet(BetPolicyKind::CardCount, &seen(21, 18)), 100.0);
        assert_eq!(bet(BetPolicyKind::CardCount, &seen(0, 5)), 1.0);
    }

    #[test]
    fn linear_spreads() {
        // tc = 26 / (25 / 52) when leaving out the next card.
        let very_high = seen(26, 0);
        assert_eq!(bet(BetPolicyKind::Linear, &very_high), 10.0);
        assert_eq!(bet(BetPolicyKind::Linear4, &very_high), 4.0);
        assert_eq!(bet(BetPolicyKind::Linear2D, &very_high), 4.0);
        assert_eq!(bet(BetPolicyKind::Linear4Passive, &very_high), 4.0);

        let negative = seen(0, 4);
        assert_eq!(bet(BetPolicyKind::Linear, &negative), 1.0);
        assert_eq!(bet(BetPolicyKind::Linear4, &negative), 1.0);
        assert_eq!(bet(BetPolicyKind::Linear2D, &negative), 1.0);

        // All remaining: tc = 4 / (48 / 52) = 4.33
        let high = seen(4, 0);
        assert_eq!(bet(BetPolicyKind::Linear4, &high), 4.0);
        let linear_2d = bet(BetPolicyKind::Linear2D, &high);
        assert!(linear_2d > 2.5 && linear_2d < 2.7);
        // Leaving out the next card: tc = 4 / (47 / 52) = 4.43
        let passive = bet(BetPolicyKind::Linear4Passive, &high);
        assert!((passive - 0.5 * (4.0 * 52.0 / 47.0 - 1.0)).abs() < 1e-12);
        assert_eq!(bet(BetPolicyKind::Linear, &high), 1.0);
    }

    #[test]
    fn wong_in_spreads_sit_out_negative_counts() {
        let negative = seen(0, 3);
        for kind in [
            BetPolicyKind::LinearWongIn,
            BetPolicyKind::Wong6,
            BetPolicyKind::Wong20,
            BetPolicyKind::WongBja7,
        ] {
            assert_eq!(bet(kind, &negative), WONG_OUT_BET);
        }

        let very_high = seen(26, 0);
        assert_eq!(bet(BetPolicyKind::LinearWongIn, &very_high), 10.0);
        assert_eq!(bet(BetPolicyKind::Wong6, &very_high), 6.0);
        assert_eq!(bet(BetPolicyKind::Wong20, &very_high), 20.0);
        assert_eq!(bet(BetPolicyKind::WongBja7, &very_high), 16.6);

        // tc = 3 / (48 / 52) = 3.25
        let moderate = seen(3, 0);
        assert_eq!(bet(BetPolicyKind::Wong6, &moderate), 3.0);
        assert_eq!(bet(BetPolicyKind::WongBja7, &moderate), 6.6);
    }

    #[test]
    fn bja_7_steps() {
        // Neutral count sits in the first band.
        assert_eq!(bet(BetPolicyKind::WongBja7, &seen(0, 0)), 1.0);
        // tc = 1 / (50 / 52) = 1.04
        assert_eq!(bet(BetPolicyKind::WongBja7, &seen(1, 0)), 1.5);
    }

    #[test]
    fn policies_are_found_by_name() {
        assert_eq!(BetPolicyKind::from_name("wong-bja-7").unwrap(), BetPolicyKind::WongBja7);
        assert!(matches!(
            BetPolicyKind::from_name("martingale"),
            Err(SimulationError::UnknownPolicy(_))
        ));
        for kind in BetPolicyKind::iter() {
            assert_eq!(BetPolicyKind::from_name(&kind.to_string()).unwrap(), kind);
            assert!(bet(kind, &seen(0, 0)) > 0.0);
        }
    }
}
