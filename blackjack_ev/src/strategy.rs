use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum_macros::EnumIter;

use crate::{true_count, Action, Card, CardCount, Decision, Rule, SimulationError, ACE, TEN};

/// Everything a playing policy may look at when deciding one hand.
#[derive(Debug, Clone, Copy)]
pub struct PlayerView<'a> {
    pub hand_value: u8,
    pub is_soft: bool,
    pub dealer_up_card: Card,
    pub can_double: bool,
    pub can_split: bool,
    pub can_surrender: bool,
    pub can_insure: bool,
    pub cards: &'a [Card],
    /// Cards already dealt from this shoe, excluding the dealer hole card.
    pub cards_seen: &'a CardCount,
    pub number_of_decks: u8,
}

impl PlayerView<'_> {
    fn is_pair(&self) -> bool {
        self.cards.len() == 2 && self.cards[0] == self.cards[1]
    }

    fn true_count(&self) -> f64 {
        let full = self.number_of_decks as usize * 52;
        let remaining = full.saturating_sub(self.cards_seen.get_total() as usize);
        true_count(self.cards_seen.running_count(), remaining)
    }
}

/// Decides how to play a hand. Implementations must be deterministic in
/// their inputs; the same policy object is shared by every worker.
pub trait PlayingPolicy: Send + Sync {
    fn decide(&self, view: &PlayerView<'_>, rule: &Rule) -> Decision;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Serialize_enum_str, Deserialize_enum_str)]
pub enum PlayingPolicyKind {
    #[serde(rename = "basic-strategy")]
    BasicStrategy,
    #[serde(rename = "basic-strategy-deviations")]
    BasicStrategyDeviations,
    #[serde(rename = "simple")]
    Simple,
}

impl PlayingPolicyKind {
    pub fn from_name(name: &str) -> Result<Self, SimulationError> {
        name.parse()
            .map_err(|_| SimulationError::UnknownPolicy(name.to_string()))
    }

    pub fn build(self) -> Box<dyn PlayingPolicy> {
        match self {
            PlayingPolicyKind::BasicStrategy => Box::new(BasicStrategy::new()),
            PlayingPolicyKind::BasicStrategyDeviations => Box::new(DeviationStrategy::new()),
            PlayingPolicyKind::Simple => Box::new(SimpleStrategy),
        }
    }
}

/// (primary, fallback). The fallback is used when the primary action isn't
/// allowed on the current hand.
type ChartEntry = (Action, Action);

const H: ChartEntry = (Action::Hit, Action::Hit);
const S: ChartEntry = (Action::Stand, Action::Stand);
const P: ChartEntry = (Action::Split, Action::Split);
const DH: ChartEntry = (Action::Double, Action::Hit);
const DS: ChartEntry = (Action::Double, Action::Stand);
const RH: ChartEntry = (Action::Surrender, Action::Hit);
const RS: ChartEntry = (Action::Surrender, Action::Stand);
const RP: ChartEntry = (Action::Surrender, Action::Split);

/// Chart based basic strategy for multi-deck shoes. Columns are the dealer up
/// card with the ace first, then 2 to 10. The charts are the dealer-stands-on-
/// soft-17 ones; the extra surrenders against a dealer hitting soft 17 are
/// added by [`h17_surrender`].
pub struct BasicStrategy {
    hard_charts: [[ChartEntry; 10]; 14],
    soft_charts: [[ChartEntry; 10]; 9],
    pair_charts: [[ChartEntry; 10]; 10],
}

impl BasicStrategy {
    pub fn new() -> BasicStrategy {
        BasicStrategy {
            hard_charts: [
                [H, H, H, H, H, H, H, H, H, H], // 5 and below
                [H, H, H, H, H, H, H, H, H, H],
                [H, H, H, H, H, H, H, H, H, H],
                [H, H, H, H, H, H, H, H, H, H],
                [H, H, DH, DH, DH, DH, H, H, H, H], // 9
                [H, DH, DH, DH, DH, DH, DH, DH, DH, H],
                [DH, DH, DH, DH, DH, DH, DH, DH, DH, DH],
                [H, H, H, S, S, S, H, H, H, H], // 12
                [H, S, S, S, S, S, H, H, H, H],
                [H, S, S, S, S, S, H, H, H, H],
                [H, S, S, S, S, S, H, H, H, RH],
                [RH, S, S, S, S, S, H, H, RH, RH], // 16
                [S, S, S, S, S, S, S, S, S, S],
                [S, S, S, S, S, S, S, S, S, S], // 18 and above
            ],
            soft_charts: [
                [H, H, H, H, DH, DH, H, H, H, H], // soft 13
                [H, H, H, H, DH, DH, H, H, H, H],
                [H, H, H, DH, DH, DH, H, H, H, H],
                [H, H, H, DH, DH, DH, H, H, H, H],
                [H, H, DH, DH, DH, DH, H, H, H, H],
                [H, DS, DS, DS, DS, DS, S, S, H, H], // soft 18
                [S, S, S, S, S, DS, S, S, S, S],
                [S, S, S, S, S, S, S, S, S, S],
                [S, S, S, S, S, S, S, S, S, S], // soft 21
            ],
            pair_charts: [
                [P, P, P, P, P, P, P, P, P, P], // aces
                [H, P, P, P, P, P, P, H, H, H], // 2s
                [H, P, P, P, P, P, P, H, H, H],
                [H, H, H, H, P, P, H, H, H, H],
                [H, DH, DH, DH, DH, DH, DH, DH, DH, H],
                [H, P, P, P, P, P, H, H, H, H],
                [H, P, P, P, P, P, P, H, H, H],
                [P, P, P, P, P, P, P, P, P, P], // 8s
                [S, P, P, P, P, P, S, P, P, S],
                [S, S, S, S, S, S, S, S, S, S], // 10s
            ],
        }
    }

    fn chart_entry(&self, view: &PlayerView<'_>, rule: &Rule) -> ChartEntry {
        if !rule.dealer_stands_on_soft17 {
            if let Some(entry) = h17_surrender(view) {
                return entry;
            }
        }
        let col = column(view.dealer_up_card);

        if view.can_split && view.is_pair() {
            let entry = self.pair_charts[pair_row(view.cards[0])][col];
            if entry.0 == Action::Split || entry.1 == Action::Split {
                return entry;
            }
        }

        if view.is_soft {
            if view.hand_value <= 12 {
                // Two aces that can no longer be split.
                H
            } else {
                self.soft_charts[(view.hand_value - 13).min(8) as usize][col]
            }
        } else {
            let row = {
                if view.hand_value <= 5 {
                    0
                } else if view.hand_value >= 18 {
                    13
                } else {
                    view.hand_value - 5
                }
            } as usize;
            self.hard_charts[row][col]
        }
    }

    fn action(&self, view: &PlayerView<'_>, rule: &Rule) -> Action {
        resolve_entry(self.chart_entry(view, rule), view)
    }
}

impl Default for BasicStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayingPolicy for BasicStrategy {
    fn decide(&self, view: &PlayerView<'_>, rule: &Rule) -> Decision {
        Decision::new(self.action(view, rule))
    }
}

/// Late surrenders that only pay against an ace when the dealer hits soft 17:
/// 8-8, hard 15 and hard 17.
fn h17_surrender(view: &PlayerView<'_>) -> Option<ChartEntry> {
    if view.dealer_up_card != ACE {
        return None;
    }
    if view.can_split && view.is_pair() && view.cards[0] == 8 {
        return Some(RP);
    }
    match (view.is_soft, view.hand_value) {
        (false, 15) => Some(RH),
        (false, 17) => Some(RS),
        _ => None,
    }
}

fn column(dealer_up_card: Card) -> usize {
    if dealer_up_card == ACE {
        0
    } else {
        (dealer_up_card - 1) as usize
    }
}

fn pair_row(card: Card) -> usize {
    if card == ACE {
        0
    } else {
        (card - 1) as usize
    }
}

fn resolve_entry((primary, fallback): ChartEntry, view: &PlayerView<'_>) -> Action {
    let allowed = match primary {
        Action::Double => view.can_double,
        Action::Surrender => view.can_surrender,
        Action::Split => view.can_split,
        Action::Hit | Action::Stand => true,
    };
    if allowed {
        primary
    } else {
        fallback
    }
}

/// (hard total, dealer up card, true count index, action once the count is
/// at or above the index)
const INDEX_PLAYS_AT_OR_ABOVE: [(u8, Card, f64, Action); 10] = [
    (16, TEN, 0.0, Action::Stand),
    (15, TEN, 4.0, Action::Stand),
    (16, 9, 5.0, Action::Stand),
    (12, 3, 2.0, Action::Stand),
    (12, 2, 3.0, Action::Stand),
    (11, ACE, 1.0, Action::Double),
    (10, TEN, 4.0, Action::Double),
    (10, ACE, 4.0, Action::Double),
    (9, 2, 1.0, Action::Double),
    (9, 7, 3.0, Action::Double),
];

/// (hard total, dealer up card, true count index, action once the count drops
/// below the index)
const INDEX_PLAYS_BELOW: [(u8, Card, f64, Action); 5] = [
    (13, 2, -1.0, Action::Hit),
    (13, 3, -2.0, Action::Hit),
    (12, 4, 0.0, Action::Hit),
    (12, 5, -2.0, Action::Hit),
    (12, 6, -1.0, Action::Hit),
];

/// Splitting tens against 5 and 6.
const TEN_SPLIT_INDEXES: [(Card, f64); 2] = [(5, 5.0), (6, 4.0)];

const INSURANCE_INDEX: f64 = 3.0;

/// Basic strategy with Hi-Lo index plays. The true count comes from the
/// seen-cards view, so the dealer hole card never leaks into it.
pub struct DeviationStrategy {
    basic: BasicStrategy,
}

impl DeviationStrategy {
    pub fn new() -> DeviationStrategy {
        DeviationStrategy {
            basic: BasicStrategy::new(),
        }
    }

    fn deviation(&self, view: &PlayerView<'_>, tc: f64) -> Option<Action> {
        if view.can_split && view.is_pair() && view.cards[0] == TEN {
            let split = TEN_SPLIT_INDEXES
                .iter()
                .any(|&(up, index)| up == view.dealer_up_card && tc >= index);
            if split {
                return Some(Action::Split);
            }
        }
        if view.is_soft {
            return None;
        }

        let matches = |total: u8, up: Card| total == view.hand_value && up == view.dealer_up_card;
        let above = INDEX_PLAYS_AT_OR_ABOVE
            .iter()
            .find(|&&(total, up, index, _)| matches(total, up) && tc >= index)
            .map(|&(.., action)| action);
        let below = INDEX_PLAYS_BELOW
            .iter()
            .find(|&&(total, up, index, _)| matches(total, up) && tc < index)
            .map(|&(.., action)| action);

        above
            .or(below)
            .filter(|&action| action != Action::Double || view.can_double)
    }
}

impl Default for DeviationStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayingPolicy for DeviationStrategy {
    fn decide(&self, view: &PlayerView<'_>, rule: &Rule) -> Decision {
        let tc = view.true_count();
        let basic = self.basic.action(view, rule);
        let action = match basic {
            Action::Surrender => basic,
            // Pairs the chart splits keep being split; only tens may deviate into a split.
            Action::Split => basic,
            _ => self.deviation(view, tc).unwrap_or(basic),
        };
        Decision::new(action).with_insurance(view.can_insure && tc >= INSURANCE_INDEX)
    }
}

/// Mimics the dealer: hit below 17, stand otherwise.
pub struct SimpleStrategy;

impl PlayingPolicy for SimpleStrategy {
    fn decide(&self, view: &PlayerView<'_>, _: &Rule) -> Decision {
        if view.hand_value < 17 {
            Decision::new(Action::Hit)
        } else {
            Decision::new(Action::Stand)
        }
    }
}
