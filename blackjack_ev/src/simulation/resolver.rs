use crate::{Action, Card, SimulationError, ACE};

use super::{hand::Hand, round::Guards, round::Round};

/// A hand waiting on the work stack.
#[derive(Debug, Clone)]
struct PendingHand {
    hand: Hand,
    /// Split halves get their second card only when they are popped, so the
    /// first half is played out before the second one draws.
    awaiting_card: bool,
    /// Hands continued after a hit can't split any more.
    after_hit: bool,
}

impl PendingHand {
    fn dealt(hand: Hand) -> Self {
        PendingHand {
            hand,
            awaiting_card: false,
            after_hit: false,
        }
    }

    fn split_half(card: Card) -> Self {
        PendingHand {
            hand: Hand::new(&[card]),
            awaiting_card: true,
            after_hit: false,
        }
    }
}

impl Round<'_> {
    /// Plays the given hands in order until each is terminal and returns the
    /// terminal hands. A doubled hand appears twice. `splits_remaining` is
    /// shared by every hand of the call, so a budget of 3 never yields more
    /// than 4 distinct hands.
    pub fn play_hands(
        &mut self,
        hands: Vec<Hand>,
        splits_remaining: u8,
    ) -> Result<Vec<Hand>, SimulationError> {
        let stack = hands.into_iter().rev().map(PendingHand::dealt).collect();
        self.resolve(stack, splits_remaining)
    }

    /// Plays both halves of a split pair of `card`s. `splits_remaining` is the
    /// budget left after this split.
    pub fn play_split(
        &mut self,
        card: Card,
        splits_remaining: u8,
    ) -> Result<Vec<Hand>, SimulationError> {
        self.resolve(vec![PendingHand::split_half(card); 2], splits_remaining)
    }

    fn resolve(
        &mut self,
        mut stack: Vec<PendingHand>,
        mut splits_remaining: u8,
    ) -> Result<Vec<Hand>, SimulationError> {
        let mut done = Vec::new();

        while let Some(pending) = stack.pop() {
            let PendingHand {
                mut hand,
                awaiting_card,
                after_hit,
            } = pending;

            if awaiting_card {
                hand.receive_card(self.draw()?);
                // Split aces take exactly one card.
                if hand.cards()[0] == ACE {
                    self.resolved(&hand);
                    done.push(hand);
                    continue;
                }
            }
            if hand.is_bust() {
                self.resolved(&hand);
                done.push(hand);
                continue;
            }

            let budget = if after_hit { 0 } else { splits_remaining };
            let guards = Guards {
                can_double: Guards::can_double(&hand, budget, self.rule.allow_das),
                can_split: Guards::can_split(&hand, budget),
                can_surrender: false,
                can_insure: false,
            };
            let decision = self.ask(&hand, &guards);
            guards.check(decision.action)?;

            match decision.action {
                Action::Stand => {
                    self.resolved(&hand);
                    done.push(hand);
                }
                Action::Double => {
                    hand.receive_card(self.draw()?);
                    self.resolved(&hand);
                    done.push(hand.clone());
                    done.push(hand);
                }
                Action::Hit => {
                    hand.receive_card(self.draw()?);
                    stack.push(PendingHand {
                        hand,
                        awaiting_card: false,
                        after_hit: true,
                    });
                }
                Action::Split => {
                    splits_remaining -= 1;
                    let card = hand.cards()[0];
                    stack.push(PendingHand::split_half(card));
                    stack.push(PendingHand::split_half(card));
                }
                Action::Surrender => {
                    return Err(SimulationError::InvalidDecision {
                        action: Action::Surrender,
                        reason: "surrender is only offered on the starting hand",
                    })
                }
            }
        }

        Ok(done)
    }
}
