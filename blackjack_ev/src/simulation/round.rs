use crate::strategy::{PlayerView, PlayingPolicy};
use crate::{Action, Card, CardCount, Decision, Rule, SimulationError, ACE, TEN};

use super::{
    dealer::play_dealer,
    hand::Hand,
    shoe::Shoe,
    Seat, SimulationObserver, INITIAL_SPLITS,
};

/// Which actions are allowed on the hand being decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Guards {
    pub can_double: bool,
    pub can_split: bool,
    pub can_surrender: bool,
    pub can_insure: bool,
}

impl Guards {
    /// Aces may only be split from the starting hand.
    pub fn can_split(hand: &Hand, splits_remaining: u8) -> bool {
        splits_remaining > 0
            && hand.is_pair()
            && (hand.cards()[0] != ACE || splits_remaining == INITIAL_SPLITS)
    }

    pub fn can_double(hand: &Hand, splits_remaining: u8, allow_das: bool) -> bool {
        hand.len() == 2 && (allow_das || splits_remaining == INITIAL_SPLITS)
    }

    pub fn check(&self, action: Action) -> Result<(), SimulationError> {
        let reason = match action {
            Action::Double if !self.can_double => "doubling is not allowed on this hand",
            Action::Split if !self.can_split => "splitting is not allowed on this hand",
            Action::Surrender if !self.can_surrender => "surrender is not allowed on this hand",
            _ => return Ok(()),
        };
        Err(SimulationError::InvalidDecision { action, reason })
    }
}

/// One dealt round: the dealer cards, the shoe the round draws from and the
/// collaborators consulted while playing it.
pub struct Round<'a> {
    pub(crate) rule: &'a Rule,
    policy: &'a dyn PlayingPolicy,
    shoe: &'a mut Shoe,
    observer: &'a mut dyn SimulationObserver,
    dealer_up_card: Card,
    dealer_hole_card: Card,
}

impl<'a> Round<'a> {
    pub fn new(
        rule: &'a Rule,
        policy: &'a dyn PlayingPolicy,
        shoe: &'a mut Shoe,
        observer: &'a mut dyn SimulationObserver,
        dealer_up_card: Card,
        dealer_hole_card: Card,
    ) -> Self {
        Round {
            rule,
            policy,
            shoe,
            observer,
            dealer_up_card,
            dealer_hole_card,
        }
    }

    pub(crate) fn draw(&mut self) -> Result<Card, SimulationError> {
        let card = self.shoe.draw()?;
        self.observer.on_card_drawn(Seat::Player, card);
        Ok(card)
    }

    /// Dealt cards the player can see: everything but the shoe and the hole card.
    fn cards_seen(&self) -> CardCount {
        let mut seen = self.shoe.cards_seen(self.rule.number_of_decks);
        seen.remove_card(self.dealer_hole_card);
        seen
    }

    pub(crate) fn ask(&mut self, hand: &Hand, guards: &Guards) -> Decision {
        let cards_seen = self.cards_seen();
        let (hand_value, soft_aces) = hand.value_ace();
        let view = PlayerView {
            hand_value,
            is_soft: soft_aces > 0,
            dealer_up_card: self.dealer_up_card,
            can_double: guards.can_double,
            can_split: guards.can_split,
            can_surrender: guards.can_surrender,
            can_insure: guards.can_insure,
            cards: hand.cards(),
            cards_seen: &cards_seen,
            number_of_decks: self.rule.number_of_decks,
        };
        let decision = self.policy.decide(&view, self.rule);
        self.observer.on_decision(hand, decision);
        decision
    }

    pub(crate) fn resolved(&mut self, hand: &Hand) {
        self.observer.on_hand_resolved(hand);
    }

    fn play_dealer(&mut self) -> Result<u8, SimulationError> {
        play_dealer(
            self.dealer_up_card,
            self.dealer_hole_card,
            self.shoe,
            self.rule.dealer_stands_on_soft17,
            self.observer,
        )
    }

    /// Plays the starting hand to the end and returns the profit in units of
    /// the initial bet, insurance included.
    pub fn simulate(
        &mut self,
        player_cards: [Card; 2],
        splits_remaining: u8,
    ) -> Result<f64, SimulationError> {
        let hand = Hand::new(&player_cards);
        let guards = Guards {
            can_double: Guards::can_double(&hand, splits_remaining, self.rule.allow_das),
            can_split: Guards::can_split(&hand, splits_remaining),
            can_surrender: self.rule.allow_surrender,
            can_insure: self.dealer_up_card == ACE,
        };
        let dealer_has_blackjack = self.dealer_up_card + self.dealer_hole_card == 21;
        let player_has_blackjack = hand.is_natural();
        // Without a peek the dealer blackjack only shows at the end, and then
        // takes every bet on the table.
        let player_loses_all_bets =
            dealer_has_blackjack && !self.rule.dealer_peeks && !player_has_blackjack;

        let decision = self.ask(&hand, &guards);
        let insurance_profit = if decision.take_insurance && guards.can_insure {
            if self.dealer_hole_card == TEN {
                1.0
            } else {
                -0.5
            }
        } else {
            0.0
        };

        if let Some(profit) = self.settle_naturals(dealer_has_blackjack, player_has_blackjack) {
            self.resolved(&hand);
            return Ok(profit + insurance_profit);
        }

        guards.check(decision.action)?;
        let profit = match decision.action {
            Action::Surrender => {
                self.resolved(&hand);
                -0.5
            }
            Action::Stand => {
                self.resolved(&hand);
                self.settle(&[hand], player_loses_all_bets)?
            }
            Action::Double => self.settle_double(hand, player_loses_all_bets)?,
            Action::Hit => self.settle_hit(hand, player_loses_all_bets)?,
            Action::Split => self.settle_split(hand, splits_remaining, player_loses_all_bets)?,
        };
        Ok(profit + insurance_profit)
    }

    fn settle_naturals(
        &self,
        dealer_has_blackjack: bool,
        player_has_blackjack: bool,
    ) -> Option<f64> {
        match (dealer_has_blackjack, player_has_blackjack) {
            (true, true) => Some(0.0),
            (false, true) => Some(1.5),
            (true, false) if self.rule.dealer_peeks => Some(-1.0),
            _ => None,
        }
    }

    fn settle_double(
        &mut self,
        mut hand: Hand,
        player_loses_all_bets: bool,
    ) -> Result<f64, SimulationError> {
        let card = self.draw()?;
        hand.receive_card(card);
        self.resolved(&hand);
        if player_loses_all_bets || hand.is_bust() {
            return Ok(-2.0);
        }
        Ok(2.0 * self.settle(&[hand], false)?)
    }

    fn settle_hit(
        &mut self,
        mut hand: Hand,
        player_loses_all_bets: bool,
    ) -> Result<f64, SimulationError> {
        let card = self.draw()?;
        hand.receive_card(card);
        if player_loses_all_bets || hand.is_bust() {
            self.resolved(&hand);
            return Ok(-1.0);
        }
        let hands = self.play_hands(vec![hand], 0)?;
        self.settle(&hands, false)
    }

    fn settle_split(
        &mut self,
        hand: Hand,
        splits_remaining: u8,
        player_loses_all_bets: bool,
    ) -> Result<f64, SimulationError> {
        let hands = self.play_split(hand.cards()[0], splits_remaining - 1)?;
        self.settle(&hands, player_loses_all_bets)
    }

    /// Scores resolved hands against the dealer, one unit each. The dealer
    /// only plays when at least one hand is still standing.
    fn settle(
        &mut self,
        hands: &[Hand],
        player_loses_all_bets: bool,
    ) -> Result<f64, SimulationError> {
        let number_of_hands = hands.len() as f64;
        if player_loses_all_bets || hands.iter().all(Hand::is_bust) {
            return Ok(-number_of_hands);
        }
        let dealer_value = self.play_dealer()?;
        Ok(hands
            .iter()
            .map(|hand| compare(hand.value(), dealer_value))
            .sum())
    }
}

/// Profit of one hand against the final dealer value. A busted dealer is 0
/// and loses to every standing hand.
fn compare(player_value: u8, dealer_value: u8) -> f64 {
    if player_value > 21 || dealer_value > player_value {
        -1.0
    } else if player_value > dealer_value {
        1.0
    } else {
        0.0
    }
}
