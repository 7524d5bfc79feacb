use std::ops::Index;

use crate::{Card, ACE, TEN};

/// Number of cards of each blackjack value (2 to 11 inclusive, 11 being an
/// ace). Used as the "cards seen so far" view handed to policies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardCount {
    counts: [u16; 10],
    total: u16,
}

impl CardCount {
    pub fn new(counts: &[u16; 10]) -> CardCount {
        CardCount {
            counts: *counts,
            total: counts.iter().sum(),
        }
    }

    /// The composition of a full shoe.
    pub fn with_number_of_decks(number_of_decks: u8) -> CardCount {
        let mut counts = [number_of_decks as u16 * 4; 10];
        counts[index_of(TEN)] = number_of_decks as u16 * 16;
        Self::new(&counts)
    }

    /// Full composition minus the remaining cards. Cards that a full shoe
    /// wouldn't contain are ignored, so hand-built test shoes never underflow.
    pub fn seen_from_remaining(number_of_decks: u8, remaining: &[Card]) -> CardCount {
        let mut seen = Self::with_number_of_decks(number_of_decks);
        for &card in remaining {
            seen.remove_card(card);
        }
        seen
    }

    /// Note that this method won't check if the card value is valid.
    pub fn add_card(&mut self, card: Card) {
        self.counts[index_of(card)] += 1;
        self.total += 1;
    }

    /// Removing a value whose count is already 0 is a no-op.
    pub fn remove_card(&mut self, card: Card) {
        let count = &mut self.counts[index_of(card)];
        if *count > 0 {
            *count -= 1;
            self.total -= 1;
        }
    }

    pub fn get_total(&self) -> u16 {
        self.total
    }

    /// Hi-Lo running count: 2 to 6 count +1, 7 to 9 count 0, tens and aces
    /// count -1.
    pub fn running_count(&self) -> i32 {
        (2..=ACE)
            .map(|card| hi_lo_weight(card) * self[card] as i32)
            .sum()
    }
}

impl Index<Card> for CardCount {
    type Output = u16;
    fn index(&self, card: Card) -> &Self::Output {
        &self.counts[index_of(card)]
    }
}

/// Running count normalised by the decks left, i.e.
/// `running_count / (remaining_cards / 52)`. 0 when no card is left.
pub fn true_count(running_count: i32, remaining_cards: usize) -> f64 {
    if remaining_cards == 0 {
        return 0.0;
    }
    running_count as f64 / (remaining_cards as f64 / 52.0)
}

fn hi_lo_weight(card: Card) -> i32 {
    match card {
        2..=6 => 1,
        7..=9 => 0,
        _ => -1,
    }
}

fn index_of(card: Card) -> usize {
    (card - 2) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_shoe_composition() {
        let count = CardCount::with_number_of_decks(6);
        assert_eq!(count.get_total(), 312);
        assert_eq!(count[2], 24);
        assert_eq!(count[TEN], 96);
        assert_eq!(count[ACE], 24);
        assert_eq!(count.running_count(), 0);
    }

    #[test]
    fn running_count_follows_hi_lo() {
        let mut count = CardCount::default();
        for card in [2, 3, 4, 5, 6] {
            count.add_card(card);
        }
        assert_eq!(count.running_count(), 5);
        for card in [7, 8, 9] {
            count.add_card(card);
        }
        assert_eq!(count.running_count(), 5);
        count.add_card(TEN);
        count.add_card(ACE);
        assert_eq!(count.running_count(), 3);
        assert_eq!(count.get_total(), 10);
    }

    #[test]
    fn seen_cards_are_the_complement_of_the_shoe() {
        let mut remaining: Vec<Card> = Vec::new();
        for card in 2..=ACE {
            let copies = if card == TEN { 16 } else { 4 };
            remaining.extend(std::iter::repeat(card).take(copies));
        }
        remaining.retain(|&card| card != 5);

        let seen = CardCount::seen_from_remaining(1, &remaining);
        assert_eq!(seen.get_total(), 4);
        assert_eq!(seen[5], 4);
        assert_eq!(seen.running_count(), 4);
    }

    #[test]
    fn removing_missing_cards_saturates() {
        let seen = CardCount::seen_from_remaining(1, &[ACE; 6]);
        assert_eq!(seen[ACE], 0);
        assert_eq!(seen.get_total(), 48);
    }

    #[test]
    fn true_count_divides_by_remaining_decks() {
        assert_eq!(true_count(6, 104), 3.0);
        assert_eq!(true_count(-3, 156), -1.0);
        assert_eq!(true_count(0, 52), 0.0);
        assert_eq!(true_count(5, 0), 0.0);
        assert_eq!(true_count(0, 0), 0.0);
    }
}
