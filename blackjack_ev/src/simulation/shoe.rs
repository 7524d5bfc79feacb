use crate::{Card, CardCount, SimulationError, ACE, TEN};

use rand::seq::SliceRandom;
use rand::Rng;

/// Represents a shoe in the real world. Cards are dealt from the end of the
/// underlying vector.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: Vec<Card>,
    starting_len: usize,
}

impl Shoe {
    /// Creates a new shoe with ordered cards.
    pub fn new(number_of_decks: u8) -> Shoe {
        let mut cards = Vec::with_capacity(number_of_decks as usize * 52);
        for _ in 0..number_of_decks {
            for card in 2..=ACE {
                let copies = if card == TEN { 16 } else { 4 };
                cards.extend(std::iter::repeat(card).take(copies));
            }
        }
        Shoe {
            starting_len: cards.len(),
            cards,
        }
    }

    /// Creates a shoe with exactly the given cards. The last card is dealt
    /// first. Every card must be a blackjack value from 2 to 11.
    pub fn from_cards(cards: Vec<Card>) -> Result<Shoe, SimulationError> {
        if let Some(card) = cards.iter().find(|&&card| !(2..=ACE).contains(&card)) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "{} is not a card value",
                card
            )));
        }
        Ok(Shoe {
            starting_len: cards.len(),
            cards,
        })
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Deals the next card. Running out of cards mid-round is an error rather
    /// than a silent reshuffle.
    pub fn draw(&mut self) -> Result<Card, SimulationError> {
        self.cards.pop().ok_or(SimulationError::ShoeExhausted)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn starting_len(&self) -> usize {
        self.starting_len
    }

    /// A new round is dealt only while `len() >= reshuffle_at`.
    pub fn reshuffle_at(&self, shoe_penetration: f64) -> usize {
        reshuffle_point(self.starting_len, shoe_penetration)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Every card of a full shoe that is no longer in this one.
    pub fn cards_seen(&self, number_of_decks: u8) -> CardCount {
        CardCount::seen_from_remaining(number_of_decks, &self.cards)
    }
}

/// Number of cards left in a shoe of `starting_len` cards when it is
/// replaced.
pub fn reshuffle_point(starting_len: usize, shoe_penetration: f64) -> usize {
    (starting_len as f64 * shoe_penetration) as usize
}
