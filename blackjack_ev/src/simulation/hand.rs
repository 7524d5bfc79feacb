use crate::{Card, ACE};

/// The cards of one player hand or of the dealer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new(cards: &[Card]) -> Hand {
        Hand {
            cards: cards.to_vec(),
        }
    }

    pub fn receive_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Returns the best total and the number of aces still counted as 11.
    /// Aces are demoted to 1, one at a time, while the total exceeds 21.
    pub fn value_ace(&self) -> (u8, u8) {
        let mut total: u16 = self.cards.iter().map(|&card| card as u16).sum();
        let mut soft_aces = self.cards.iter().filter(|&&card| card == ACE).count() as u8;
        while total > 21 && soft_aces > 0 {
            total -= 10;
            soft_aces -= 1;
        }
        (total as u8, soft_aces)
    }

    pub fn value(&self) -> u8 {
        self.value_ace().0
    }

    pub fn is_soft(&self) -> bool {
        self.value_ace().1 > 0
    }

    pub fn is_bust(&self) -> bool {
        self.value() > 21
    }

    pub fn is_natural(&self) -> bool {
        self.cards.len() == 2 && self.value() == 21
    }

    pub fn is_pair(&self) -> bool {
        self.cards.len() == 2 && self.cards[0] == self.cards[1]
    }
}

impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Hand { cards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aces_are_demoted_one_at_a_time() {
        assert_eq!(Hand::new(&[11, 6]).value_ace(), (17, 1));
        assert_eq!(Hand::new(&[11, 11]).value_ace(), (12, 1));
        assert_eq!(Hand::new(&[11, 11, 9]).value_ace(), (21, 1));
        assert_eq!(Hand::new(&[11, 6, 10]).value_ace(), (17, 0));
        assert_eq!(Hand::new(&[10, 6, 10]).value_ace(), (26, 0));
        assert_eq!(Hand::new(&[11; 4]).value_ace(), (14, 1));
    }

    #[test]
    fn value_never_needs_further_reduction() {
        for a in 2..=ACE {
            for b in 2..=ACE {
                for c in 2..=ACE {
                    let (total, soft_aces) = Hand::new(&[a, b, c, ACE]).value_ace();
                    assert!(total <= 21 || soft_aces == 0);
                }
            }
        }
    }

    #[test]
    fn classifies_hands() {
        assert!(Hand::new(&[11, 10]).is_natural());
        assert!(!Hand::new(&[7, 7, 7]).is_natural());
        assert!(Hand::new(&[8, 8]).is_pair());
        assert!(!Hand::new(&[8, 8, 2]).is_pair());
        assert!(Hand::new(&[11, 5]).is_soft());
        assert!(!Hand::new(&[11, 5, 10]).is_soft());
        assert!(Hand::new(&[10, 5, 10]).is_bust());
        assert!(!Hand::new(&[11, 11, 10]).is_bust());
    }
}
