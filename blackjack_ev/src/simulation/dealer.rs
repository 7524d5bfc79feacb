use crate::{Card, SimulationError};

use super::{hand::Hand, shoe::Shoe, Seat, SimulationObserver};

/// Returned instead of a total when the dealer busts. Never a reachable hand
/// value, so any standing player total beats it.
pub const DEALER_BUST: u8 = 0;

/// Plays out the dealer hand and returns its final value, or [`DEALER_BUST`].
///
/// The dealer draws below 17 and, unless standing on soft 17, on a soft 17.
pub fn play_dealer(
    dealer_up_card: Card,
    dealer_hole_card: Card,
    shoe: &mut Shoe,
    dealer_stands_on_soft17: bool,
    observer: &mut dyn SimulationObserver,
) -> Result<u8, SimulationError> {
    let mut dealer = Hand::new(&[dealer_up_card, dealer_hole_card]);
    loop {
        let (value, soft_aces) = dealer.value_ace();
        let must_hit = value < 17 || (value == 17 && soft_aces > 0 && !dealer_stands_on_soft17);
        if !must_hit {
            break;
        }
        let card = shoe.draw()?;
        observer.on_card_drawn(Seat::Dealer, card);
        dealer.receive_card(card);
    }

    let value = dealer.value();
    let dealer_value = if value > 21 { DEALER_BUST } else { value };
    observer.on_dealer_finished(dealer_value);
    Ok(dealer_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::NoopObserver;
    use crate::{ACE, TEN};

    fn play(up: Card, hole: Card, cards: Vec<Card>, stands_on_soft17: bool) -> (u8, usize) {
        let mut shoe = Shoe::from_cards(cards).unwrap();
        let value = play_dealer(up, hole, &mut shoe, stands_on_soft17, &mut NoopObserver).unwrap();
        (value, shoe.len())
    }

    #[test]
    fn dealer_stands_on_hard_17() {
        assert_eq!(play(TEN, 7, vec![5], true), (17, 1));
        assert_eq!(play(TEN, 7, vec![5], false), (17, 1));
    }

    #[test]
    fn soft_17_depends_on_rule() {
        assert_eq!(play(ACE, 6, vec![3], true), (17, 1));
        assert_eq!(play(ACE, 6, vec![3], false), (20, 0));
    }

    #[test]
    fn dealer_draws_below_17() {
        assert_eq!(play(4, 2, vec![8, 4, 5, 2], true), (17, 1));
        assert_eq!(play(4, 2, vec![10, 5, 2], true), (DEALER_BUST, 0));
        // Soft 17 after the ace, hard 17 once the ten lands.
        assert_eq!(play(4, 2, vec![9, TEN, ACE], false), (17, 1));
    }

    #[test]
    fn dealer_busts_to_sentinel() {
        assert_eq!(play(TEN, 6, vec![9], true), (DEALER_BUST, 0));
    }

    #[test]
    fn same_shoe_gives_same_result() {
        let cards = vec![3, 9, 2, ACE, 4];
        assert_eq!(play(5, 6, cards.clone(), false), play(5, 6, cards, false));
    }

    #[test]
    fn empty_shoe_fails() {
        let mut shoe = Shoe::from_cards(vec![]).unwrap();
        assert!(matches!(
            play_dealer(TEN, 2, &mut shoe, true, &mut NoopObserver),
            Err(SimulationError::ShoeExhausted)
        ));
    }
}
