pub mod dealer;
pub mod hand;
pub mod resolver;
pub mod round;
pub mod shoe;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::betting::BetSizingPolicy;
use crate::strategy::PlayingPolicy;
use crate::{true_count, Card, Decision, SimulationConfig, SimulationError};

use self::{hand::Hand, round::Round, shoe::Shoe};

/// Splits allowed per starting hand: the original hand plus up to 3 splits.
pub const INITIAL_SPLITS: u8 = 3;

/// Who a card was dealt to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Player,
    Dealer,
    OtherPlayer,
}

/// Per-round sequences of one run. The three vectors always have equal
/// length; rewards are already scaled by the bet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationRecord {
    pub bets: Vec<f64>,
    pub rewards: Vec<f64>,
    pub true_counts: Vec<f64>,
    /// Number of shoes played to produce these rounds.
    pub episodes: u64,
}

impl SimulationRecord {
    pub fn push(&mut self, bet: f64, reward: f64, true_count: f64) {
        self.bets.push(bet);
        self.rewards.push(reward);
        self.true_counts.push(true_count);
    }

    /// Appends the rounds of `other` after those of `self`.
    pub fn append(&mut self, mut other: SimulationRecord) {
        self.bets.append(&mut other.bets);
        self.rewards.append(&mut other.rewards);
        self.true_counts.append(&mut other.true_counts);
        self.episodes += other.episodes;
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

/// Hooks invoked at the state transitions of a simulation. Every hook defaults
/// to doing nothing.
pub trait SimulationObserver {
    fn on_shoe_started(&mut self, _episode: u64, _shoe: &Shoe) {}
    fn on_bet_placed(&mut self, _bet: f64, _true_count: f64) {}
    fn on_card_drawn(&mut self, _seat: Seat, _card: Card) {}
    fn on_decision(&mut self, _hand: &Hand, _decision: Decision) {}
    fn on_hand_resolved(&mut self, _hand: &Hand) {}
    fn on_dealer_finished(&mut self, _dealer_value: u8) {}
    fn on_round_finished(&mut self, _reward: f64) {}
    fn on_episode_finished(&mut self, _episode: u64, _episodes: u64) {}
}

pub struct NoopObserver;

impl SimulationObserver for NoopObserver {}

const PROGRESS_INTERVAL: u64 = 10_000;

/// Forwards the simulation events to `tracing`.
pub struct TracingObserver {
    worker: usize,
}

impl TracingObserver {
    pub fn new(worker: usize) -> Self {
        TracingObserver { worker }
    }
}

impl SimulationObserver for TracingObserver {
    fn on_shoe_started(&mut self, episode: u64, shoe: &Shoe) {
        debug!(worker = self.worker, episode, cards = shoe.len(), "shoe started");
    }

    fn on_bet_placed(&mut self, bet: f64, true_count: f64) {
        trace!(worker = self.worker, bet, true_count, "bet placed");
    }

    fn on_card_drawn(&mut self, seat: Seat, card: Card) {
        trace!(worker = self.worker, ?seat, card, "card drawn");
    }

    fn on_decision(&mut self, hand: &Hand, decision: Decision) {
        trace!(
            worker = self.worker,
            cards = ?hand.cards(),
            action = %decision.action,
            insurance = decision.take_insurance,
            "decision made"
        );
    }

    fn on_hand_resolved(&mut self, hand: &Hand) {
        trace!(worker = self.worker, cards = ?hand.cards(), value = hand.value(), "hand resolved");
    }

    fn on_dealer_finished(&mut self, dealer_value: u8) {
        trace!(worker = self.worker, dealer_value, "dealer finished");
    }

    fn on_round_finished(&mut self, reward: f64) {
        trace!(worker = self.worker, reward, "round finished");
    }

    fn on_episode_finished(&mut self, episode: u64, episodes: u64) {
        let finished = episode + 1;
        if finished % PROGRESS_INTERVAL == 0 || finished == episodes {
            info!(worker = self.worker, finished, episodes, "simulation progress");
        }
    }
}

/// Plays `episodes` shoes from start to reshuffle with one player seat and
/// returns one record entry per round.
pub fn play_episodes<R: Rng + ?Sized>(
    config: &SimulationConfig,
    episodes: u64,
    playing: &dyn PlayingPolicy,
    betting: &dyn BetSizingPolicy,
    rng: &mut R,
    observer: &mut dyn SimulationObserver,
) -> Result<SimulationRecord, SimulationError> {
    let rule = &config.rule;
    let mut record = SimulationRecord::default();

    for episode in 0..episodes {
        let mut shoe = Shoe::new(rule.number_of_decks);
        shoe.shuffle(rng);
        let reshuffle_at = shoe.reshuffle_at(rule.shoe_penetration);
        observer.on_shoe_started(episode, &shoe);

        while shoe.len() >= reshuffle_at {
            let cards_seen = shoe.cards_seen(rule.number_of_decks);
            let tc = true_count(cards_seen.running_count(), shoe.len());
            let bet = betting.bet(&cards_seen, rule.number_of_decks);
            observer.on_bet_placed(bet, tc);

            let (player_first, dealer_up_card) =
                deal_pass(&mut shoe, observer, config.number_of_other_players)?;
            let (player_second, dealer_hole_card) =
                deal_pass(&mut shoe, observer, config.number_of_other_players)?;

            let reward = Round::new(
                rule,
                playing,
                &mut shoe,
                &mut *observer,
                dealer_up_card,
                dealer_hole_card,
            )
            .simulate([player_first, player_second], INITIAL_SPLITS)?;
            observer.on_round_finished(reward * bet);
            record.push(bet, reward * bet, tc);
        }

        record.episodes += 1;
        observer.on_episode_finished(episode, episodes);
    }

    Ok(record)
}

/// Burns one card per other player, then deals one card to the player and
/// one to the dealer.
fn deal_pass(
    shoe: &mut Shoe,
    observer: &mut dyn SimulationObserver,
    number_of_other_players: u8,
) -> Result<(Card, Card), SimulationError> {
    for _ in 0..number_of_other_players {
        let card = shoe.draw()?;
        observer.on_card_drawn(Seat::OtherPlayer, card);
    }
    let player_card = shoe.draw()?;
    observer.on_card_drawn(Seat::Player, player_card);
    let dealer_card = shoe.draw()?;
    observer.on_card_drawn(Seat::Dealer, dealer_card);
    Ok((player_card, dealer_card))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::betting::BetPolicyKind;
    use crate::strategy::PlayingPolicyKind;
    use crate::Rule;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn get_typical_config() -> SimulationConfig {
        SimulationConfig {
            rule: Rule {
                number_of_decks: 2,
                shoe_penetration: 0.25,
                dealer_peeks: true,
                allow_das: true,
                dealer_stands_on_soft17: true,
                allow_surrender: true,
            },
            number_of_other_players: 0,
            episodes: 10,
            workers: 1,
            seed: Some(42),
        }
    }

    #[derive(Default)]
    struct CountingObserver {
        shoes: u64,
        bets: usize,
        rounds: usize,
        other_player_cards: usize,
        episodes_finished: u64,
    }

    impl SimulationObserver for CountingObserver {
        fn on_shoe_started(&mut self, _: u64, shoe: &Shoe) {
            assert_eq!(shoe.len(), 104);
            self.shoes += 1;
        }

        fn on_bet_placed(&mut self, _: f64, _: f64) {
            self.bets += 1;
        }

        fn on_card_drawn(&mut self, seat: Seat, _: Card) {
            if seat == Seat::OtherPlayer {
                self.other_player_cards += 1;
            }
        }

        fn on_round_finished(&mut self, _: f64) {
            self.rounds += 1;
        }

        fn on_episode_finished(&mut self, _: u64, _: u64) {
            self.episodes_finished += 1;
        }
    }

    fn run(config: &SimulationConfig, observer: &mut dyn SimulationObserver) -> SimulationRecord {
        let playing = PlayingPolicyKind::BasicStrategy.build();
        let betting = BetPolicyKind::CardCount.build();
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed.unwrap_or_default());
        play_episodes(
            config,
            config.episodes,
            playing.as_ref(),
            betting.as_ref(),
            &mut rng,
            observer,
        )
        .unwrap()
    }

    #[test]
    fn records_have_equal_lengths() {
        let config = get_typical_config();
        let mut observer = CountingObserver::default();
        let record = run(&config, &mut observer);

        assert!(!record.is_empty());
        assert_eq!(record.bets.len(), record.rewards.len());
        assert_eq!(record.bets.len(), record.true_counts.len());
        assert_eq!(record.episodes, 10);
        assert_eq!(observer.shoes, 10);
        assert_eq!(observer.episodes_finished, 10);
        assert_eq!(observer.bets, record.len());
        assert_eq!(observer.rounds, record.len());
        assert_eq!(observer.other_player_cards, 0);
        assert!(record.bets.iter().all(|&bet| (1.0..=100.0).contains(&bet)));
    }

    #[test]
    fn first_round_of_a_shoe_sees_a_neutral_count() {
        let mut config = get_typical_config();
        config.episodes = 1;
        let record = run(&config, &mut NoopObserver);
        assert_eq!(record.true_counts[0], 0.0);
        assert_eq!(record.bets[0], 1.0);
    }

    #[test]
    fn other_players_burn_cards() {
        let mut config = get_typical_config();
        config.number_of_other_players = 2;
        let mut observer = CountingObserver::default();
        let record = run(&config, &mut observer);
        assert_eq!(observer.other_player_cards, record.len() * 2 * 2);
    }

    #[test]
    fn same_seed_gives_same_record() {
        let config = get_typical_config();
        assert_eq!(run(&config, &mut NoopObserver), run(&config, &mut NoopObserver));
    }

    #[test]
    fn records_are_appended_in_order() {
        let mut first = SimulationRecord::default();
        first.push(1.0, -1.0, 0.0);
        first.episodes = 1;
        let mut second = SimulationRecord::default();
        second.push(2.0, 3.0, 1.5);
        second.episodes = 2;

        first.append(second);
        assert_eq!(first.bets, vec![1.0, 2.0]);
        assert_eq!(first.rewards, vec![-1.0, 3.0]);
        assert_eq!(first.true_counts, vec![0.0, 1.5]);
        assert_eq!(first.episodes, 3);
    }
}
