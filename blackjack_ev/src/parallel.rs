use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::betting::BetSizingPolicy;
use crate::simulation::{play_episodes, SimulationObserver, SimulationRecord};
use crate::strategy::PlayingPolicy;
use crate::{SimulationConfig, SimulationError};

/// 0 means one worker per available core.
pub fn resolve_workers(workers: usize) -> usize {
    if workers == 0 {
        match std::thread::available_parallelism() {
            Ok(n) => n.get(),
            Err(_) => 1,
        }
    } else {
        workers
    }
}

/// Episodes per worker, as even as possible. The first workers take the
/// remainder.
pub fn split_episodes(episodes: u64, workers: usize) -> Vec<u64> {
    let workers = workers.max(1) as u64;
    let share = episodes / workers;
    let remainder = episodes % workers;
    (0..workers)
        .map(|i| share + u64::from(i < remainder))
        .collect()
}

/// Worker `i` draws from `seed + i`, or from entropy without a seed.
pub fn worker_rng(seed: Option<u64>, worker: usize) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(worker as u64)),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Runs `config.episodes` shoes on `config.workers` threads and concatenates
/// their records in worker order. Every worker owns its shoe, generator and
/// observer; the policies are shared read-only.
pub fn run_parallel<F, O>(
    config: &SimulationConfig,
    playing: &dyn PlayingPolicy,
    betting: &dyn BetSizingPolicy,
    make_observer: F,
) -> Result<SimulationRecord, SimulationError>
where
    F: Fn(usize) -> O + Sync,
    O: SimulationObserver,
{
    config.validate()?;
    let shares = split_episodes(config.episodes, config.workers);
    let make_observer = &make_observer;

    let results = std::thread::scope(|scope| {
        let mut threads = Vec::with_capacity(shares.len());
        for (worker, &episodes) in shares.iter().enumerate() {
            let thread = scope.spawn(move || {
                info!(worker, episodes, "worker started");
                let mut rng = worker_rng(config.seed, worker);
                let mut observer = make_observer(worker);
                let record =
                    play_episodes(config, episodes, playing, betting, &mut rng, &mut observer);
                if let Ok(record) = &record {
                    info!(worker, rounds = record.len(), "worker finished");
                }
                record
            });
            threads.push(thread);
        }

        threads
            .into_iter()
            .enumerate()
            .map(|(worker, thread)| match thread.join() {
                Ok(record) => record,
                Err(_) => Err(SimulationError::WorkerPanicked(worker)),
            })
            .collect::<Vec<_>>()
    });

    let mut merged = SimulationRecord::default();
    for record in results {
        merged.append(record?);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::betting::BetPolicyKind;
    use crate::simulation::NoopObserver;
    use crate::strategy::PlayingPolicyKind;

    #[test]
    fn episodes_are_split_evenly() {
        assert_eq!(split_episodes(10, 3), vec![4, 3, 3]);
        assert_eq!(split_episodes(9, 3), vec![3, 3, 3]);
        assert_eq!(split_episodes(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(split_episodes(5, 1), vec![5]);
    }

    #[test]
    fn zero_workers_means_every_core() {
        assert!(resolve_workers(0) >= 1);
        assert_eq!(resolve_workers(3), 3);
    }

    #[test]
    fn seeded_workers_use_distinct_streams() {
        use rand::Rng;
        let a: u64 = worker_rng(Some(1), 0).gen();
        let b: u64 = worker_rng(Some(1), 1).gen();
        let c: u64 = worker_rng(Some(2), 0).gen();
        assert_ne!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn invalid_config_fails_before_running() {
        let config = SimulationConfig {
            number_of_other_players: 5,
            ..Default::default()
        };
        let playing = PlayingPolicyKind::Simple.build();
        let betting = BetPolicyKind::Simple.build();
        let result = run_parallel(&config, playing.as_ref(), betting.as_ref(), |_| NoopObserver);
        assert!(matches!(result, Err(SimulationError::InvalidConfiguration(_))));
    }

    #[test]
    fn merged_record_matches_sequential_workers() {
        let config = SimulationConfig {
            episodes: 5,
            workers: 2,
            seed: Some(9),
            ..Default::default()
        };
        let playing = PlayingPolicyKind::BasicStrategy.build();
        let betting = BetPolicyKind::Simple.build();
        let merged =
            run_parallel(&config, playing.as_ref(), betting.as_ref(), |_| NoopObserver).unwrap();

        let mut expected = SimulationRecord::default();
        for (worker, episodes) in split_episodes(5, 2).into_iter().enumerate() {
            let mut rng = worker_rng(Some(9), worker);
            expected.append(
                play_episodes(
                    &config,
                    episodes,
                    playing.as_ref(),
                    betting.as_ref(),
                    &mut rng,
                    &mut NoopObserver,
                )
                .unwrap(),
            );
        }
        assert_eq!(merged, expected);
        assert_eq!(merged.episodes, 5);
    }
}
