use anyhow::{Context, Result};
use blackjack_ev::parallel::{resolve_workers, run_parallel};
use blackjack_ev::simulation::{SimulationRecord, TracingObserver};
use blackjack_ev::statistics::{ev_by_true_count, Summary, TrueCountBucket};
use blackjack_ev_drivers::{Config, Policies};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Serialize)]
struct Report {
    playing_policy: String,
    betting_policy: String,
    summary: Summary,
    ev_by_true_count: Vec<TrueCountBucket>,
}

/// Plays the configured shoes, prints the report and optionally writes the
/// raw record to `records_path`.
pub fn run(config: &Config, records_path: Option<&Path>, json: bool) -> Result<()> {
    let mut simulation_config = config.simulation_config();
    simulation_config.workers = resolve_workers(simulation_config.workers);
    let report_config = config.report_config();
    report_config.validate()?;
    let policies: Policies = config
        .policies
        .clone()
        .try_into()
        .context("invalid policy in config")?;

    info!(
        episodes = simulation_config.episodes,
        workers = simulation_config.workers,
        playing = %policies.playing,
        betting = %policies.betting,
        "starting simulation"
    );
    let playing = policies.playing.build();
    let betting = policies.betting.build();
    let started = Instant::now();
    let record = run_parallel(
        &simulation_config,
        playing.as_ref(),
        betting.as_ref(),
        TracingObserver::new,
    )?;
    info!(
        rounds = record.len(),
        elapsed = ?started.elapsed(),
        "simulation finished"
    );

    let report = Report {
        playing_policy: policies.playing.to_string(),
        betting_policy: policies.betting.to_string(),
        summary: Summary::new(&record, &report_config),
        ev_by_true_count: ev_by_true_count(&record),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} / {}", report.playing_policy, report.betting_policy);
        println!("{}", report.summary);
        print_ev_by_true_count(&report.ev_by_true_count);
    }

    if let Some(path) = records_path {
        write_records(path, &record)?;
        info!(path = %path.display(), "records written");
    }
    Ok(())
}

fn bucket_label(true_count: i32) -> String {
    match true_count {
        -1 => String::from("<0"),
        10 => String::from(">=10"),
        tc => tc.to_string(),
    }
}

fn print_ev_by_true_count(buckets: &[TrueCountBucket]) {
    println!("{:>6}|{:>10}|{:>10}|{:>10}", "tc", "hands", "ev", "std");
    for bucket in buckets {
        println!(
            "{:>6}|{:>10}|{:>10.4}|{:>10.4}",
            bucket_label(bucket.true_count),
            bucket.hands,
            bucket.ev,
            bucket.std
        );
    }
}

fn write_records(path: &Path, record: &SimulationRecord) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create records file {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), record)
        .with_context(|| format!("cannot write records to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_ended_buckets_are_labelled() {
        assert_eq!(bucket_label(-1), "<0");
        assert_eq!(bucket_label(0), "0");
        assert_eq!(bucket_label(4), "4");
        assert_eq!(bucket_label(10), ">=10");
    }

    #[test]
    fn records_are_exported_as_json() {
        let mut record = SimulationRecord::default();
        record.push(1.0, -1.0, 0.0);
        record.push(2.0, 3.0, 2.5);
        record.episodes = 1;
        let path = std::env::temp_dir()
            .join(format!("blackjack_ev_records_{}.json", std::process::id()));
        write_records(&path, &record).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(written["bets"], serde_json::json!([1.0, 2.0]));
        assert_eq!(written["rewards"], serde_json::json!([-1.0, 3.0]));
        assert_eq!(written["true_counts"], serde_json::json!([0.0, 2.5]));
        assert_eq!(written["episodes"], 1);
    }
}
