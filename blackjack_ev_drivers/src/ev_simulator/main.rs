mod simulation;

use anyhow::{bail, Context, Result};
use blackjack_ev_drivers::{parse_config_from_file, Config};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack_ev.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Number of shoes to play
    #[arg(long)]
    episodes: Option<u64>,

    /// Number of worker threads, 0 for one per core
    #[arg(long)]
    workers: Option<usize>,

    /// Playing policy, e.g. basic-strategy-deviations
    #[arg(long)]
    mover: Option<String>,

    /// Bet-sizing policy, e.g. wong-bja-7
    #[arg(long)]
    better: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    /// Writes bets, rewards and true counts of every round to this JSON file
    #[arg(long)]
    records: Option<PathBuf>,

    /// Prints the report as JSON instead of tables
    #[arg(long)]
    json: bool,
}

impl CommandLineArgs {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(episodes) = self.episodes {
            config.simulation.episodes = episodes;
        }
        if let Some(workers) = self.workers {
            config.simulation.workers = workers;
        }
        if let Some(mover) = &self.mover {
            config.policies.mover = mover.clone();
        }
        if let Some(better) = &self.better {
            config.policies.better = better.clone();
        }
        if self.seed.is_some() {
            config.simulation.seed = self.seed;
        }
    }
}

fn load_config(path: &str) -> Result<Config> {
    if path != DEFAULT_CONFIG_PATH {
        return parse_config_from_file(Path::new(path));
    }
    let home_dir = home::home_dir().context("cannot find home directory")?;
    let config_file_path = home_dir.join(".blackjack_ev.yml");
    if !config_file_path.exists() {
        warn!(
            path = %config_file_path.display(),
            "config file not found, using built-in defaults"
        );
        return Ok(Config::default());
    }
    if config_file_path.is_dir() {
        bail!(
            "{} should be a file rather than a directory",
            config_file_path.display()
        );
    }
    parse_config_from_file(&config_file_path)
}

fn main() -> Result<()> {
    // Logs go to stderr so that --json output stays parseable.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = CommandLineArgs::parse();
    let mut config = load_config(&args.config)?;
    args.apply_overrides(&mut config);

    simulation::run(&config, args.records.as_deref(), args.json)
}
