use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::simulation::SimulationRecord;
use crate::SimulationError;

/// Settings that only affect how a finished run is summarised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportConfig {
    /// Bankroll, in betting units, used for the risk of ruin.
    pub units: f64,
    /// Size of the extra reporting window.
    pub hands_played: usize,
    /// Size of the chunks behind `ev_per_100` and `std_per_100`.
    pub chunk_size: usize,
}

impl ReportConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.hands_played == 0 || self.chunk_size == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "report windows must hold at least one hand".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            units: 200.0,
            hands_played: 1000,
            chunk_size: 100,
        }
    }
}

/// Summary metrics of a run. Metrics that can't be computed are NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub shoes: u64,
    pub hands_per_shoe: f64,
    pub avg_bet: f64,
    pub win_2_lose: f64,
    pub ev_per_shoe: f64,
    pub ev_per_100: f64,
    pub std_per_shoe: f64,
    pub std_per_100: f64,
    pub max_dd: f64,
    pub dd_duration_in_hands: f64,
    pub risk_of_ruin: f64,
    pub hands_played: usize,
    pub ev_per_window: f64,
    pub std_per_window: f64,
}

impl Summary {
    pub fn new(record: &SimulationRecord, report: &ReportConfig) -> Summary {
        let shoes = record.episodes;
        let hands = record.len() as f64;
        let mut summary = Summary {
            shoes,
            hands_per_shoe: hands / shoes as f64,
            avg_bet: f64::NAN,
            win_2_lose: f64::NAN,
            ev_per_shoe: f64::NAN,
            ev_per_100: f64::NAN,
            std_per_shoe: f64::NAN,
            std_per_100: f64::NAN,
            max_dd: f64::NAN,
            dd_duration_in_hands: f64::NAN,
            risk_of_ruin: f64::NAN,
            hands_played: report.hands_played,
            ev_per_window: f64::NAN,
            std_per_window: f64::NAN,
        };
        if record.is_empty() {
            return summary;
        }

        let rewards = &record.rewards;
        summary.avg_bet = mean(&record.bets);
        let total_win: f64 = rewards.iter().filter(|&&x| x > 0.0).sum();
        let total_loss: f64 = rewards.iter().filter(|&&x| x < 0.0).map(|x| -x).sum();
        summary.win_2_lose = if total_loss == 0.0 {
            f64::NAN
        } else {
            total_win / total_loss
        };
        summary.ev_per_shoe = rewards.iter().sum::<f64>() / shoes as f64;
        summary.std_per_shoe = std(rewards) * (hands / shoes as f64).sqrt();

        let per_chunk = sum_in_chunks(rewards, report.chunk_size);
        summary.ev_per_100 = mean(&per_chunk);
        summary.std_per_100 = std(&per_chunk);
        let per_window = sum_in_chunks(rewards, report.hands_played);
        summary.ev_per_window = mean(&per_window);
        summary.std_per_window = std(&per_window);

        if let Some((max_dd, duration)) = max_drawdown(rewards) {
            summary.max_dd = max_dd;
            summary.dd_duration_in_hands = duration as f64;
        }
        summary.risk_of_ruin = risk_of_ruin(mean(rewards), std(rewards), report.units);
        summary
    }

    fn rows(&self) -> Vec<(String, f64)> {
        vec![
            ("shoes".to_string(), self.shoes as f64),
            ("hands_per_shoe".to_string(), self.hands_per_shoe),
            ("avg_bet".to_string(), self.avg_bet),
            ("win_2_lose".to_string(), self.win_2_lose),
            ("ev_per_shoe".to_string(), self.ev_per_shoe),
            ("ev_per_100".to_string(), self.ev_per_100),
            ("std_per_shoe".to_string(), self.std_per_shoe),
            ("std_per_100".to_string(), self.std_per_100),
            ("max_dd".to_string(), self.max_dd),
            ("dd_duration_in_hands".to_string(), self.dd_duration_in_hands),
            ("risk_of_ruin".to_string(), self.risk_of_ruin),
            (format!("ev_per_{}", self.hands_played), self.ev_per_window),
            (format!("std_per_{}", self.hands_played), self.std_per_window),
        ]
    }
}

const CELL_WIDTH: usize = 20;

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        let width = (CELL_WIDTH + 1) * rows.len() + 1;

        writeln!(f, "{}", "=".repeat(width))?;
        write!(f, "|")?;
        for (name, _) in &rows {
            write!(f, "{:^w$}|", name, w = CELL_WIDTH)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(width))?;
        write!(f, "|")?;
        for (_, value) in &rows {
            write!(f, "{:^w$}|", format!("{:.3}", value), w = CELL_WIDTH)?;
        }
        writeln!(f)?;
        write!(f, "{}", "=".repeat(width))
    }
}

/// Mean and spread of the rewards of rounds bet at one true count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrueCountBucket {
    /// `floor(true count)`, with -1 standing for every count below 0 and 10
    /// for every count from 10 up.
    pub true_count: i32,
    pub hands: usize,
    pub ev: f64,
    pub std: f64,
}

pub fn ev_by_true_count(record: &SimulationRecord) -> Vec<TrueCountBucket> {
    let mut buckets: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for (&tc, &reward) in record.true_counts.iter().zip(&record.rewards) {
        let bucket = (tc.floor() as i32).clamp(-1, 10);
        buckets.entry(bucket).or_default().push(reward);
    }
    buckets
        .into_iter()
        .map(|(true_count, rewards)| TrueCountBucket {
            true_count,
            hands: rewards.len(),
            ev: mean(&rewards),
            std: std(&rewards),
        })
        .collect()
}

/// NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation. NaN for an empty slice.
pub fn std(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Sums of consecutive chunks; the last chunk may be shorter.
pub fn sum_in_chunks(values: &[f64], chunk_size: usize) -> Vec<f64> {
    if chunk_size == 0 {
        return Vec::new();
    }
    values.chunks(chunk_size).map(|chunk| chunk.iter().sum()).collect()
}

/// Largest drop of the cumulative profit below its running maximum, and the
/// number of hands from the peak before it to the trough, both inclusive.
/// Ties resolve to the earliest index.
pub fn max_drawdown(pnl: &[f64]) -> Option<(f64, usize)> {
    if pnl.is_empty() {
        return None;
    }
    let cumulative: Vec<f64> = pnl
        .iter()
        .scan(0.0, |sum, &x| {
            *sum += x;
            Some(*sum)
        })
        .collect();

    let mut running_max = f64::NEG_INFINITY;
    let mut max_dd = f64::NEG_INFINITY;
    let mut trough = 0;
    for (i, &value) in cumulative.iter().enumerate() {
        running_max = running_max.max(value);
        let drawdown = running_max - value;
        if drawdown > max_dd {
            max_dd = drawdown;
            trough = i;
        }
    }

    let mut peak = 0;
    for (i, &value) in cumulative[..=trough].iter().enumerate() {
        if value > cumulative[peak] {
            peak = i;
        }
    }
    Some((max_dd, trough - peak + 1))
}

/// `((1 - ev/sd) / (1 + ev/sd)) ^ (bankroll / sd)`, NaN when undefined.
pub fn risk_of_ruin(ev: f64, sd: f64, bankroll: f64) -> f64 {
    if sd == 0.0 || 1.0 + ev / sd == 0.0 {
        return f64::NAN;
    }
    ((1.0 - ev / sd) / (1.0 + ev / sd)).powf(bankroll / sd)
}
