use thiserror::Error;

use crate::Action;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("policy chose `{action}` but {reason}")]
    InvalidDecision { action: Action, reason: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("the shoe ran out of cards in the middle of a round")]
    ShoeExhausted,

    #[error("unknown policy `{0}`")]
    UnknownPolicy(String),

    #[error("simulation worker {0} panicked")]
    WorkerPanicked(usize),
}
