use std::error::Error as StdError;

use thiserror::Error;

/// Errors that can occur during fixed-point solving.
///
/// Iteration exhaustion is not an error; it is reported through
/// [`Status::MaxIters`](super::Status::MaxIters).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error("initial guess contains non-finite value at index {index}: {value}")]
    NonFiniteGuess { index: usize, value: f64 },

    #[error("update has {found} components but the iterate has {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("non-finite update at iteration {iter}, index {index}: {value}")]
    NonFiniteUpdate {
        iter: usize,
        index: usize,
        value: f64,
    },

    #[error("failed to compute input")]
    Input(#[source] Box<dyn StdError + Send + Sync>),

    #[error("model call failed")]
    Model(#[source] Box<dyn StdError + Send + Sync>),

    #[error("failed to compute update")]
    Update(#[source] Box<dyn StdError + Send + Sync>),
}
