//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Horizon outside the supported range.
    #[error("Invalid horizon: {0}. Must be between 1 and 10 years.")]
    InvalidHorizon(u32),

    /// Rate outside a plausible range.
    #[error("Invalid {name}: {value}. Must be between {min} and {max} percent.")]
    InvalidPercent {
        /// Argument name.
        name: &'static str,
        /// Value given.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Non-positive multiple or step.
    #[error("Invalid {name}: {value}. Must be positive.")]
    NotPositive {
        /// Argument name.
        name: &'static str,
        /// Value given.
        value: f64,
    },

    /// Unknown sustainable growth method name.
    #[error("Unknown SGR method: {0}")]
    UnknownMethod(String),

    /// Company snapshot could not be read.
    #[error("Cannot read company snapshot {}: {message}", .path.display())]
    Snapshot {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },

    /// A valuation stage could not produce a result.
    #[error("Calculation error: {0}")]
    Calculation(String),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
