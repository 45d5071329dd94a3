//! Error types for the core domain model.

use chrono::NaiveDate;
use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building core domain values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Two records in one statement series share a period end date.
    #[error("Duplicate period {date} in {statement} series")]
    DuplicatePeriod {
        /// Statement kind the duplicate was found in.
        statement: &'static str,
        /// The repeated period end date.
        date: NaiveDate,
    },

    /// Invalid input value.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl CoreError {
    /// Creates a duplicate period error.
    #[must_use]
    pub fn duplicate_period(statement: &'static str, date: NaiveDate) -> Self {
        Self::DuplicatePeriod { statement, date }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
