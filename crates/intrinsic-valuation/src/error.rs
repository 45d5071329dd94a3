//! Error types for the valuation engine.

use intrinsic_core::Rate;
use intrinsic_math::MathError;
use thiserror::Error;

/// A specialized Result type for valuation operations.
pub type ValuationResult<T> = Result<T, ValuationError>;

/// Errors that can occur while valuing a company.
///
/// Degenerate ratios (zero revenue, negative equity, ...) are not errors;
/// they are excluded from averages. These variants cover the cases where a
/// component cannot produce any meaningful output at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    /// Fewer records than a component needs.
    #[error("Insufficient data for {component}: need at least {required}, got {actual}")]
    InsufficientData {
        /// Component or input that is short of data.
        component: &'static str,
        /// Minimum number of records required.
        required: usize,
        /// Number of records available.
        actual: usize,
    },

    /// Perpetuity growth at or above the discount rate.
    #[error("Terminal growth {growth} must be below the discount rate {wacc}")]
    InvalidTerminalGrowth {
        /// Discount rate.
        wacc: Rate,
        /// Perpetual growth rate.
        growth: Rate,
    },

    /// An assumption outside its admissible range.
    #[error("Invalid assumption {name}: {reason}")]
    InvalidAssumption {
        /// Assumption name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Synthetic rating table that is unsorted, gapped, or not total.
    #[error("Invalid rating table: {reason}")]
    InvalidRatingTable {
        /// Description of the defect.
        reason: String,
    },

    /// Numerical routine failure.
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

impl ValuationError {
    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(component: &'static str, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            component,
            required,
            actual,
        }
    }

    /// Creates an invalid assumption error.
    #[must_use]
    pub fn invalid_assumption(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidAssumption {
            name,
            reason: reason.into(),
        }
    }

    /// Creates an invalid rating table error.
    #[must_use]
    pub fn invalid_rating_table(reason: impl Into<String>) -> Self {
        Self::InvalidRatingTable {
            reason: reason.into(),
        }
    }

    /// Returns true for the "cannot compute" state caused by missing history.
    #[must_use]
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
