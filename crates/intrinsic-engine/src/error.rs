//! Engine error types.

use thiserror::Error;

use intrinsic_config::ConfigError;
use intrinsic_valuation::ValuationError;

/// Engine result type.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The company has no income statement, balance sheet, or cash-flow statement.
    #[error("no statement data for {symbol}")]
    NoStatementData {
        /// Ticker of the company.
        symbol: String,
    },

    /// Assumptions failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The DCF was required but its stage failed.
    #[error("valuation error: {0}")]
    Valuation(#[from] ValuationError),
}
