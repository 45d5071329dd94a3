//! # Intrinsic Core
//!
//! Core types for the Intrinsic equity valuation engine.
//!
//! This crate provides the foundational building blocks used throughout Intrinsic:
//!
//! - **Rates**: [`Rate`], a decimal-fraction newtype with explicit percent conversions
//! - **Statements**: Income statement, balance sheet, and cash-flow records keyed by
//!   fiscal period end, collected in date-ordered [`StatementSeries`]
//! - **Market data**: Quote and company profile snapshots
//! - **Credit ratings**: Agency-agnostic [`CreditRating`] scale
//! - **Field fallbacks**: [`FieldChain`], an auditable ordered list of named accessors
//!
//! ## Design Philosophy
//!
//! - **One canonical unit**: rates are decimal fractions inside the engine and are
//!   converted to percent only at configuration and presentation boundaries
//! - **Immutable snapshots**: statement series are validated once and never mutated
//! - **Explicit Over Implicit**: fallback precedence is data, not chained `||`
//!
//! ## Example
//!
//! ```rust
//! use intrinsic_core::prelude::*;
//!
//! let rf = Rate::from_percent(4.25);
//! assert!((rf.as_decimal() - 0.0425).abs() < 1e-12);
//! assert_eq!(rf.to_string(), "4.25%");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::return_self_not_must_use)]

pub mod error;
pub mod fallback;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::fallback::{FieldChain, Resolved};
    pub use crate::types::{
        BalanceSheet, BetaPolicy, CashFlowStatement, CompanyData, CompanyProfile, CreditRating,
        DiscountConvention, FinancialStatements, IncomeStatement, Period, Quote, Rate,
        StatementSeries, TerminalMethod,
    };
}

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult};
pub use fallback::{FieldChain, Resolved};
pub use types::{CompanyData, FinancialStatements, Rate};
