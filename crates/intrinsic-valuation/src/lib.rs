//! # Intrinsic Valuation
//!
//! Valuation engine for listed companies.
//!
//! This crate provides:
//!
//! - **Growth**: forward revenue growth blended from Holt smoothing and OLS regression
//! - **Capital**: WACC from a synthetic credit rating, CAPM, and preferred equity
//! - **DCF**: unlevered free cash flow projection, terminal value, equity bridge
//! - **Sustainable growth**: ROE-, ROIC-, DuPont-, and CAGR-based cross-checks
//! - **Sensitivity**: per-share value across WACC and exit multiple
//!
//! ## Architecture
//!
//! Growth forecasting and cost of capital are independent of each other. The
//! DCF projector takes both results as plain [`Rate`](intrinsic_core::Rate)s,
//! so callers can substitute overrides for either one.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use intrinsic_valuation::prelude::*;
//!
//! let growth = GrowthForecaster::new(5).forecast_statements(&company.statements);
//! let capital = CapitalCostCalculator::default().calculate(&company)?;
//! let dcf = DcfProjector::default().project(&company, growth.rate, capital.wacc)?;
//!
//! println!("{:.2} per share", dcf.intrinsic_value_per_share());
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
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::neg_cmp_op_on_partial_ord)]

pub mod capital;
pub mod dcf;
pub mod error;
pub mod growth;
pub mod sensitivity;
pub mod sustainable;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ValuationError, ValuationResult};

    // Growth
    pub use crate::growth::{
        GrowthEstimate, GrowthForecaster, GrowthMethod, HoltEstimate, ModelScale,
        RegressionEstimate,
    };

    // Capital
    pub use crate::capital::{
        CapitalAssumptions, CapitalCostCalculator, CapitalStructure, CostOfCapitalBreakdown,
        PreferredCostSource, RatingBand, SyntheticRatingTable,
    };

    // DCF
    pub use crate::dcf::{
        DcfAssumptions, DcfProjector, DcfValuation, EquityBridge, HistoricalRatios,
        MultipleSource, ProjectionRow, ProjectionSeries, RowKind, TerminalValue,
    };

    // Sustainable growth
    pub use crate::sustainable::{
        SgrMethod, SgrSelection, SustainableGrowth, SustainableGrowthEstimator,
    };

    // Sensitivity
    pub use crate::sensitivity::{sensitivity_grid, SensitivityConfig, SensitivityGrid};
}

pub use error::{ValuationError, ValuationResult};
