//! # Intrinsic Math
//!
//! Numerical routines for the Intrinsic valuation engine.
//!
//! This crate provides:
//!
//! - **Smoothing**: Holt's linear-trend (double exponential) smoothing
//! - **Regression**: Ordinary least squares on a single regressor
//! - **Optimization**: Exhaustive grid search with a coarse-to-fine refinement pass
//! - **Statistics**: Guarded ratios and averages that drop degenerate points
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: every routine is a pure function of its inputs
//! - **Numerical Stability**: degenerate denominators yield `None`, never `NaN`
//! - **Small Inputs**: tuned for a handful of annual observations, not big data

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
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::neg_cmp_op_on_partial_ord)]

pub mod error;
pub mod optimization;
pub mod regression;
pub mod smoothing;
pub mod stats;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::optimization::{
        grid_search_2d, two_stage_grid_search, GridAxis, GridPoint, TwoStageConfig,
        TwoStageResult,
    };
    pub use crate::regression::LinearRegression;
    pub use crate::smoothing::{HoltFit, HoltLinear};
    pub use crate::stats::{cagr, mean, mean_defined, safe_div, safe_ratio};
}

pub use error::{MathError, MathResult};
