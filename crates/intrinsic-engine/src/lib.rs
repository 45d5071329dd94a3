//! # Intrinsic Engine
//!
//! The reactive valuation engine for Intrinsic.
//!
//! This crate provides:
//! - [`compute`]: the whole pipeline as a pure function of [`ValuationInputs`]
//! - [`ReactiveValuation`]: recomputes on every input revision and publishes
//!   changed outputs through watch channels
//! - [`ValuationPublisher`]: latest-value channel for one methodology
//! - [`IntrinsicValueAggregator`]: averages several methodologies' values
//!
//! ## Architecture
//!
//! ```text
//! Statements ─┬─> Growth ──────┐
//!             │                ├─> DCF ─> ValuationPublisher ─> Aggregator
//! Quote ──────┼─> Capital ─────┘
//!             │
//!             └─> Sustainable growth
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let inputs = ValuationInputs::new(company, ValuationAssumptions::default());
//! let mut valuation = ReactiveValuation::new(inputs)?;
//! let mut dcf = valuation.subscribe_dcf();
//!
//! valuation.update(InputChange::WaccOverride(Some(9.0)))?;
//! assert!(dcf.has_changed()?);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregator;
pub mod error;
pub mod pipeline;
pub mod publisher;
pub mod reactive;

// Re-exports
pub use aggregator::{AggregateValue, Contribution, IntrinsicValueAggregator};
pub use error::{EngineError, EngineResult};
pub use pipeline::{
    capital_stage, compute, dcf_stage, effective_wacc, growth_stage, sustainable_stage,
    InputChange, Stage, ValuationInputs, ValuationOutputs,
};
pub use publisher::{ValuationPublisher, ValuationSummary};
pub use reactive::{ChangeSet, ReactiveValuation, DCF_METHODOLOGY};
