//! Intrinsic Configuration Layer
//!
//! Valuation assumptions for the Intrinsic engine: the user-adjustable
//! scalars (risk-free rate, equity risk premium, tax rate, horizon, overrides),
//! named presets, and assumption files.
//!
//! # Features
//!
//! - **Assumptions**: every field has a serde default, so partial files are valid
//! - **Validation**: range checks collected into a list of [`ValidationError`]s
//! - **Presets**: `DEFAULT`, `CONSERVATIVE`, `AGGRESSIVE`, plus custom presets
//! - **Files**: JSON, TOML, and YAML, chosen by extension
//!
//! # Example
//!
//! ```rust
//! use intrinsic_config::{ConfigManager, Validate, ValuationAssumptions};
//!
//! let manager = ConfigManager::new();
//! let assumptions = manager.get("DEFAULT").unwrap();
//! assert_eq!(assumptions.horizon_years, 5);
//!
//! let case = ValuationAssumptions::new("BULL").with_growth_override(12.0);
//! assert!(case.is_valid());
//! let dcf = case.dcf_assumptions();
//! assert_eq!(dcf.fallback_exit_multiple, 10.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod assumptions;
mod error;
mod manager;

pub use assumptions::{ValuationAssumptions, MAX_HISTORY_WINDOW, MAX_HORIZON_YEARS};
pub use error::{ConfigError, ConfigResult, Validate, ValidationError};
pub use manager::{
    load_assumptions, save_assumptions, ConfigManager, FileFormat, DEFAULT_PRESET,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::assumptions::ValuationAssumptions;
    pub use crate::error::{ConfigError, ConfigResult, Validate};
    pub use crate::manager::{load_assumptions, ConfigManager};
}
