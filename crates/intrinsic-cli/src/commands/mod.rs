//! CLI command implementations.

pub mod config;
pub mod dcf;
pub mod growth;
pub mod sensitivity;
pub mod sgr;
pub mod value;
pub mod wacc;

// Re-export submodules for convenience
pub use config::ConfigArgs;
pub use dcf::DcfArgs;
pub use growth::GrowthArgs;
pub use sensitivity::SensitivityArgs;
pub use sgr::SgrArgs;
pub use value::ValueArgs;
pub use wacc::WaccArgs;

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use intrinsic_config::{load_assumptions, ConfigManager, ValuationAssumptions, DEFAULT_PRESET};
use intrinsic_core::CompanyData;
use intrinsic_engine::ValuationInputs;

use crate::error::{CliError, CliResult};

/// Company snapshot and assumption arguments shared by the valuation commands.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Company snapshot (JSON: symbol, quote, profile, statement arrays)
    #[arg(short, long, env = "INTRINSIC_INPUT")]
    pub input: PathBuf,

    /// Assumptions file (.json, .toml, .yaml). Takes precedence over --preset.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Named assumption preset
    #[arg(short, long, default_value = DEFAULT_PRESET)]
    pub preset: String,

    /// Forecast horizon in years (1-10)
    #[arg(long)]
    pub horizon: Option<u32>,

    /// Manual WACC (percent), replacing the computed one in the DCF
    #[arg(long)]
    pub wacc: Option<f64>,

    /// Manual growth rate (percent), replacing the forecast in the DCF
    #[arg(long)]
    pub growth: Option<f64>,

    /// Exit EV/EBITDA multiple
    #[arg(long)]
    pub exit_multiple: Option<f64>,

    /// Risk-free rate (percent)
    #[arg(long)]
    pub risk_free: Option<f64>,

    /// Equity risk premium (percent)
    #[arg(long)]
    pub erp: Option<f64>,

    /// Marginal tax rate (percent)
    #[arg(long)]
    pub tax_rate: Option<f64>,
}

impl InputArgs {
    /// Loads the snapshot and resolves assumptions: file or preset, then flags.
    pub fn load(&self) -> anyhow::Result<ValuationInputs> {
        let company = load_company(&self.input)?;

        let mut assumptions = match &self.config {
            Some(path) => load_assumptions(path)?,
            None => ConfigManager::new().get(&self.preset)?,
        };
        self.apply_overrides(&mut assumptions)?;
        debug!(preset = %assumptions.name, symbol = %company.symbol, "inputs loaded");

        Ok(ValuationInputs::new(company, assumptions))
    }

    fn apply_overrides(&self, a: &mut ValuationAssumptions) -> CliResult<()> {
        if let Some(h) = self.horizon {
            a.horizon_years = validate_horizon(h)?;
        }
        if let Some(w) = self.wacc {
            a.wacc_override_pct = Some(validate_percent("wacc", w, 0.0, 100.0)?);
        }
        if let Some(g) = self.growth {
            a.growth_override_pct = Some(validate_percent("growth", g, -100.0, 100.0)?);
        }
        if let Some(m) = self.exit_multiple {
            a.exit_multiple = Some(validate_positive("exit multiple", m)?);
        }
        if let Some(r) = self.risk_free {
            a.risk_free_rate_pct = validate_percent("risk-free rate", r, -5.0, 25.0)?;
        }
        if let Some(e) = self.erp {
            a.equity_risk_premium_pct = validate_percent("equity risk premium", e, 0.0, 25.0)?;
        }
        if let Some(t) = self.tax_rate {
            a.marginal_tax_rate_pct = validate_percent("tax rate", t, 0.0, 100.0)?;
        }
        Ok(())
    }
}

/// Reads a company snapshot from JSON.
pub fn load_company(path: &Path) -> CliResult<CompanyData> {
    let text = fs::read_to_string(path).map_err(|e| CliError::Snapshot {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| CliError::Snapshot {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Validates a forecast horizon.
pub fn validate_horizon(years: u32) -> CliResult<u32> {
    if !(1..=intrinsic_config::MAX_HORIZON_YEARS).contains(&years) {
        return Err(CliError::InvalidHorizon(years));
    }
    Ok(years)
}

/// Validates a percentage within bounds.
pub fn validate_percent(name: &'static str, value: f64, min: f64, max: f64) -> CliResult<f64> {
    if !value.is_finite() || value < min || value > max {
        return Err(CliError::InvalidPercent {
            name,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

/// Validates a strictly positive value.
pub fn validate_positive(name: &'static str, value: f64) -> CliResult<f64> {
    if !(value.is_finite() && value > 0.0) {
        return Err(CliError::NotPositive { name, value });
    }
    Ok(value)
}
