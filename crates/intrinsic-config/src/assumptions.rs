//! User-adjustable valuation assumptions.
//!
//! Rates are stored in percentage points, the unit a user types. They are
//! converted to [`Rate`] exactly once, in the `*_assumptions` accessors that
//! feed the engine.

use serde::{Deserialize, Serialize};

use intrinsic_core::types::{BetaPolicy, DiscountConvention, TerminalMethod};
use intrinsic_core::Rate;
use intrinsic_valuation::capital::CapitalAssumptions;
use intrinsic_valuation::dcf::DcfAssumptions;
use intrinsic_valuation::growth::GrowthForecaster;
use intrinsic_valuation::sustainable::SustainableGrowthEstimator;

use crate::error::{Validate, ValidationError};

/// Longest supported forecast horizon in years.
pub const MAX_HORIZON_YEARS: u32 = 10;

/// Most annual periods averaged into historical ratios.
pub const MAX_HISTORY_WINDOW: usize = 5;

// =============================================================================
// VALUATION ASSUMPTIONS
// =============================================================================

/// Every scalar a user can adjust before a valuation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationAssumptions {
    /// Preset name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Description of this preset.
    #[serde(default)]
    pub description: Option<String>,

    /// Risk-free rate (%).
    #[serde(default = "default_risk_free_rate_pct")]
    pub risk_free_rate_pct: f64,

    /// Equity risk premium (%).
    #[serde(default = "default_equity_risk_premium_pct")]
    pub equity_risk_premium_pct: f64,

    /// Marginal tax rate (%).
    #[serde(default = "default_marginal_tax_rate_pct")]
    pub marginal_tax_rate_pct: f64,

    /// Forecast horizon in years (1 to 10).
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,

    /// Exit EV/EBITDA multiple override.
    #[serde(default)]
    pub exit_multiple: Option<f64>,

    /// Manual WACC (%), replacing the computed one in the DCF.
    #[serde(default)]
    pub wacc_override_pct: Option<f64>,

    /// Manual growth rate (%), replacing the forecast in the DCF.
    #[serde(default)]
    pub growth_override_pct: Option<f64>,

    /// Which beta enters CAPM.
    #[serde(default)]
    pub beta_policy: BetaPolicy,

    /// Terminal value method.
    #[serde(default)]
    pub terminal_method: TerminalMethod,

    /// Origin of the discount periods.
    #[serde(default)]
    pub discount_convention: DiscountConvention,

    /// Growth used when the revenue history is too short (%).
    #[serde(default = "default_growth_pct")]
    pub default_growth_pct: f64,

    /// Exit multiple used when the trailing EV/EBITDA is undefined.
    #[serde(default = "default_fallback_exit_multiple")]
    pub fallback_exit_multiple: f64,

    /// Historical years used for ratios and sustainable growth.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Whether this preset is read-only.
    #[serde(default, skip_serializing)]
    pub read_only: bool,
}

fn default_name() -> String {
    "CUSTOM".to_string()
}
fn default_risk_free_rate_pct() -> f64 {
    4.25
}
fn default_equity_risk_premium_pct() -> f64 {
    5.5
}
fn default_marginal_tax_rate_pct() -> f64 {
    21.0
}
fn default_horizon_years() -> u32 {
    5
}
fn default_growth_pct() -> f64 {
    5.0
}
fn default_fallback_exit_multiple() -> f64 {
    10.0
}
fn default_history_window() -> usize {
    5
}

impl Default for ValuationAssumptions {
    fn default() -> Self {
        Self::new(default_name())
    }
}

impl ValuationAssumptions {
    /// Creates assumptions with every field at its default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            risk_free_rate_pct: default_risk_free_rate_pct(),
            equity_risk_premium_pct: default_equity_risk_premium_pct(),
            marginal_tax_rate_pct: default_marginal_tax_rate_pct(),
            horizon_years: default_horizon_years(),
            exit_multiple: None,
            wacc_override_pct: None,
            growth_override_pct: None,
            beta_policy: BetaPolicy::default(),
            terminal_method: TerminalMethod::default(),
            discount_convention: DiscountConvention::default(),
            default_growth_pct: default_growth_pct(),
            fallback_exit_multiple: default_fallback_exit_multiple(),
            history_window: default_history_window(),
            read_only: false,
        }
    }

    /// The built-in `DEFAULT` preset.
    pub fn standard() -> Self {
        Self {
            description: Some("Market-consensus defaults".to_string()),
            read_only: true,
            ..Self::new("DEFAULT")
        }
    }

    /// The built-in `CONSERVATIVE` preset: higher discount rates, lower growth and exit.
    pub fn conservative() -> Self {
        Self {
            description: Some("Higher discount rates, lower growth and exit multiple".to_string()),
            risk_free_rate_pct: 4.75,
            equity_risk_premium_pct: 6.5,
            default_growth_pct: 3.0,
            fallback_exit_multiple: 8.0,
            read_only: true,
            ..Self::new("CONSERVATIVE")
        }
    }

    /// The built-in `AGGRESSIVE` preset: lower discount rates, higher growth and exit.
    pub fn aggressive() -> Self {
        Self {
            description: Some("Lower discount rates, higher growth and exit multiple".to_string()),
            risk_free_rate_pct: 3.75,
            equity_risk_premium_pct: 4.5,
            horizon_years: 7,
            default_growth_pct: 8.0,
            fallback_exit_multiple: 12.0,
            read_only: true,
            ..Self::new("AGGRESSIVE")
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the forecast horizon.
    #[must_use]
    pub fn with_horizon(mut self, years: u32) -> Self {
        self.horizon_years = years;
        self
    }

    /// Sets the exit multiple override.
    #[must_use]
    pub fn with_exit_multiple(mut self, multiple: f64) -> Self {
        self.exit_multiple = Some(multiple);
        self
    }

    /// Sets the manual WACC (%).
    #[must_use]
    pub fn with_wacc_override(mut self, pct: f64) -> Self {
        self.wacc_override_pct = Some(pct);
        self
    }

    /// Sets the manual growth rate (%).
    #[must_use]
    pub fn with_growth_override(mut self, pct: f64) -> Self {
        self.growth_override_pct = Some(pct);
        self
    }

    /// Sets the beta policy.
    #[must_use]
    pub fn with_beta_policy(mut self, policy: BetaPolicy) -> Self {
        self.beta_policy = policy;
        self
    }

    /// Sets the terminal value method.
    #[must_use]
    pub fn with_terminal_method(mut self, method: TerminalMethod) -> Self {
        self.terminal_method = method;
        self
    }

    /// Marginal tax rate as a [`Rate`].
    pub fn tax_rate(&self) -> Rate {
        Rate::from_percent(self.marginal_tax_rate_pct)
    }

    /// Manual WACC as a [`Rate`].
    pub fn wacc_override(&self) -> Option<Rate> {
        self.wacc_override_pct.map(Rate::from_percent)
    }

    /// Manual growth rate as a [`Rate`].
    pub fn growth_override(&self) -> Option<Rate> {
        self.growth_override_pct.map(Rate::from_percent)
    }

    /// Inputs to the capital cost calculator.
    pub fn capital_assumptions(&self) -> CapitalAssumptions {
        CapitalAssumptions {
            risk_free_rate: Rate::from_percent(self.risk_free_rate_pct),
            equity_risk_premium: Rate::from_percent(self.equity_risk_premium_pct),
            tax_rate: self.tax_rate(),
            beta_policy: self.beta_policy,
        }
    }

    /// Inputs to the DCF projector.
    pub fn dcf_assumptions(&self) -> DcfAssumptions {
        DcfAssumptions {
            horizon_years: self.horizon_years,
            history_window: self.history_window,
            tax_rate: self.tax_rate(),
            terminal_method: self.terminal_method,
            exit_multiple: self.exit_multiple,
            fallback_exit_multiple: self.fallback_exit_multiple,
            discount_convention: self.discount_convention,
        }
    }

    /// Growth forecaster over this horizon with this fallback.
    pub fn growth_forecaster(&self) -> GrowthForecaster {
        GrowthForecaster::new(self.horizon_years)
            .with_fallback(Rate::from_percent(self.default_growth_pct))
    }

    /// Sustainable growth estimator over this history window.
    pub fn sustainable_growth_estimator(&self) -> SustainableGrowthEstimator {
        SustainableGrowthEstimator::new(self.history_window, self.tax_rate())
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

fn check_pct(
    errors: &mut Vec<ValidationError>,
    field: &str,
    value: f64,
    min: f64,
    max: f64,
) {
    if !value.is_finite() || value < min || value > max {
        errors.push(ValidationError::with_rule(
            field,
            format!("{} must be between {} and {}", value, min, max),
            "range",
        ));
    }
}

fn check_multiple(errors: &mut Vec<ValidationError>, field: &str, value: f64) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(ValidationError::with_rule(
            field,
            format!("Multiple {} must be positive", value),
            "positive_multiple",
        ));
    }
}

impl Validate for ValuationAssumptions {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push(ValidationError::new("name", "Name cannot be empty"));
        }

        check_pct(&mut errors, "risk_free_rate_pct", self.risk_free_rate_pct, -5.0, 25.0);
        check_pct(
            &mut errors,
            "equity_risk_premium_pct",
            self.equity_risk_premium_pct,
            0.0,
            25.0,
        );
        check_pct(
            &mut errors,
            "marginal_tax_rate_pct",
            self.marginal_tax_rate_pct,
            0.0,
            100.0,
        );
        check_pct(&mut errors, "default_growth_pct", self.default_growth_pct, -20.0, 50.0);

        if self.horizon_years == 0 || self.horizon_years > MAX_HORIZON_YEARS {
            errors.push(ValidationError::with_rule(
                "horizon_years",
                format!(
                    "Horizon {} must be between 1 and {} years",
                    self.horizon_years, MAX_HORIZON_YEARS
                ),
                "valid_horizon",
            ));
        }

        if self.history_window == 0 || self.history_window > MAX_HISTORY_WINDOW {
            errors.push(ValidationError::with_rule(
                "history_window",
                format!(
                    "History window {} must be between 1 and {} years",
                    self.history_window, MAX_HISTORY_WINDOW
                ),
                "valid_window",
            ));
        }

        if let Some(multiple) = self.exit_multiple {
            check_multiple(&mut errors, "exit_multiple", multiple);
        }
        check_multiple(&mut errors, "fallback_exit_multiple", self.fallback_exit_multiple);

        if let Some(wacc) = self.wacc_override_pct {
            if !wacc.is_finite() || wacc <= 0.0 || wacc >= 100.0 {
                errors.push(ValidationError::with_rule(
                    "wacc_override_pct",
                    format!("WACC {} must be between 0 and 100 exclusive", wacc),
                    "valid_wacc",
                ));
            }
        }
        if let Some(growth) = self.growth_override_pct {
            check_pct(&mut errors, "growth_override_pct", growth, -100.0, 100.0);
        }

        if let BetaPolicy::Manual { beta } = self.beta_policy {
            if !beta.is_finite() {
                errors.push(ValidationError::new("beta_policy", "Manual beta must be finite"));
            }
        }

        if let TerminalMethod::PerpetuityGrowth { growth_pct } = self.terminal_method {
            check_pct(&mut errors, "terminal_method.growth_pct", growth_pct, -10.0, 10.0);
            if let Some(wacc) = self.wacc_override_pct {
                if growth_pct >= wacc {
                    errors.push(ValidationError::with_rule(
                        "terminal_method.growth_pct",
                        format!(
                            "Perpetuity growth {}% must be below the WACC override {}%",
                            growth_pct, wacc
                        ),
                        "growth_below_wacc",
                    ));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let a = ValuationAssumptions::default();
        assert_eq!(a.risk_free_rate_pct, 4.25);
        assert_eq!(a.equity_risk_premium_pct, 5.5);
        assert_eq!(a.marginal_tax_rate_pct, 21.0);
        assert_eq!(a.horizon_years, 5);
        assert_eq!(a.default_growth_pct, 5.0);
        assert_eq!(a.fallback_exit_multiple, 10.0);
        assert_eq!(a.history_window, 5);
        assert!(a.exit_multiple.is_none());
        assert!(a.is_valid());
    }

    #[test]
    fn test_history_window_bounds() {
        let window = |n: usize| ValuationAssumptions {
            history_window: n,
            ..ValuationAssumptions::default()
        };
        assert!(window(1).is_valid());
        assert!(window(MAX_HISTORY_WINDOW).is_valid());

        for n in [0, 6, 20] {
            let errors = window(n).validate();
            assert_eq!(errors.len(), 1, "window {}", n);
            assert_eq!(errors[0].field, "history_window");
            assert_eq!(errors[0].rule.as_deref(), Some("valid_window"));
        }
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let a: ValuationAssumptions =
            serde_json::from_str(r#"{"horizon_years": 3, "beta_policy": {"kind": "unlevered"}}"#)
                .unwrap();
        assert_eq!(a.horizon_years, 3);
        assert_eq!(a.beta_policy, BetaPolicy::Unlevered);
        assert_eq!(a.risk_free_rate_pct, 4.25);
        assert_eq!(a.name, "CUSTOM");
        assert!(!a.read_only);
    }

    #[test]
    fn test_read_only_not_serialized() {
        let json = serde_json::to_string(&ValuationAssumptions::standard()).unwrap();
        assert!(!json.contains("read_only"));
    }

    #[test]
    fn test_conversions_use_decimal_rates() {
        let a = ValuationAssumptions::default()
            .with_wacc_override(9.0)
            .with_growth_override(-2.5);
        let capital = a.capital_assumptions();
        assert_relative_eq!(capital.risk_free_rate.as_decimal(), 0.0425, epsilon = 1e-12);
        assert_relative_eq!(capital.equity_risk_premium.as_decimal(), 0.055, epsilon = 1e-12);
        assert_relative_eq!(capital.tax_rate.as_decimal(), 0.21, epsilon = 1e-12);
        assert_relative_eq!(a.wacc_override().unwrap().as_decimal(), 0.09, epsilon = 1e-12);
        assert_relative_eq!(a.growth_override().unwrap().as_decimal(), -0.025, epsilon = 1e-12);

        let dcf = a.dcf_assumptions();
        assert_eq!(dcf.horizon_years, 5);
        assert_eq!(dcf.fallback_exit_multiple, 10.0);
        assert_eq!(a.growth_forecaster().horizon(), 5);
    }

    #[test]
    fn test_horizon_bounds() {
        assert!(!ValuationAssumptions::default().with_horizon(0).is_valid());
        assert!(ValuationAssumptions::default().with_horizon(1).is_valid());
        assert!(ValuationAssumptions::default().with_horizon(10).is_valid());
        assert!(!ValuationAssumptions::default().with_horizon(11).is_valid());
    }

    #[test]
    fn test_invalid_fields_collected() {
        let mut a = ValuationAssumptions::default().with_exit_multiple(-3.0);
        a.risk_free_rate_pct = f64::NAN;
        a.name.clear();
        let fields: Vec<String> = a.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "risk_free_rate_pct", "exit_multiple"]);
    }

    #[test]
    fn test_perpetuity_growth_below_wacc_override() {
        let a = ValuationAssumptions::default()
            .with_terminal_method(TerminalMethod::PerpetuityGrowth { growth_pct: 3.0 })
            .with_wacc_override(2.5);
        let errors = a.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule.as_deref(), Some("growth_below_wacc"));
    }

    #[test]
    fn test_presets_valid() {
        for preset in [
            ValuationAssumptions::standard(),
            ValuationAssumptions::conservative(),
            ValuationAssumptions::aggressive(),
        ] {
            assert!(preset.is_valid(), "{} invalid", preset.name);
            assert!(preset.read_only);
        }
    }
}
