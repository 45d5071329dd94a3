//! Terminal value.

use intrinsic_core::types::TerminalMethod;
use intrinsic_core::Rate;
use intrinsic_math::stats::safe_ratio;
use serde::Serialize;

use crate::error::{ValuationError, ValuationResult};

/// Where the exit multiple came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultipleSource {
    /// Supplied by the user.
    Override,
    /// Current EV over the latest annual EBITDA.
    TrailingEvEbitda,
    /// Configured default when the trailing multiple is undefined.
    Fallback,
}

/// Terminal value and its present value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TerminalValue {
    /// Method used.
    pub method: TerminalMethod,
    /// Exit multiple, for [`TerminalMethod::ExitMultiple`].
    pub exit_multiple: Option<f64>,
    /// Source of `exit_multiple`.
    pub multiple_source: Option<MultipleSource>,
    /// EBITDA of the final projected year.
    pub terminal_ebitda: f64,
    /// Unlevered FCF of the final projected year.
    pub terminal_fcf: f64,
    /// Undiscounted terminal value.
    pub value: f64,
    /// Discount factor of the final projected year.
    pub discount_factor: f64,
    /// `value × discount_factor`.
    pub present_value: f64,
}

/// Enterprise value over trailing EBITDA.
///
/// Enterprise value is `market cap + debt − cash`. Returns `None` when either
/// side is not positive.
///
/// "Trailing" means the latest annual statement: `ebitda` is the most recent
/// fiscal year's figure, not a sum of the last four quarters.
pub fn trailing_ev_to_ebitda(
    market_cap: f64,
    total_debt: f64,
    cash: f64,
    ebitda: f64,
) -> Option<f64> {
    let enterprise_value = market_cap + total_debt - cash;
    if enterprise_value <= 0.0 {
        return None;
    }
    safe_ratio(enterprise_value, ebitda)
}

/// `EBITDA_N × multiple`.
pub fn exit_multiple_value(terminal_ebitda: f64, multiple: f64) -> f64 {
    terminal_ebitda * multiple
}

/// Gordon growth `FCF_N × (1 + g) / (WACC − g)`.
///
/// # Errors
///
/// Returns [`ValuationError::InvalidTerminalGrowth`] when `WACC ≤ g`.
pub fn perpetuity_value(terminal_fcf: f64, wacc: Rate, growth: Rate) -> ValuationResult<f64> {
    let spread = wacc.as_decimal() - growth.as_decimal();
    if spread <= 0.0 {
        return Err(ValuationError::InvalidTerminalGrowth { wacc, growth });
    }
    Ok(terminal_fcf * (1.0 + growth.as_decimal()) / spread)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trailing_multiple() {
        // EV = 1000 + 200 - 100 = 1100
        assert_relative_eq!(trailing_ev_to_ebitda(1000.0, 200.0, 100.0, 110.0).unwrap(), 10.0);
        assert!(trailing_ev_to_ebitda(1000.0, 0.0, 0.0, 0.0).is_none());
        assert!(trailing_ev_to_ebitda(1000.0, 0.0, 0.0, -50.0).is_none());
        assert!(trailing_ev_to_ebitda(100.0, 0.0, 500.0, 50.0).is_none());
    }

    #[test]
    fn test_perpetuity() {
        let tv = perpetuity_value(100.0, Rate::from_percent(8.0), Rate::from_percent(3.0)).unwrap();
        assert_relative_eq!(tv, 100.0 * 1.03 / 0.05, epsilon = 1e-9);

        let err = perpetuity_value(100.0, Rate::from_percent(3.0), Rate::from_percent(3.0));
        assert!(matches!(err, Err(ValuationError::InvalidTerminalGrowth { .. })));
    }

    #[test]
    fn test_exit_multiple_value() {
        assert_relative_eq!(exit_multiple_value(250.0, 12.0), 3000.0);
    }
}
