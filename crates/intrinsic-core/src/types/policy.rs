//! Selectable valuation policies shared by configuration and the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which beta feeds the CAPM cost of equity. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BetaPolicy {
    /// Levered beta as reported by the data provider.
    #[default]
    Levered,
    /// Reported beta unlevered with the Hamada relation.
    Unlevered,
    /// User-supplied beta.
    Manual {
        /// The beta to use.
        beta: f64,
    },
}

impl fmt::Display for BetaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Levered => write!(f, "levered"),
            Self::Unlevered => write!(f, "unlevered"),
            Self::Manual { beta } => write!(f, "manual ({beta:.2})"),
        }
    }
}

/// How the value beyond the explicit forecast horizon is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminalMethod {
    /// Terminal EBITDA times an EV/EBITDA exit multiple.
    #[default]
    ExitMultiple,
    /// Gordon growth on the final projected free cash flow.
    PerpetuityGrowth {
        /// Long-run growth rate in percentage points.
        growth_pct: f64,
    },
}

impl fmt::Display for TerminalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExitMultiple => write!(f, "exit multiple"),
            Self::PerpetuityGrowth { growth_pct } => {
                write!(f, "perpetuity growth ({growth_pct:.2}%)")
            }
        }
    }
}

/// Origin of the discounting clock for projected years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountConvention {
    /// `t` counts years since the first historical period in the projection table.
    #[default]
    FromFirstHistorical,
    /// `t` counts years since the last historical period (first projected year is `t = 1`).
    FromLastHistorical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beta_policy_serde() {
        let policy: BetaPolicy = serde_json::from_str(r#"{"kind":"manual","beta":1.3}"#).unwrap();
        assert_eq!(policy, BetaPolicy::Manual { beta: 1.3 });

        let policy: BetaPolicy = serde_json::from_str(r#"{"kind":"unlevered"}"#).unwrap();
        assert_eq!(policy, BetaPolicy::Unlevered);
    }

    #[test]
    fn test_terminal_method_serde() {
        let method: TerminalMethod =
            serde_json::from_str(r#"{"kind":"perpetuity_growth","growth_pct":2.5}"#).unwrap();
        assert_eq!(method, TerminalMethod::PerpetuityGrowth { growth_pct: 2.5 });
    }

    #[test]
    fn test_defaults() {
        assert_eq!(BetaPolicy::default(), BetaPolicy::Levered);
        assert_eq!(TerminalMethod::default(), TerminalMethod::ExitMultiple);
        assert_eq!(
            DiscountConvention::default(),
            DiscountConvention::FromFirstHistorical
        );
    }
}
