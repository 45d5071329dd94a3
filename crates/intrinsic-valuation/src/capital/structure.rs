//! Capital structure weights.

use serde::Serialize;

/// Debt, equity, and preferred weights.
///
/// Weights are non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapitalStructure {
    /// Debt share of total capital.
    pub debt_weight: f64,
    /// Equity share of total capital.
    pub equity_weight: f64,
    /// Preferred share of total capital.
    pub preferred_weight: f64,
}

impl CapitalStructure {
    /// 100% equity.
    #[must_use]
    pub const fn all_equity() -> Self {
        Self {
            debt_weight: 0.0,
            equity_weight: 1.0,
            preferred_weight: 0.0,
        }
    }

    /// Weights from total debt, market capitalization, and preferred book value.
    ///
    /// Negative or non-finite inputs count as zero. Zero total capital gives
    /// [`CapitalStructure::all_equity`].
    #[must_use]
    pub fn from_values(debt: f64, equity: f64, preferred: f64) -> Self {
        let clean = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        let (debt, equity, preferred) = (clean(debt), clean(equity), clean(preferred));
        let total = debt + equity + preferred;

        if total <= 0.0 || !total.is_finite() {
            return Self::all_equity();
        }

        Self {
            debt_weight: debt / total,
            equity_weight: equity / total,
            preferred_weight: preferred / total,
        }
    }

    /// Sum of the weights.
    pub fn total(&self) -> f64 {
        self.debt_weight + self.equity_weight + self.preferred_weight
    }
}

impl Default for CapitalStructure {
    fn default() -> Self {
        Self::all_equity()
    }
}
