//! Weighted average cost of capital.
//!
//! Components:
//!
//! - **Debt**: synthetic rating from interest coverage, `rf + spread`, taxed
//! - **Equity**: CAPM, `rf + β × ERP`, with a selectable [`BetaPolicy`]
//! - **Preferred**: dividend yield on book value, or an estimate from the
//!   cost of debt when dividends are unknown
//!
//! Weights come from market capitalization, total debt, and preferred book
//! value. All rates are [`Rate`]s; [`CostOfCapitalBreakdown::wacc_pct`] gives
//! the percentage-point figure for display.

mod rating;
mod structure;

pub use rating::{interest_coverage, RatingBand, SyntheticRatingTable, ICR_SENTINEL};
pub use structure::CapitalStructure;

use intrinsic_core::types::{BetaPolicy, CreditRating};
use intrinsic_core::{CompanyData, Rate};
use serde::Serialize;

use crate::error::{ValuationError, ValuationResult};

/// Premium of preferred over pre-tax debt when preferred dividends are unknown.
pub const PREFERRED_PREMIUM: Rate = Rate::from_decimal(0.015);

/// Floor of the estimated cost of preferred equity.
pub const PREFERRED_FLOOR: Rate = Rate::from_decimal(0.04);

/// Cap of the estimated cost of preferred equity.
pub const PREFERRED_CAP: Rate = Rate::from_decimal(0.12);

/// Market inputs to the cost of capital.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapitalAssumptions {
    /// Risk-free rate.
    pub risk_free_rate: Rate,
    /// Equity risk premium.
    pub equity_risk_premium: Rate,
    /// Marginal tax rate.
    pub tax_rate: Rate,
    /// Which beta enters CAPM.
    pub beta_policy: BetaPolicy,
}

impl Default for CapitalAssumptions {
    fn default() -> Self {
        Self {
            risk_free_rate: Rate::from_percent(4.25),
            equity_risk_premium: Rate::from_percent(5.5),
            tax_rate: Rate::from_percent(21.0),
            beta_policy: BetaPolicy::Levered,
        }
    }
}

/// Where the cost of preferred equity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredCostSource {
    /// No preferred stock outstanding.
    NoPreferred,
    /// Preferred dividends over preferred book value.
    Dividends,
    /// Pre-tax cost of debt plus a premium, clamped.
    Estimated,
}

/// Every component of the cost of capital.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostOfCapitalBreakdown {
    /// EBIT over absolute interest expense.
    pub interest_coverage: f64,
    /// Synthetic rating for the coverage.
    pub rating: CreditRating,
    /// Default spread for the rating.
    pub default_spread: Rate,
    /// Risk-free rate plus default spread.
    pub pre_tax_cost_of_debt: Rate,
    /// Pre-tax cost of debt net of tax.
    pub after_tax_cost_of_debt: Rate,
    /// Beta that entered CAPM.
    pub beta: f64,
    /// Policy that selected `beta`.
    pub beta_policy: BetaPolicy,
    /// CAPM cost of equity.
    pub cost_of_equity: Rate,
    /// Cost of preferred equity.
    pub cost_of_preferred: Rate,
    /// Source of `cost_of_preferred`.
    pub preferred_source: PreferredCostSource,
    /// Debt, equity, and preferred weights.
    pub structure: CapitalStructure,
    /// Total debt from the latest balance sheet.
    pub total_debt: f64,
    /// Market capitalization.
    pub market_cap: f64,
    /// Preferred stock book value.
    pub preferred_stock: f64,
    /// Weighted blend of the three costs.
    pub wacc: Rate,
}

impl CostOfCapitalBreakdown {
    /// WACC in percentage points (8.5 for 8.5%).
    pub fn wacc_pct(&self) -> f64 {
        self.wacc.as_percent()
    }
}

/// `w_d·k_d(1−t) + w_e·k_e + w_p·k_p`.
pub fn weighted_cost(
    structure: &CapitalStructure,
    after_tax_cost_of_debt: Rate,
    cost_of_equity: Rate,
    cost_of_preferred: Rate,
) -> Rate {
    after_tax_cost_of_debt * structure.debt_weight
        + cost_of_equity * structure.equity_weight
        + cost_of_preferred * structure.preferred_weight
}

/// CAPM cost of equity `rf + β × ERP`.
pub fn capm(risk_free_rate: Rate, beta: f64, equity_risk_premium: Rate) -> Rate {
    risk_free_rate + equity_risk_premium * beta
}

/// Hamada unlevered beta `β_L / (1 + (1 − t)·D/E)`.
///
/// Returns `None` when equity is not positive.
pub fn unlevered_beta(levered_beta: f64, tax_rate: Rate, debt: f64, equity: f64) -> Option<f64> {
    if equity <= 0.0 {
        return None;
    }
    let denominator = 1.0 + (1.0 - tax_rate.as_decimal()) * (debt.max(0.0) / equity);
    (denominator > 0.0).then(|| levered_beta / denominator)
}

/// Computes [`CostOfCapitalBreakdown`] from a company snapshot.
#[derive(Debug, Clone, Default)]
pub struct CapitalCostCalculator {
    assumptions: CapitalAssumptions,
    table: SyntheticRatingTable,
}

impl CapitalCostCalculator {
    /// Creates a calculator with the standard rating table.
    #[must_use]
    pub fn new(assumptions: CapitalAssumptions) -> Self {
        Self {
            assumptions,
            table: SyntheticRatingTable::standard(),
        }
    }

    /// Uses a custom rating table.
    #[must_use]
    pub fn with_rating_table(mut self, table: SyntheticRatingTable) -> Self {
        self.table = table;
        self
    }

    /// Assumptions in use.
    pub fn assumptions(&self) -> &CapitalAssumptions {
        &self.assumptions
    }

    /// Computes every component from the latest statements.
    ///
    /// # Errors
    ///
    /// Returns [`ValuationError::InsufficientData`] when there is no income
    /// statement or no balance sheet.
    pub fn calculate(&self, company: &CompanyData) -> ValuationResult<CostOfCapitalBreakdown> {
        let statements = &company.statements;
        let income = statements.income_statements.latest().ok_or_else(|| {
            ValuationError::insufficient_data("cost of capital income statements", 1, 0)
        })?;
        let balance = statements.balance_sheets.latest().ok_or_else(|| {
            ValuationError::insufficient_data("cost of capital balance sheets", 1, 0)
        })?;

        let a = &self.assumptions;

        let ebit = income.resolved_ebit().unwrap_or(0.0);
        let icr = interest_coverage(ebit, income.interest_expense);
        let band = self.table.lookup(icr);
        let pre_tax_cost_of_debt = a.risk_free_rate + band.spread;
        let after_tax_cost_of_debt = pre_tax_cost_of_debt * (1.0 - a.tax_rate.as_decimal());

        log::debug!(
            "capital: icr {:.2} -> {} (spread {})",
            icr,
            band.rating,
            band.spread
        );

        let total_debt = balance.resolved_total_debt().max(0.0);
        let market_cap = company.quote.market_cap.max(0.0);
        let preferred_stock = balance.preferred_stock.unwrap_or(0.0).max(0.0);

        let beta = self.select_beta(company, total_debt, market_cap);
        let cost_of_equity = capm(a.risk_free_rate, beta, a.equity_risk_premium);

        let preferred_dividends = statements
            .cash_flow_statements
            .find_matching(balance.date)
            .and_then(|cf| cf.preferred_dividends_paid)
            .map(f64::abs)
            .filter(|d| d.is_finite() && *d > 0.0);
        let (cost_of_preferred, preferred_source) =
            cost_of_preferred(preferred_stock, preferred_dividends, pre_tax_cost_of_debt);

        let structure = CapitalStructure::from_values(total_debt, market_cap, preferred_stock);
        let wacc = weighted_cost(
            &structure,
            after_tax_cost_of_debt,
            cost_of_equity,
            cost_of_preferred,
        );

        log::debug!(
            "capital: ke {} kd {} kp {} weights {:.3}/{:.3}/{:.3} -> wacc {}",
            cost_of_equity,
            after_tax_cost_of_debt,
            cost_of_preferred,
            structure.debt_weight,
            structure.equity_weight,
            structure.preferred_weight,
            wacc
        );

        Ok(CostOfCapitalBreakdown {
            interest_coverage: icr,
            rating: band.rating,
            default_spread: band.spread,
            pre_tax_cost_of_debt,
            after_tax_cost_of_debt,
            beta,
            beta_policy: a.beta_policy,
            cost_of_equity,
            cost_of_preferred,
            preferred_source,
            structure,
            total_debt,
            market_cap,
            preferred_stock,
            wacc,
        })
    }

    fn select_beta(&self, company: &CompanyData, total_debt: f64, market_cap: f64) -> f64 {
        let levered = company.levered_beta();
        match self.assumptions.beta_policy {
            BetaPolicy::Levered => levered,
            BetaPolicy::Manual { beta } => beta,
            BetaPolicy::Unlevered => {
                unlevered_beta(levered, self.assumptions.tax_rate, total_debt, market_cap)
                    .unwrap_or_else(|| {
                        log::warn!(
                            "capital: market cap {} cannot unlever beta, using levered {:.2}",
                            market_cap,
                            levered
                        );
                        levered
                    })
            }
        }
    }
}

/// Cost of preferred equity and where it came from.
pub fn cost_of_preferred(
    preferred_stock: f64,
    preferred_dividends: Option<f64>,
    pre_tax_cost_of_debt: Rate,
) -> (Rate, PreferredCostSource) {
    if !(preferred_stock > 0.0) {
        return (Rate::ZERO, PreferredCostSource::NoPreferred);
    }
    if let Some(dividends) = preferred_dividends {
        return (
            Rate::from_decimal(dividends / preferred_stock),
            PreferredCostSource::Dividends,
        );
    }
    (
        (pre_tax_cost_of_debt + PREFERRED_PREMIUM).clamp(PREFERRED_FLOOR, PREFERRED_CAP),
        PreferredCostSource::Estimated,
    )
}
