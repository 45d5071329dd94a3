//! Sustainable growth rate estimates.
//!
//! Alternative growth estimates used to cross-check the revenue forecast:
//!
//! | Method | Formula |
//! |--------|---------|
//! | ROE, averaged | `avg(retention) × avg(ROE)` |
//! | ROE, per period | `avg(retention × ROE)` |
//! | ROIC, averaged | `avg(retention) × avg(ROIC)` |
//! | ROIC, per period | `avg(retention × ROIC)` |
//! | ROE, full retention | `avg(ROE)` |
//! | ROIC, full retention | `avg(ROIC)` |
//! | DuPont | `avg(margin) × avg(turnover) × avg(leverage) × avg(retention)` |
//! | Revenue CAGR | `(last / first)^(1/years) − 1` |
//!
//! Every method is computed once. [`SustainableGrowth::average`] only selects
//! which of the stored values enter the mean.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use intrinsic_core::types::{BalanceSheet, CashFlowStatement, IncomeStatement, Period};
use intrinsic_core::{FinancialStatements, Rate};
use intrinsic_math::stats::{cagr, mean_defined, safe_ratio};
use serde::Serialize;

use crate::error::{ValuationError, ValuationResult};

/// Sustainable growth method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SgrMethod {
    /// Averaged retention times averaged ROE.
    RoeAveraged,
    /// Average of per-period retention × ROE.
    RoePerPeriod,
    /// Averaged retention times averaged ROIC.
    RoicAveraged,
    /// Average of per-period retention × ROIC.
    RoicPerPeriod,
    /// Averaged ROE, no payout.
    RoeFullRetention,
    /// Averaged ROIC, no payout.
    RoicFullRetention,
    /// Net margin × asset turnover × leverage × retention.
    DuPont,
    /// Compound annual revenue growth.
    RevenueCagr,
}

impl SgrMethod {
    /// Every method, in display order.
    pub const ALL: [SgrMethod; 8] = [
        SgrMethod::RoeAveraged,
        SgrMethod::RoePerPeriod,
        SgrMethod::RoicAveraged,
        SgrMethod::RoicPerPeriod,
        SgrMethod::RoeFullRetention,
        SgrMethod::RoicFullRetention,
        SgrMethod::DuPont,
        SgrMethod::RevenueCagr,
    ];

    /// Short label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RoeAveraged => "ROE x retention (averaged)",
            Self::RoePerPeriod => "ROE x retention (per period)",
            Self::RoicAveraged => "ROIC x retention (averaged)",
            Self::RoicPerPeriod => "ROIC x retention (per period)",
            Self::RoeFullRetention => "ROE, full retention",
            Self::RoicFullRetention => "ROIC, full retention",
            Self::DuPont => "DuPont",
            Self::RevenueCagr => "Revenue CAGR",
        }
    }
}

impl fmt::Display for SgrMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Methods included in the headline average.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SgrSelection {
    included: BTreeSet<SgrMethod>,
}

impl Default for SgrSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl SgrSelection {
    /// Every method.
    #[must_use]
    pub fn all() -> Self {
        Self {
            included: SgrMethod::ALL.into_iter().collect(),
        }
    }

    /// No methods.
    #[must_use]
    pub fn none() -> Self {
        Self {
            included: BTreeSet::new(),
        }
    }

    /// Includes `method`.
    #[must_use]
    pub fn with(mut self, method: SgrMethod) -> Self {
        self.included.insert(method);
        self
    }

    /// Excludes `method`.
    #[must_use]
    pub fn without(mut self, method: SgrMethod) -> Self {
        self.included.remove(&method);
        self
    }

    /// Flips inclusion of `method`, returning whether it is now included.
    pub fn toggle(&mut self, method: SgrMethod) -> bool {
        if self.included.remove(&method) {
            false
        } else {
            self.included.insert(method);
            true
        }
    }

    /// Returns true if `method` is included.
    pub fn contains(&self, method: SgrMethod) -> bool {
        self.included.contains(&method)
    }
}

/// Per-period inputs derived from one year of statements.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PeriodMetrics {
    /// Fiscal year.
    pub fiscal_year: i32,
    /// `1 − dividends / net income`.
    pub retention: Option<f64>,
    /// Net income over book equity.
    pub roe: Option<f64>,
    /// NOPAT over invested capital (equity + debt − cash).
    pub roic: Option<f64>,
    /// Net income over revenue.
    pub net_margin: Option<f64>,
    /// Revenue over total assets.
    pub asset_turnover: Option<f64>,
    /// Total assets over book equity.
    pub leverage: Option<f64>,
}

/// Every method's estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SustainableGrowth {
    /// Estimate per method; `None` when the method's inputs are undefined.
    pub estimates: BTreeMap<SgrMethod, Option<Rate>>,
    /// Per-period inputs.
    pub periods: Vec<PeriodMetrics>,
}

impl SustainableGrowth {
    /// Estimate for one method.
    pub fn get(&self, method: SgrMethod) -> Option<Rate> {
        self.estimates.get(&method).copied().flatten()
    }

    /// Mean of the selected, defined estimates.
    pub fn average(&self, selection: &SgrSelection) -> Option<Rate> {
        mean_defined(
            self.estimates
                .iter()
                .filter(|(method, _)| selection.contains(**method))
                .map(|(_, rate)| rate.map(Rate::as_decimal)),
        )
        .map(Rate::from_decimal)
    }
}

/// Computes [`SustainableGrowth`] from statements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SustainableGrowthEstimator {
    history_window: usize,
    tax_rate: Rate,
}

impl Default for SustainableGrowthEstimator {
    fn default() -> Self {
        Self::new(5, Rate::from_percent(21.0))
    }
}

impl SustainableGrowthEstimator {
    /// Creates an estimator over the last `history_window` years, taxing EBIT
    /// at `tax_rate` when the effective rate is undefined.
    #[must_use]
    pub fn new(history_window: usize, tax_rate: Rate) -> Self {
        Self {
            history_window: history_window.max(1),
            tax_rate,
        }
    }

    /// Computes every method.
    ///
    /// # Errors
    ///
    /// Returns [`ValuationError::InsufficientData`] without at least one income
    /// statement and one balance sheet.
    pub fn estimate(&self, statements: &FinancialStatements) -> ValuationResult<SustainableGrowth> {
        let incomes = statements.income_statements.last_n(self.history_window);
        if incomes.is_empty() {
            return Err(ValuationError::insufficient_data(
                "sustainable growth income statements",
                1,
                0,
            ));
        }
        if statements.balance_sheets.is_empty() {
            return Err(ValuationError::insufficient_data(
                "sustainable growth balance sheets",
                1,
                0,
            ));
        }

        let periods: Vec<PeriodMetrics> = incomes
            .iter()
            .map(|income| {
                self.metrics(
                    income,
                    statements.balance_sheets.find_matching(income.date),
                    statements.cash_flow_statements.find_matching(income.date),
                )
            })
            .collect();

        let avg = |f: fn(&PeriodMetrics) -> Option<f64>| mean_defined(periods.iter().map(f));
        let retention = avg(|p| p.retention);
        let roe = avg(|p| p.roe);
        let roic = avg(|p| p.roic);
        let product = |a: Option<f64>, b: Option<f64>| a.zip(b).map(|(a, b)| a * b);

        let mut estimates = BTreeMap::new();
        estimates.insert(SgrMethod::RoeAveraged, product(retention, roe));
        estimates.insert(
            SgrMethod::RoePerPeriod,
            mean_defined(periods.iter().map(|p| product(p.retention, p.roe))),
        );
        estimates.insert(SgrMethod::RoicAveraged, product(retention, roic));
        estimates.insert(
            SgrMethod::RoicPerPeriod,
            mean_defined(periods.iter().map(|p| product(p.retention, p.roic))),
        );
        estimates.insert(SgrMethod::RoeFullRetention, roe);
        estimates.insert(SgrMethod::RoicFullRetention, roic);
        estimates.insert(
            SgrMethod::DuPont,
            product(
                product(avg(|p| p.net_margin), avg(|p| p.asset_turnover)),
                product(avg(|p| p.leverage), retention),
            ),
        );

        let first = incomes[0].revenue;
        let last = incomes[incomes.len() - 1].revenue;
        estimates.insert(
            SgrMethod::RevenueCagr,
            cagr(first, last, (incomes.len() - 1) as f64),
        );

        let estimates: BTreeMap<SgrMethod, Option<Rate>> = estimates
            .into_iter()
            .map(|(method, value)| {
                let rate = value.filter(|v| v.is_finite()).map(Rate::from_decimal);
                (method, rate)
            })
            .collect();

        log::debug!(
            "sustainable growth over {} periods: {:?}",
            periods.len(),
            estimates
        );

        Ok(SustainableGrowth { estimates, periods })
    }

    fn metrics(
        &self,
        income: &IncomeStatement,
        balance: Option<&BalanceSheet>,
        cash_flow: Option<&CashFlowStatement>,
    ) -> PeriodMetrics {
        let net_income = income.net_income;
        let dividends = cash_flow.map_or(0.0, CashFlowStatement::resolved_dividends);
        let retention = safe_ratio(dividends, net_income).map(|payout| 1.0 - payout);

        let tax_rate = safe_ratio(income.income_tax_expense, income.income_before_tax)
            .filter(|t| (0.0..=1.0).contains(t))
            .unwrap_or(self.tax_rate.as_decimal());
        let nopat = income.resolved_ebit().map(|ebit| ebit * (1.0 - tax_rate));

        let (roe, roic, asset_turnover, leverage) = match balance {
            Some(b) => {
                let equity = b.total_stockholders_equity;
                let invested = equity + b.resolved_total_debt() - b.cash_and_cash_equivalents;
                (
                    safe_ratio(net_income, equity),
                    nopat.and_then(|n| safe_ratio(n, invested)),
                    safe_ratio(income.revenue, b.total_assets),
                    safe_ratio(b.total_assets, equity),
                )
            }
            None => (None, None, None, None),
        };

        PeriodMetrics {
            fiscal_year: income.fiscal_year(),
            retention,
            roe,
            roic,
            net_margin: safe_ratio(net_income, income.revenue),
            asset_turnover,
            leverage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use intrinsic_core::types::StatementSeries;

    fn date(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 12, 31).unwrap()
    }

    /// Net income 100, equity 500, dividends 40, assets 1000, revenue 800 → 1000.
    fn statements() -> FinancialStatements {
        let incomes = [(2022, 800.0), (2023, 1000.0)]
            .into_iter()
            .map(|(y, rev)| {
                let mut s = IncomeStatement::new(date(y), rev);
                s.net_income = 100.0;
                s.ebit = Some(150.0);
                s.income_before_tax = 125.0;
                s.income_tax_expense = 25.0;
                s
            })
            .collect();
        let balances = [2022, 2023]
            .into_iter()
            .map(|y| {
                let mut b = BalanceSheet::new(date(y));
                b.total_assets = 1000.0;
                b.total_stockholders_equity = 500.0;
                b.total_debt = Some(200.0);
                b.cash_and_cash_equivalents = 100.0;
                b
            })
            .collect();
        let cash_flows = [2022, 2023]
            .into_iter()
            .map(|y| {
                let mut c = CashFlowStatement::new(date(y));
                c.dividends_paid = Some(-40.0);
                c
            })
            .collect();
        FinancialStatements::new(
            StatementSeries::new(incomes).unwrap(),
            StatementSeries::new(balances).unwrap(),
            StatementSeries::new(cash_flows).unwrap(),
        )
    }

    fn rate(sgr: &SustainableGrowth, method: SgrMethod) -> f64 {
        sgr.get(method).unwrap().as_decimal()
    }

    #[test]
    fn test_methods() {
        let sgr = SustainableGrowthEstimator::default()
            .estimate(&statements())
            .unwrap();

        // retention 0.6, ROE 0.2
        assert_relative_eq!(rate(&sgr, SgrMethod::RoeAveraged), 0.12, epsilon = 1e-12);
        assert_relative_eq!(rate(&sgr, SgrMethod::RoePerPeriod), 0.12, epsilon = 1e-12);
        assert_relative_eq!(rate(&sgr, SgrMethod::RoeFullRetention), 0.2, epsilon = 1e-12);

        // NOPAT 150 × 0.8 = 120, invested capital 600
        assert_relative_eq!(rate(&sgr, SgrMethod::RoicFullRetention), 0.2, epsilon = 1e-12);
        assert_relative_eq!(rate(&sgr, SgrMethod::RoicAveraged), 0.12, epsilon = 1e-12);

        // avg margin (0.125 + 0.1) / 2, avg turnover 0.9, leverage 2, retention 0.6
        let dupont = 0.1125 * 0.9 * 2.0 * 0.6;
        assert_relative_eq!(rate(&sgr, SgrMethod::DuPont), dupont, epsilon = 1e-12);

        assert_relative_eq!(rate(&sgr, SgrMethod::RevenueCagr), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_selection_changes_average_only() {
        let sgr = SustainableGrowthEstimator::default()
            .estimate(&statements())
            .unwrap();
        let before = sgr.estimates.clone();

        let only_roe = SgrSelection::none()
            .with(SgrMethod::RoeAveraged)
            .with(SgrMethod::RoeFullRetention);
        assert_relative_eq!(sgr.average(&only_roe).unwrap().as_decimal(), 0.16, epsilon = 1e-12);

        let mut selection = SgrSelection::all();
        assert!(!selection.toggle(SgrMethod::RevenueCagr));
        assert!(!selection.contains(SgrMethod::RevenueCagr));
        assert!(sgr.average(&selection).is_some());
        assert!(sgr.average(&SgrSelection::none()).is_none());

        assert_eq!(sgr.estimates, before);
    }

    #[test]
    fn test_negative_equity_excluded() {
        let mut statements = statements();
        let mut b = BalanceSheet::new(date(2023));
        b.total_assets = 1000.0;
        b.total_stockholders_equity = -50.0;
        let b2022 = statements.balance_sheets.ascending()[0].clone();
        statements.balance_sheets = StatementSeries::new(vec![b2022, b]).unwrap();

        let sgr = SustainableGrowthEstimator::default().estimate(&statements).unwrap();
        assert_eq!(sgr.periods[1].roe, None);
        assert_eq!(sgr.periods[1].leverage, None);
        // Only 2022's ROE survives
        assert_relative_eq!(rate(&sgr, SgrMethod::RoeFullRetention), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_single_period_has_no_cagr() {
        let mut statements = statements();
        let latest = statements.income_statements.ascending()[1].clone();
        statements.income_statements = StatementSeries::new(vec![latest]).unwrap();
        let sgr = SustainableGrowthEstimator::default().estimate(&statements).unwrap();
        assert!(sgr.get(SgrMethod::RevenueCagr).is_none());
        assert!(sgr.get(SgrMethod::RoeAveraged).is_some());
    }

    #[test]
    fn test_no_statements_is_insufficient() {
        let err = SustainableGrowthEstimator::default()
            .estimate(&FinancialStatements::default())
            .unwrap_err();
        assert!(err.is_insufficient_data());
    }
}
