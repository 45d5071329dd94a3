//! Discounted cash flow projection and the enterprise-to-equity bridge.
//!
//! The projector normalizes the last few years of statements into steady-state
//! ratios, compounds revenue at the forecast growth rate, derives unlevered free
//! cash flow for each projected year, discounts it at the WACC, adds a terminal
//! value, and bridges enterprise value to a per-share figure:
//!
//! ```text
//! EV     = Σ FCFₜ / (1 + WACC)^t + TV / (1 + WACC)^T
//! Equity = EV − Debt + Cash
//! Value  = Equity / Shares
//! ```
//!
//! Under the default [`DiscountConvention::FromFirstHistorical`], `t` counts
//! years since the first historical period in the window.

mod projection;
mod terminal;

pub use projection::{HistoricalRatios, ProjectionRow, ProjectionSeries, RowKind};
pub use terminal::{
    exit_multiple_value, perpetuity_value, trailing_ev_to_ebitda, MultipleSource, TerminalValue,
};

use intrinsic_core::types::{DiscountConvention, TerminalMethod};
use intrinsic_core::{CompanyData, Rate};
use serde::Serialize;

use crate::error::{ValuationError, ValuationResult};
use projection::{historical_rows, projected_rows, ProjectionInputs};

/// Minimum number of income statements the projector accepts.
pub const MIN_INCOME_STATEMENTS: usize = 2;

/// Projection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DcfAssumptions {
    /// Number of projected years.
    pub horizon_years: u32,
    /// Number of historical years to normalize over.
    pub history_window: usize,
    /// Tax rate used when the effective rate is undefined.
    pub tax_rate: Rate,
    /// Terminal value method.
    pub terminal_method: TerminalMethod,
    /// Exit multiple override.
    pub exit_multiple: Option<f64>,
    /// Exit multiple used when the trailing EV/EBITDA is undefined.
    pub fallback_exit_multiple: f64,
    /// Origin of the discount periods.
    pub discount_convention: DiscountConvention,
}

impl Default for DcfAssumptions {
    fn default() -> Self {
        Self {
            horizon_years: 5,
            history_window: 5,
            tax_rate: Rate::from_percent(21.0),
            terminal_method: TerminalMethod::ExitMultiple,
            exit_multiple: None,
            fallback_exit_multiple: 10.0,
            discount_convention: DiscountConvention::FromFirstHistorical,
        }
    }
}

/// Enterprise value to per-share value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityBridge {
    /// Sum of discounted projected FCF.
    pub sum_discounted_fcf: f64,
    /// Present value of the terminal value.
    pub pv_terminal_value: f64,
    /// `sum_discounted_fcf + pv_terminal_value`.
    pub enterprise_value: f64,
    /// Total debt from the latest balance sheet.
    pub total_debt: f64,
    /// Cash and equivalents from the latest balance sheet.
    pub cash: f64,
    /// `total_debt − cash`.
    pub net_debt: f64,
    /// `enterprise_value − net_debt`.
    pub equity_value: f64,
    /// Shares outstanding.
    pub shares_outstanding: f64,
    /// Field that supplied the share count.
    pub shares_source: &'static str,
    /// Equity value per share.
    pub intrinsic_value_per_share: f64,
    /// Current market price.
    pub current_price: f64,
    /// `intrinsic / price − 1`; `None` without a positive price.
    pub premium: Option<Rate>,
}

/// Full DCF output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcfValuation {
    /// Growth rate applied to revenue.
    pub growth: Rate,
    /// Discount rate.
    pub wacc: Rate,
    /// Normalized historical ratios.
    pub ratios: HistoricalRatios,
    /// Historical and projected rows.
    pub projection: ProjectionSeries,
    /// Terminal value.
    pub terminal: TerminalValue,
    /// Bridge to per-share value.
    pub bridge: EquityBridge,
}

impl DcfValuation {
    /// Intrinsic value per share.
    pub fn intrinsic_value_per_share(&self) -> f64 {
        self.bridge.intrinsic_value_per_share
    }

    /// Premium (positive) or discount (negative) to the market price, in percent.
    pub fn premium_pct(&self) -> Option<f64> {
        self.bridge.premium.map(Rate::as_percent)
    }

    /// Per-share value for a different WACC and exit multiple, keeping every
    /// projected cash flow unchanged.
    ///
    /// Returns `None` if `wacc` is not above −100% or the shares are zero.
    pub fn reprice(&self, wacc: Rate, exit_multiple: f64) -> Option<f64> {
        if !(wacc.as_decimal() > -1.0) || !exit_multiple.is_finite() {
            return None;
        }
        let final_year = self.projection.final_year()?;
        let pv_fcf: f64 = self
            .projection
            .projected()
            .map(|r| r.unlevered_fcf.unwrap_or(0.0) * wacc.discount_factor(r.discount_period))
            .sum();
        let pv_terminal = exit_multiple_value(self.terminal.terminal_ebitda, exit_multiple)
            * wacc.discount_factor(final_year.discount_period);
        let equity = pv_fcf + pv_terminal - self.bridge.net_debt;
        let per_share = equity / self.bridge.shares_outstanding;
        per_share.is_finite().then_some(per_share)
    }
}

/// Projects free cash flow and values the equity.
#[derive(Debug, Clone, Default)]
pub struct DcfProjector {
    assumptions: DcfAssumptions,
}

impl DcfProjector {
    /// Creates a projector.
    #[must_use]
    pub fn new(assumptions: DcfAssumptions) -> Self {
        Self { assumptions }
    }

    /// Assumptions in use.
    pub fn assumptions(&self) -> &DcfAssumptions {
        &self.assumptions
    }

    /// Runs the projection.
    ///
    /// # Errors
    ///
    /// - [`ValuationError::InsufficientData`] with fewer than two income
    ///   statements, no balance sheet, no cash-flow statement, no usable EBITDA
    ///   margin, or no share count
    /// - [`ValuationError::InvalidAssumption`] for a zero horizon, a WACC at or
    ///   below −100%, or a non-positive exit multiple
    /// - [`ValuationError::InvalidTerminalGrowth`] when perpetuity growth is
    ///   not below the WACC
    pub fn project(
        &self,
        company: &CompanyData,
        growth: Rate,
        wacc: Rate,
    ) -> ValuationResult<DcfValuation> {
        let a = &self.assumptions;
        let statements = &company.statements;

        check_count(
            "dcf income statements",
            MIN_INCOME_STATEMENTS,
            statements.income_statements.len(),
        )?;
        check_count("dcf balance sheets", 1, statements.balance_sheets.len())?;
        check_count(
            "dcf cash flow statements",
            1,
            statements.cash_flow_statements.len(),
        )?;

        if a.horizon_years == 0 {
            return Err(ValuationError::invalid_assumption(
                "horizon_years",
                "must be at least 1",
            ));
        }
        if !(wacc.as_decimal() > -1.0) || !wacc.is_finite() {
            return Err(ValuationError::invalid_assumption(
                "wacc",
                format!("{wacc} is not a usable discount rate"),
            ));
        }
        if !growth.is_finite() {
            return Err(ValuationError::invalid_assumption("growth", "not finite"));
        }

        let window = a.history_window.max(MIN_INCOME_STATEMENTS);
        let (historical, ratios) = historical_rows(statements, window, a.tax_rate);
        let last = historical
            .last()
            .ok_or_else(|| ValuationError::insufficient_data("dcf income statements", 2, 0))?;

        let first_offset = match a.discount_convention {
            DiscountConvention::FromFirstHistorical => (historical.len() - 1) as f64,
            DiscountConvention::FromLastHistorical => 0.0,
        };
        let projected = projected_rows(
            last,
            &ratios,
            &ProjectionInputs {
                growth,
                wacc,
                horizon: a.horizon_years,
                first_offset,
                fallback_tax: a.tax_rate,
            },
        )?;
        let trailing_ebitda = last.ebitda;
        let projection = ProjectionSeries::new(historical, projected);

        let balance = statements
            .balance_sheets
            .latest()
            .ok_or_else(|| ValuationError::insufficient_data("dcf balance sheets", 1, 0))?;
        let total_debt = balance.resolved_total_debt();
        let cash = balance.cash_and_cash_equivalents;

        let terminal = self.terminal_value(
            &projection,
            wacc,
            trailing_ebitda.and_then(|ebitda| {
                trailing_ev_to_ebitda(company.quote.market_cap, total_debt, cash, ebitda)
            }),
        )?;

        let shares = company
            .shares_outstanding()
            .ok_or_else(|| ValuationError::insufficient_data("dcf shares outstanding", 1, 0))?;

        let sum_discounted_fcf = projection.sum_discounted_fcf();
        let enterprise_value = sum_discounted_fcf + terminal.present_value;
        let net_debt = total_debt - cash;
        let equity_value = enterprise_value - net_debt;
        let intrinsic_value_per_share = equity_value / shares.value;
        let current_price = company.quote.price;
        let premium = (current_price > 0.0)
            .then(|| Rate::from_decimal(intrinsic_value_per_share / current_price - 1.0))
            .filter(|p| p.is_finite());

        log::info!(
            "dcf {}: EV {:.0}, equity {:.0}, {:.2}/share ({} shares from {})",
            company.symbol,
            enterprise_value,
            equity_value,
            intrinsic_value_per_share,
            shares.value,
            shares.source
        );

        Ok(DcfValuation {
            growth,
            wacc,
            ratios,
            projection,
            terminal,
            bridge: EquityBridge {
                sum_discounted_fcf,
                pv_terminal_value: terminal.present_value,
                enterprise_value,
                total_debt,
                cash,
                net_debt,
                equity_value,
                shares_outstanding: shares.value,
                shares_source: shares.source,
                intrinsic_value_per_share,
                current_price,
                premium,
            },
        })
    }

    fn terminal_value(
        &self,
        projection: &ProjectionSeries,
        wacc: Rate,
        trailing_multiple: Option<f64>,
    ) -> ValuationResult<TerminalValue> {
        let a = &self.assumptions;
        let final_year = projection
            .final_year()
            .ok_or_else(|| ValuationError::insufficient_data("dcf projected years", 1, 0))?;
        let terminal_ebitda = final_year.ebitda.unwrap_or(0.0);
        let terminal_fcf = final_year.unlevered_fcf.unwrap_or(0.0);
        let discount_factor = final_year.discount_factor;

        let (value, exit_multiple, multiple_source) = match a.terminal_method {
            TerminalMethod::ExitMultiple => {
                let (multiple, source) = self.select_multiple(trailing_multiple)?;
                (
                    exit_multiple_value(terminal_ebitda, multiple),
                    Some(multiple),
                    Some(source),
                )
            }
            TerminalMethod::PerpetuityGrowth { growth_pct } => (
                perpetuity_value(terminal_fcf, wacc, Rate::from_percent(growth_pct))?,
                None,
                None,
            ),
        };

        Ok(TerminalValue {
            method: a.terminal_method,
            exit_multiple,
            multiple_source,
            terminal_ebitda,
            terminal_fcf,
            value,
            discount_factor,
            present_value: value * discount_factor,
        })
    }

    fn select_multiple(&self, trailing: Option<f64>) -> ValuationResult<(f64, MultipleSource)> {
        let a = &self.assumptions;
        let (multiple, source) = match (a.exit_multiple, trailing) {
            (Some(m), _) => (m, MultipleSource::Override),
            (None, Some(m)) => (m, MultipleSource::TrailingEvEbitda),
            (None, None) => {
                log::warn!(
                    "dcf: trailing EV/EBITDA undefined, using fallback exit multiple {:.1}x",
                    a.fallback_exit_multiple
                );
                (a.fallback_exit_multiple, MultipleSource::Fallback)
            }
        };
        if !(multiple > 0.0) || !multiple.is_finite() {
            return Err(ValuationError::invalid_assumption(
                "exit_multiple",
                format!("{multiple} must be positive"),
            ));
        }
        Ok((multiple, source))
    }
}

fn check_count(component: &'static str, required: usize, actual: usize) -> ValuationResult<()> {
    if actual < required {
        log::warn!("{}: need {}, have {}", component, required, actual);
        return Err(ValuationError::insufficient_data(component, required, actual));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Datelike, NaiveDate};
    use intrinsic_core::types::{
        BalanceSheet, CashFlowStatement, IncomeStatement, Quote, StatementSeries,
    };

    fn date(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 12, 31).unwrap()
    }

    fn company(years: &[i32]) -> CompanyData {
        let mut data = CompanyData::new("ACME");
        data.quote = Quote::new(20.0, 2000.0).with_shares_outstanding(100.0);

        let incomes = years
            .iter()
            .map(|&y| {
                let mut s = IncomeStatement::new(date(y), 1000.0);
                s.ebitda = Some(200.0);
                s.operating_income = Some(150.0);
                s.depreciation_and_amortization = Some(50.0);
                s.income_before_tax = 140.0;
                s.income_tax_expense = 28.0;
                s
            })
            .collect();
        let balances = years
            .iter()
            .map(|&y| {
                let mut b = BalanceSheet::new(date(y));
                b.total_debt = Some(300.0);
                b.cash_and_cash_equivalents = 100.0;
                b.total_current_assets = 400.0;
                b.total_current_liabilities = 200.0;
                b
            })
            .collect();
        let cash_flows = years
            .iter()
            .map(|&y| {
                let mut c = CashFlowStatement::new(date(y));
                c.capital_expenditure = -60.0;
                c
            })
            .collect();
        data.statements.income_statements = StatementSeries::new(incomes).unwrap();
        data.statements.balance_sheets = StatementSeries::new(balances).unwrap();
        data.statements.cash_flow_statements = StatementSeries::new(cash_flows).unwrap();
        data
    }

    #[test]
    fn test_single_income_statement_is_insufficient() {
        let err = DcfProjector::default()
            .project(&company(&[2023]), Rate::from_percent(5.0), Rate::from_percent(8.0))
            .unwrap_err();
        assert_eq!(
            err,
            ValuationError::insufficient_data("dcf income statements", 2, 1)
        );
    }

    #[test]
    fn test_flat_company_valuation() {
        let projector = DcfProjector::new(DcfAssumptions {
            horizon_years: 1,
            exit_multiple: Some(10.0),
            ..DcfAssumptions::default()
        });
        let wacc = Rate::from_percent(10.0);
        let result = projector
            .project(&company(&[2022, 2023]), Rate::ZERO, wacc)
            .unwrap();

        // NOPAT 150 × 0.8 = 120; FCF = 120 + 50 − 60 − 0 = 110
        let row = result.projection.final_year().unwrap();
        assert_relative_eq!(row.unlevered_fcf.unwrap(), 110.0, epsilon = 1e-9);
        // Two historical years: first projected year is t = 2
        assert_relative_eq!(row.discount_period, 2.0);
        let df = 1.0 / 1.1_f64.powi(2);
        assert_relative_eq!(row.discounted_fcf.unwrap(), 110.0 * df, epsilon = 1e-9);

        assert_eq!(result.terminal.multiple_source, Some(MultipleSource::Override));
        assert_relative_eq!(result.terminal.value, 2000.0, epsilon = 1e-9);

        let ev = 110.0 * df + 2000.0 * df;
        assert_relative_eq!(result.bridge.enterprise_value, ev, epsilon = 1e-9);
        assert_relative_eq!(result.bridge.equity_value, ev - 200.0, epsilon = 1e-9);
        assert_relative_eq!(
            result.intrinsic_value_per_share(),
            (ev - 200.0) / 100.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            result.premium_pct().unwrap(),
            ((ev - 200.0) / 100.0 / 20.0 - 1.0) * 100.0,
            epsilon = 1e-9
        );
        assert_eq!(result.bridge.shares_source, "quote.sharesOutstanding");
    }

    #[test]
    fn test_trailing_multiple_default() {
        let projector = DcfProjector::new(DcfAssumptions {
            horizon_years: 3,
            ..DcfAssumptions::default()
        });
        let result = projector
            .project(&company(&[2021, 2022, 2023]), Rate::ZERO, Rate::from_percent(9.0))
            .unwrap();
        // EV = 2000 + 300 − 100 = 2200 over EBITDA 200
        assert_eq!(
            result.terminal.multiple_source,
            Some(MultipleSource::TrailingEvEbitda)
        );
        assert_relative_eq!(result.terminal.exit_multiple.unwrap(), 11.0, epsilon = 1e-12);
    }

    #[test]
    fn test_trailing_multiple_uses_latest_annual_ebitda() {
        let mut data = company(&[2022, 2023]);
        let incomes = data
            .statements
            .income_statements
            .ascending()
            .iter()
            .cloned()
            .map(|mut s| {
                s.ebitda = Some(if s.date.year() == 2023 { 275.0 } else { 100.0 });
                s
            })
            .collect();
        data.statements.income_statements = StatementSeries::new(incomes).unwrap();

        let result = DcfProjector::default()
            .project(&data, Rate::ZERO, Rate::from_percent(9.0))
            .unwrap();
        // EV 2200 over the 2023 EBITDA only
        assert_relative_eq!(result.terminal.exit_multiple.unwrap(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fallback_multiple_without_market_cap() {
        let mut data = company(&[2022, 2023]);
        data.quote.market_cap = 0.0;
        let result = DcfProjector::default()
            .project(&data, Rate::ZERO, Rate::from_percent(9.0))
            .unwrap();
        assert_eq!(result.terminal.multiple_source, Some(MultipleSource::Fallback));
        assert_relative_eq!(result.terminal.exit_multiple.unwrap(), 10.0);
    }

    #[test]
    fn test_discount_from_last_historical() {
        let projector = DcfProjector::new(DcfAssumptions {
            discount_convention: DiscountConvention::FromLastHistorical,
            ..DcfAssumptions::default()
        });
        let result = projector
            .project(&company(&[2021, 2022, 2023]), Rate::ZERO, Rate::from_percent(9.0))
            .unwrap();
        let first = result.projection.projected().next().unwrap();
        assert_relative_eq!(first.discount_period, 1.0);
        assert_eq!(result.projection.projected().count(), 5);
    }

    #[test]
    fn test_perpetuity_growth_rejects_growth_above_wacc() {
        let projector = DcfProjector::new(DcfAssumptions {
            terminal_method: TerminalMethod::PerpetuityGrowth { growth_pct: 9.0 },
            ..DcfAssumptions::default()
        });
        let err = projector
            .project(&company(&[2022, 2023]), Rate::ZERO, Rate::from_percent(8.0))
            .unwrap_err();
        assert!(matches!(err, ValuationError::InvalidTerminalGrowth { .. }));
    }

    #[test]
    fn test_missing_shares_is_insufficient() {
        let mut data = company(&[2022, 2023]);
        data.quote = Quote::new(0.0, 0.0);
        let err = DcfProjector::default()
            .project(&data, Rate::ZERO, Rate::from_percent(8.0))
            .unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_reprice_matches_projection_at_same_inputs() {
        let projector = DcfProjector::new(DcfAssumptions {
            exit_multiple: Some(12.0),
            ..DcfAssumptions::default()
        });
        let wacc = Rate::from_percent(8.0);
        let result = projector
            .project(&company(&[2021, 2022, 2023]), Rate::from_percent(4.0), wacc)
            .unwrap();
        assert_relative_eq!(
            result.reprice(wacc, 12.0).unwrap(),
            result.intrinsic_value_per_share(),
            epsilon = 1e-9
        );
        assert!(result.reprice(Rate::from_percent(10.0), 12.0).unwrap()
            < result.intrinsic_value_per_share());
    }

    #[test]
    fn test_valuation_json_shape() {
        let projector = DcfProjector::new(DcfAssumptions {
            horizon_years: 1,
            exit_multiple: Some(10.0),
            ..DcfAssumptions::default()
        });
        let result = projector
            .project(&company(&[2022, 2023]), Rate::ZERO, Rate::from_percent(10.0))
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_relative_eq!(json["wacc"].as_f64().unwrap(), 0.10, epsilon = 1e-12);
        assert_relative_eq!(json["growth"].as_f64().unwrap(), 0.0);
        assert_eq!(json["terminal"]["multiple_source"], "override");
        assert_relative_eq!(json["terminal"]["value"].as_f64().unwrap(), 2000.0, epsilon = 1e-9);
        assert_eq!(json["bridge"]["shares_source"], "quote.sharesOutstanding");
        assert_relative_eq!(
            json["bridge"]["intrinsic_value_per_share"].as_f64().unwrap(),
            result.intrinsic_value_per_share(),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            json["bridge"]["premium"].as_f64().unwrap(),
            result.bridge.premium.unwrap().as_decimal(),
            epsilon = 1e-12
        );
    }
}
