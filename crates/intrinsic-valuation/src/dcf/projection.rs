//! Historical normalization and forward projection rows.

use intrinsic_core::types::{BalanceSheet, CashFlowStatement, IncomeStatement, Period};
use intrinsic_core::{FieldChain, FinancialStatements, Rate};
use intrinsic_math::stats::{mean_defined, safe_ratio};
use serde::Serialize;

use crate::error::{ValuationError, ValuationResult};

/// Whether a row is reported history or a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Built from reported statements.
    Historical,
    /// Extrapolated from historical ratios.
    Projected,
}

/// One fiscal year of the projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionRow {
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Historical or projected.
    pub kind: RowKind,
    /// Revenue.
    pub revenue: f64,
    /// Year-over-year revenue growth; `None` for the earliest row.
    pub revenue_growth: Option<Rate>,
    /// EBITDA.
    pub ebitda: Option<f64>,
    /// EBITDA over revenue.
    pub ebitda_margin: Option<f64>,
    /// Depreciation and amortization.
    pub depreciation: f64,
    /// Operating profit after tax.
    pub nopat: Option<f64>,
    /// Capital expenditure, as a positive outflow.
    pub capital_expenditure: f64,
    /// Increase in net working capital.
    pub change_in_working_capital: f64,
    /// `NOPAT + D&A − CapEx − ΔWC`.
    pub unlevered_fcf: Option<f64>,
    /// Years of discounting applied; zero for historical rows.
    pub discount_period: f64,
    /// `1 / (1 + WACC)^t`; 1 for historical rows.
    pub discount_factor: f64,
    /// FCF times the discount factor; `None` for historical rows.
    pub discounted_fcf: Option<f64>,
}

impl ProjectionRow {
    /// Returns true for a projected row.
    pub fn is_projected(&self) -> bool {
        self.kind == RowKind::Projected
    }
}

/// Historical rows followed by projected rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProjectionSeries {
    rows: Vec<ProjectionRow>,
}

impl ProjectionSeries {
    /// Concatenates history and forecast.
    #[must_use]
    pub fn new(historical: Vec<ProjectionRow>, projected: Vec<ProjectionRow>) -> Self {
        let mut rows = historical;
        rows.extend(projected);
        Self { rows }
    }

    /// Every row, oldest first.
    pub fn rows(&self) -> &[ProjectionRow] {
        &self.rows
    }

    /// Historical rows.
    pub fn historical(&self) -> impl Iterator<Item = &ProjectionRow> {
        self.rows.iter().filter(|r| !r.is_projected())
    }

    /// Projected rows.
    pub fn projected(&self) -> impl Iterator<Item = &ProjectionRow> {
        self.rows.iter().filter(|r| r.is_projected())
    }

    /// Last projected row.
    pub fn final_year(&self) -> Option<&ProjectionRow> {
        self.rows.iter().rev().find(|r| r.is_projected())
    }

    /// Sum of discounted projected FCF.
    pub fn sum_discounted_fcf(&self) -> f64 {
        self.projected().filter_map(|r| r.discounted_fcf).sum()
    }
}

/// Steady-state ratios averaged over the historical rows.
///
/// Each average skips years whose ratio is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HistoricalRatios {
    /// Number of historical years.
    pub periods: usize,
    /// EBITDA over revenue.
    pub ebitda_margin: Option<f64>,
    /// CapEx over revenue.
    pub capex_to_revenue: Option<f64>,
    /// D&A over revenue.
    pub depreciation_to_revenue: Option<f64>,
    /// Effective tax rate.
    pub tax_rate: Option<f64>,
    /// Net working capital over revenue.
    pub working_capital_to_revenue: Option<f64>,
}

/// One period's statements side by side.
struct PeriodView<'a> {
    income: &'a IncomeStatement,
    cash_flow: Option<&'a CashFlowStatement>,
}

impl<'a> PeriodView<'a> {
    fn depreciation_chain() -> FieldChain<Self> {
        FieldChain::new("depreciationAndAmortization")
            .then("incomeStatement.depreciationAndAmortization", |v: &Self| {
                v.income.depreciation_and_amortization
            })
            .then("cashFlowStatement.depreciationAndAmortization", |v: &Self| {
                v.cash_flow.and_then(|c| c.depreciation_and_amortization)
            })
    }

    fn ebitda_chain() -> FieldChain<Self> {
        FieldChain::new("ebitda")
            .then("ebitda", |v: &Self| v.income.ebitda)
            .then("operatingIncome+depreciationAndAmortization", |v: &Self| {
                v.income.operating_income.map(|oi| oi + v.depreciation())
            })
            .then("ebit+depreciationAndAmortization", |v: &Self| {
                v.income.ebit.map(|ebit| ebit + v.depreciation())
            })
    }

    fn depreciation(&self) -> f64 {
        Self::depreciation_chain().value(self).unwrap_or(0.0).abs()
    }

    fn ebitda(&self) -> Option<f64> {
        Self::ebitda_chain().value(self)
    }

    fn ebit(&self) -> Option<f64> {
        self.income
            .resolved_ebit()
            .or_else(|| self.ebitda().map(|e| e - self.depreciation()))
    }
}

/// Effective tax rate, kept only when it lies in `[0, 1]`.
fn effective_tax_rate(income: &IncomeStatement) -> Option<f64> {
    safe_ratio(income.income_tax_expense, income.income_before_tax)
        .filter(|t| (0.0..=1.0).contains(t))
}

fn working_capital_change(balance: Option<&BalanceSheet>, previous: Option<&BalanceSheet>) -> f64 {
    match (balance, previous) {
        (Some(b), Some(p)) => b.working_capital() - p.working_capital(),
        _ => 0.0,
    }
}

/// Builds historical rows from the last `window` income statements and
/// averages their ratios.
pub(crate) fn historical_rows(
    statements: &FinancialStatements,
    window: usize,
    fallback_tax: Rate,
) -> (Vec<ProjectionRow>, HistoricalRatios) {
    let incomes = statements.income_statements.last_n(window);
    let balances = &statements.balance_sheets;
    let cash_flows = &statements.cash_flow_statements;

    let mut rows = Vec::with_capacity(incomes.len());
    let mut capex_ratios = Vec::with_capacity(incomes.len());
    let mut depreciation_ratios = Vec::with_capacity(incomes.len());
    let mut tax_rates = Vec::with_capacity(incomes.len());
    let mut wc_ratios = Vec::with_capacity(incomes.len());
    let mut previous_revenue: Option<f64> = None;

    for income in incomes {
        let cash_flow = cash_flows.find_matching(income.date);
        let balance = balances.find_matching(income.date);
        let previous_balance = balance.and_then(|b| balances.previous(b.date));
        let view = PeriodView { income, cash_flow };

        let revenue = income.revenue;
        let depreciation = view.depreciation();
        let ebitda = view.ebitda();
        let tax_rate = effective_tax_rate(income);
        let nopat = view
            .ebit()
            .map(|ebit| ebit * (1.0 - tax_rate.unwrap_or(fallback_tax.as_decimal())));
        let capital_expenditure = cash_flow.map_or(0.0, |c| c.capital_expenditure.abs());
        let change_in_working_capital = working_capital_change(balance, previous_balance);

        capex_ratios.push(cash_flow.and_then(|_| safe_ratio(capital_expenditure, revenue)));
        depreciation_ratios.push(safe_ratio(depreciation, revenue));
        tax_rates.push(tax_rate);
        wc_ratios.push(balance.and_then(|b| safe_ratio(b.working_capital(), revenue)));

        rows.push(ProjectionRow {
            fiscal_year: income.fiscal_year(),
            kind: RowKind::Historical,
            revenue,
            revenue_growth: previous_revenue
                .and_then(|prev| safe_ratio(revenue - prev, prev))
                .map(Rate::from_decimal),
            ebitda,
            ebitda_margin: ebitda.and_then(|e| safe_ratio(e, revenue)),
            depreciation,
            nopat,
            capital_expenditure,
            change_in_working_capital,
            unlevered_fcf: nopat
                .map(|n| n + depreciation - capital_expenditure - change_in_working_capital),
            discount_period: 0.0,
            discount_factor: 1.0,
            discounted_fcf: None,
        });
        previous_revenue = Some(revenue);
    }

    let ratios = HistoricalRatios {
        periods: rows.len(),
        ebitda_margin: mean_defined(rows.iter().map(|r| r.ebitda_margin)),
        capex_to_revenue: mean_defined(capex_ratios),
        depreciation_to_revenue: mean_defined(depreciation_ratios),
        tax_rate: mean_defined(tax_rates),
        working_capital_to_revenue: mean_defined(wc_ratios),
    };

    (rows, ratios)
}

/// Inputs to the forward projection.
pub(crate) struct ProjectionInputs {
    pub growth: Rate,
    pub wacc: Rate,
    pub horizon: u32,
    /// Discount periods already elapsed before projected year 1.
    pub first_offset: f64,
    pub fallback_tax: Rate,
}

/// Projects `horizon` years from the last historical row.
pub(crate) fn projected_rows(
    last: &ProjectionRow,
    ratios: &HistoricalRatios,
    inputs: &ProjectionInputs,
) -> ValuationResult<Vec<ProjectionRow>> {
    let margin = ratios
        .ebitda_margin
        .ok_or_else(|| ValuationError::insufficient_data("dcf ebitda margin", 1, 0))?;
    let capex_ratio = ratios.capex_to_revenue.unwrap_or(0.0);
    let depreciation_ratio = ratios.depreciation_to_revenue.unwrap_or(0.0);
    let wc_ratio = ratios.working_capital_to_revenue.unwrap_or(0.0);
    let tax_rate = ratios
        .tax_rate
        .unwrap_or_else(|| inputs.fallback_tax.as_decimal());

    let mut rows = Vec::with_capacity(inputs.horizon as usize);
    let mut previous_revenue = last.revenue;

    for year in 1..=inputs.horizon {
        let revenue = previous_revenue * (1.0 + inputs.growth.as_decimal());
        let ebitda = revenue * margin;
        let depreciation = revenue * depreciation_ratio;
        let nopat = (ebitda - depreciation) * (1.0 - tax_rate);
        let capital_expenditure = revenue * capex_ratio;
        let change_in_working_capital = wc_ratio * (revenue - previous_revenue);
        let unlevered_fcf = nopat + depreciation - capital_expenditure - change_in_working_capital;

        let discount_period = inputs.first_offset + f64::from(year);
        let discount_factor = inputs.wacc.discount_factor(discount_period);

        rows.push(ProjectionRow {
            fiscal_year: last.fiscal_year + year as i32,
            kind: RowKind::Projected,
            revenue,
            revenue_growth: Some(inputs.growth),
            ebitda: Some(ebitda),
            ebitda_margin: Some(margin),
            depreciation,
            nopat: Some(nopat),
            capital_expenditure,
            change_in_working_capital,
            unlevered_fcf: Some(unlevered_fcf),
            discount_period,
            discount_factor,
            discounted_fcf: Some(unlevered_fcf * discount_factor),
        });
        previous_revenue = revenue;
    }

    Ok(rows)
}
