//! Financial statement records and date-ordered statement series.
//!
//! Field names follow the market-data provider's camelCase JSON so that raw
//! provider payloads deserialize directly.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};
use crate::fallback::FieldChain;

/// A record keyed by its fiscal period end date.
pub trait Period {
    /// Statement kind, used in error messages.
    const KIND: &'static str;

    /// Fiscal period end date.
    fn period_end(&self) -> NaiveDate;

    /// Fiscal year of the period end.
    fn fiscal_year(&self) -> i32 {
        self.period_end().year()
    }
}

// =============================================================================
// INCOME STATEMENT
// =============================================================================

/// One annual income statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    /// Fiscal period end.
    pub date: NaiveDate,
    /// Total revenue.
    #[serde(default)]
    pub revenue: f64,
    /// Net income.
    #[serde(default)]
    pub net_income: f64,
    /// Operating income.
    #[serde(default)]
    pub operating_income: Option<f64>,
    /// EBIT, when reported separately from operating income.
    #[serde(default)]
    pub ebit: Option<f64>,
    /// Reported EBITDA.
    #[serde(default)]
    pub ebitda: Option<f64>,
    /// Depreciation and amortization.
    #[serde(default)]
    pub depreciation_and_amortization: Option<f64>,
    /// Income tax expense.
    #[serde(default)]
    pub income_tax_expense: f64,
    /// Income before tax.
    #[serde(default)]
    pub income_before_tax: f64,
    /// Interest expense (sign as reported).
    #[serde(default)]
    pub interest_expense: f64,
    /// Weighted-average basic shares outstanding.
    #[serde(default)]
    pub weighted_average_shs_out: Option<f64>,
    /// Weighted-average diluted shares outstanding.
    #[serde(default)]
    pub weighted_average_shs_out_dil: Option<f64>,
}

impl Period for IncomeStatement {
    const KIND: &'static str = "income statement";

    fn period_end(&self) -> NaiveDate {
        self.date
    }
}

impl IncomeStatement {
    /// Creates a statement with the given date and revenue; every other field is empty.
    #[must_use]
    pub fn new(date: NaiveDate, revenue: f64) -> Self {
        Self {
            date,
            revenue,
            net_income: 0.0,
            operating_income: None,
            ebit: None,
            ebitda: None,
            depreciation_and_amortization: None,
            income_tax_expense: 0.0,
            income_before_tax: 0.0,
            interest_expense: 0.0,
            weighted_average_shs_out: None,
            weighted_average_shs_out_dil: None,
        }
    }

    /// EBIT precedence: reported EBIT, operating income, pre-tax income plus interest.
    pub fn ebit_chain() -> FieldChain<Self> {
        FieldChain::new("ebit")
            .then("ebit", |s: &Self| s.ebit)
            .then("operatingIncome", |s: &Self| s.operating_income)
            .then("incomeBeforeTax+interestExpense", |s: &Self| {
                Some(s.income_before_tax + s.interest_expense.abs())
            })
    }

    /// EBITDA precedence: reported EBITDA, then operating income plus D&A.
    pub fn ebitda_chain() -> FieldChain<Self> {
        FieldChain::new("ebitda")
            .then("ebitda", |s: &Self| s.ebitda)
            .then("operatingIncome+depreciationAndAmortization", |s: &Self| {
                s.operating_income
                    .map(|oi| oi + s.depreciation_and_amortization.unwrap_or(0.0))
            })
    }

    /// Weighted-average share count precedence: diluted, then basic.
    pub fn shares_chain() -> FieldChain<Self> {
        FieldChain::new("weightedAverageShares")
            .then("weightedAverageShsOutDil", |s: &Self| {
                s.weighted_average_shs_out_dil
            })
            .then("weightedAverageShsOut", |s: &Self| s.weighted_average_shs_out)
            .positive_only()
    }

    /// EBIT resolved through [`IncomeStatement::ebit_chain`].
    pub fn resolved_ebit(&self) -> Option<f64> {
        Self::ebit_chain().value(self)
    }

    /// EBITDA resolved through [`IncomeStatement::ebitda_chain`].
    pub fn resolved_ebitda(&self) -> Option<f64> {
        Self::ebitda_chain().value(self)
    }
}

// =============================================================================
// BALANCE SHEET
// =============================================================================

/// One annual balance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    /// Fiscal period end.
    pub date: NaiveDate,
    /// Total assets.
    #[serde(default)]
    pub total_assets: f64,
    /// Total stockholders' equity.
    #[serde(default)]
    pub total_stockholders_equity: f64,
    /// Total current assets.
    #[serde(default)]
    pub total_current_assets: f64,
    /// Total current liabilities.
    #[serde(default)]
    pub total_current_liabilities: f64,
    /// Total debt.
    #[serde(default)]
    pub total_debt: Option<f64>,
    /// Short-term debt.
    #[serde(default)]
    pub short_term_debt: Option<f64>,
    /// Long-term debt.
    #[serde(default)]
    pub long_term_debt: Option<f64>,
    /// Cash and cash equivalents.
    #[serde(default)]
    pub cash_and_cash_equivalents: f64,
    /// Book value of preferred stock.
    #[serde(default)]
    pub preferred_stock: Option<f64>,
}

impl Period for BalanceSheet {
    const KIND: &'static str = "balance sheet";

    fn period_end(&self) -> NaiveDate {
        self.date
    }
}

impl BalanceSheet {
    /// Creates an empty balance sheet for the given date.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total_assets: 0.0,
            total_stockholders_equity: 0.0,
            total_current_assets: 0.0,
            total_current_liabilities: 0.0,
            total_debt: None,
            short_term_debt: None,
            long_term_debt: None,
            cash_and_cash_equivalents: 0.0,
            preferred_stock: None,
        }
    }

    /// Total debt precedence: reported total, then short-term plus long-term.
    pub fn total_debt_chain() -> FieldChain<Self> {
        FieldChain::new("totalDebt")
            .then("totalDebt", |s: &Self| s.total_debt)
            .then("shortTermDebt+longTermDebt", |s: &Self| {
                match (s.short_term_debt, s.long_term_debt) {
                    (None, None) => None,
                    (st, lt) => Some(st.unwrap_or(0.0) + lt.unwrap_or(0.0)),
                }
            })
    }

    /// Total debt, zero when nothing is reported.
    pub fn resolved_total_debt(&self) -> f64 {
        Self::total_debt_chain().value(self).unwrap_or(0.0)
    }

    /// Net working capital, current assets less current liabilities.
    pub fn working_capital(&self) -> f64 {
        self.total_current_assets - self.total_current_liabilities
    }
}

// =============================================================================
// CASH FLOW STATEMENT
// =============================================================================

/// One annual cash-flow statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowStatement {
    /// Fiscal period end.
    pub date: NaiveDate,
    /// Capital expenditure (usually reported negative).
    #[serde(default)]
    pub capital_expenditure: f64,
    /// Depreciation and amortization.
    #[serde(default)]
    pub depreciation_and_amortization: Option<f64>,
    /// Net dividends paid.
    #[serde(default)]
    pub net_dividends_paid: Option<f64>,
    /// Dividends paid (older provider field).
    #[serde(default)]
    pub dividends_paid: Option<f64>,
    /// Common dividends paid.
    #[serde(default)]
    pub common_dividends_paid: Option<f64>,
    /// Preferred dividends paid.
    #[serde(default)]
    pub preferred_dividends_paid: Option<f64>,
}

impl Period for CashFlowStatement {
    const KIND: &'static str = "cash flow statement";

    fn period_end(&self) -> NaiveDate {
        self.date
    }
}

impl CashFlowStatement {
    /// Creates an empty cash-flow statement for the given date.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            capital_expenditure: 0.0,
            depreciation_and_amortization: None,
            net_dividends_paid: None,
            dividends_paid: None,
            common_dividends_paid: None,
            preferred_dividends_paid: None,
        }
    }

    /// Dividends paid precedence: net, legacy total, then common plus preferred.
    pub fn dividends_chain() -> FieldChain<Self> {
        FieldChain::new("dividendsPaid")
            .then("netDividendsPaid", |s: &Self| s.net_dividends_paid)
            .then("dividendsPaid", |s: &Self| s.dividends_paid)
            .then("commonDividendsPaid+preferredDividendsPaid", |s: &Self| {
                match (s.common_dividends_paid, s.preferred_dividends_paid) {
                    (None, None) => None,
                    (c, p) => Some(c.unwrap_or(0.0) + p.unwrap_or(0.0)),
                }
            })
    }

    /// Absolute dividends paid, zero when nothing is reported.
    pub fn resolved_dividends(&self) -> f64 {
        Self::dividends_chain().value(self).map_or(0.0, f64::abs)
    }
}

// =============================================================================
// STATEMENT SERIES
// =============================================================================

/// Date-ordered collection of statements of one kind.
///
/// Periods are validated as distinct on construction and stored ascending.
/// The series is an immutable snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementSeries<T> {
    periods: Vec<T>,
}

impl<T> Default for StatementSeries<T> {
    fn default() -> Self {
        Self {
            periods: Vec::new(),
        }
    }
}

impl<T: Period> StatementSeries<T> {
    /// Builds a series from records in any order.
    ///
    /// Returns an error if two records share a period end date.
    pub fn new(mut periods: Vec<T>) -> CoreResult<Self> {
        periods.sort_by_key(Period::period_end);
        if let Some(pair) = periods
            .windows(2)
            .find(|w| w[0].period_end() == w[1].period_end())
        {
            return Err(CoreError::duplicate_period(T::KIND, pair[0].period_end()));
        }
        Ok(Self { periods })
    }

    /// Records sorted oldest first.
    pub fn ascending(&self) -> &[T] {
        &self.periods
    }

    /// Records sorted newest first.
    pub fn descending(&self) -> impl Iterator<Item = &T> {
        self.periods.iter().rev()
    }

    /// The most recent `n` records, oldest first.
    pub fn last_n(&self, n: usize) -> &[T] {
        let start = self.periods.len().saturating_sub(n);
        &self.periods[start..]
    }

    /// Most recent record.
    pub fn latest(&self) -> Option<&T> {
        self.periods.last()
    }

    /// Oldest record.
    pub fn earliest(&self) -> Option<&T> {
        self.periods.first()
    }

    /// Record for an exact period end date.
    pub fn find(&self, date: NaiveDate) -> Option<&T> {
        self.periods
            .binary_search_by_key(&date, Period::period_end)
            .ok()
            .map(|i| &self.periods[i])
    }

    /// Record matching `date` exactly, or failing that, the record in the same fiscal year.
    pub fn find_matching(&self, date: NaiveDate) -> Option<&T> {
        self.find(date)
            .or_else(|| self.periods.iter().find(|p| p.fiscal_year() == date.year()))
    }

    /// Record immediately preceding the one ending at `date`.
    pub fn previous(&self, date: NaiveDate) -> Option<&T> {
        let idx = self.periods.partition_point(|p| p.period_end() < date);
        idx.checked_sub(1).map(|i| &self.periods[i])
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

impl<T: Serialize> Serialize for StatementSeries<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.periods.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for StatementSeries<T>
where
    T: Deserialize<'de> + Period,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let periods = Vec::<T>::deserialize(deserializer)?;
        Self::new(periods).map_err(serde::de::Error::custom)
    }
}

/// The three statement series for one company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStatements {
    /// Annual income statements.
    #[serde(default)]
    pub income_statements: StatementSeries<IncomeStatement>,
    /// Annual balance sheets.
    #[serde(default)]
    pub balance_sheets: StatementSeries<BalanceSheet>,
    /// Annual cash-flow statements.
    #[serde(default)]
    pub cash_flow_statements: StatementSeries<CashFlowStatement>,
}

impl FinancialStatements {
    /// Bundles three series.
    #[must_use]
    pub fn new(
        income_statements: StatementSeries<IncomeStatement>,
        balance_sheets: StatementSeries<BalanceSheet>,
        cash_flow_statements: StatementSeries<CashFlowStatement>,
    ) -> Self {
        Self {
            income_statements,
            balance_sheets,
            cash_flow_statements,
        }
    }

    /// Annual revenue, oldest first.
    pub fn revenue_history(&self) -> Vec<f64> {
        self.income_statements
            .ascending()
            .iter()
            .map(|s| s.revenue)
            .collect()
    }
}
