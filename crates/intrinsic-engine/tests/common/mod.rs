//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;

use intrinsic_core::types::{
    BalanceSheet, CashFlowStatement, FinancialStatements, IncomeStatement, Quote, StatementSeries,
};
use intrinsic_core::CompanyData;

pub fn date(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 12, 31).unwrap()
}

/// Five years of a company growing revenue 8% a year at a 25% EBITDA margin.
pub fn statements(years: usize) -> FinancialStatements {
    let revenue = |i: usize| 1_000.0 * 1.08_f64.powi(i as i32);
    let incomes = (0..years)
        .map(|i| {
            let r = revenue(i);
            let mut s = IncomeStatement::new(date(2019 + i as i32), r);
            s.ebitda = Some(0.25 * r);
            s.depreciation_and_amortization = Some(0.05 * r);
            s.ebit = Some(0.20 * r);
            s.operating_income = Some(0.20 * r);
            s.interest_expense = 12.0;
            s.income_before_tax = 0.20 * r - 12.0;
            s.income_tax_expense = 0.21 * (0.20 * r - 12.0);
            s.net_income = 0.79 * (0.20 * r - 12.0);
            s
        })
        .collect();
    let balances = (0..years)
        .map(|i| {
            let r = revenue(i);
            let mut b = BalanceSheet::new(date(2019 + i as i32));
            b.total_assets = 1.2 * r;
            b.total_stockholders_equity = 0.7 * r;
            b.total_current_assets = 0.35 * r;
            b.total_current_liabilities = 0.2 * r;
            b.total_debt = Some(300.0);
            b.cash_and_cash_equivalents = 120.0;
            b
        })
        .collect();
    let cash_flows = (0..years)
        .map(|i| {
            let r = revenue(i);
            let mut c = CashFlowStatement::new(date(2019 + i as i32));
            c.capital_expenditure = -0.06 * r;
            c.dividends_paid = Some(-0.03 * r);
            c
        })
        .collect();

    FinancialStatements::new(
        StatementSeries::new(incomes).unwrap(),
        StatementSeries::new(balances).unwrap(),
        StatementSeries::new(cash_flows).unwrap(),
    )
}

pub fn company(years: usize) -> CompanyData {
    let mut data = CompanyData::new("ACME");
    data.quote = Quote::new(20.0, 2_000.0).with_shares_outstanding(100.0);
    data.profile.beta = Some(1.1);
    data.statements = statements(years);
    data
}
