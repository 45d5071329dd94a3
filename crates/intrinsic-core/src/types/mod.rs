//! Domain types for intrinsic valuation.

mod market;
mod policy;
mod rate;
mod rating;
mod statement;

pub use market::{CompanyData, CompanyProfile, Quote};
pub use policy::{BetaPolicy, DiscountConvention, TerminalMethod};
pub use rate::Rate;
pub use rating::CreditRating;
pub use statement::{
    BalanceSheet, CashFlowStatement, FinancialStatements, IncomeStatement, Period,
    StatementSeries,
};
