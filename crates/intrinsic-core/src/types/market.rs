//! Market quote, company profile, and the bundled company snapshot.

use serde::{Deserialize, Serialize};

use super::statement::{FinancialStatements, IncomeStatement};
use crate::fallback::{FieldChain, Resolved};

/// Latest market quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Last traded price.
    #[serde(default)]
    pub price: f64,
    /// Market capitalization.
    #[serde(default)]
    pub market_cap: f64,
    /// Shares outstanding as reported with the quote.
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
}

impl Quote {
    /// Creates a quote.
    #[must_use]
    pub fn new(price: f64, market_cap: f64) -> Self {
        Self {
            price,
            market_cap,
            shares_outstanding: None,
        }
    }

    /// Sets the shares outstanding.
    #[must_use]
    pub fn with_shares_outstanding(mut self, shares: f64) -> Self {
        self.shares_outstanding = Some(shares);
        self
    }
}

/// Company profile as reported by the data provider.
///
/// Sector and industry are carried for display only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Company name.
    #[serde(default)]
    pub company_name: Option<String>,
    /// Reported levered beta.
    #[serde(default)]
    pub beta: Option<f64>,
    /// Sector.
    #[serde(default)]
    pub sector: Option<String>,
    /// Industry.
    #[serde(default)]
    pub industry: Option<String>,
    /// Shares outstanding as reported in the profile.
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
}

/// Everything fetched for one company in one analysis session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyData {
    /// Ticker symbol.
    pub symbol: String,
    /// Latest quote.
    #[serde(default)]
    pub quote: Quote,
    /// Company profile.
    #[serde(default)]
    pub profile: CompanyProfile,
    /// Annual statements.
    #[serde(flatten)]
    pub statements: FinancialStatements,
}

impl CompanyData {
    /// Creates a snapshot with the given symbol and everything else empty.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Reported levered beta, 1.0 when the provider has none.
    pub fn levered_beta(&self) -> f64 {
        self.profile.beta.filter(|b| b.is_finite()).unwrap_or(1.0)
    }

    /// Share count precedence: quote, profile, implied by market cap over
    /// price, then the latest income statement's weighted-average count.
    /// Negative counts are skipped.
    pub fn shares_chain() -> FieldChain<Self> {
        FieldChain::new("sharesOutstanding")
            .then("quote.sharesOutstanding", |c: &Self| {
                c.quote.shares_outstanding
            })
            .then("profile.sharesOutstanding", |c: &Self| {
                c.profile.shares_outstanding
            })
            .then("marketCap/price", |c: &Self| {
                (c.quote.price > 0.0).then(|| c.quote.market_cap / c.quote.price)
            })
            .then("incomeStatement.weightedAverageShares", |c: &Self| {
                c.statements
                    .income_statements
                    .latest()
                    .and_then(|s| IncomeStatement::shares_chain().value(s))
            })
            .positive_only()
    }

    /// Shares outstanding with the field that supplied them.
    pub fn shares_outstanding(&self) -> Option<Resolved> {
        Self::shares_chain().resolve(self)
    }
}
