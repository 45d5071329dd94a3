//! Deterministic valuation pipeline.
//!
//! [`compute`] evaluates every stage from the full input set. Growth,
//! capital, and sustainable growth are independent; the DCF consumes the
//! first two.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use intrinsic_config::{Validate, ValuationAssumptions};
use intrinsic_core::types::{FinancialStatements, Quote};
use intrinsic_core::{CompanyData, Rate};
use intrinsic_valuation::capital::{CapitalCostCalculator, CostOfCapitalBreakdown};
use intrinsic_valuation::dcf::{DcfProjector, DcfValuation};
use intrinsic_valuation::growth::GrowthEstimate;
use intrinsic_valuation::sustainable::SustainableGrowth;
use intrinsic_valuation::ValuationResult;

use crate::error::{EngineError, EngineResult};

// =============================================================================
// INPUTS
// =============================================================================

/// Everything a valuation is a function of.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationInputs {
    /// Statements and market snapshot.
    pub company: CompanyData,
    /// User-adjustable scalars.
    pub assumptions: ValuationAssumptions,
}

impl ValuationInputs {
    /// Bundles a company with assumptions.
    pub fn new(company: CompanyData, assumptions: ValuationAssumptions) -> Self {
        Self {
            company,
            assumptions,
        }
    }
}

/// One revision of the inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum InputChange {
    /// Replace the whole company snapshot.
    Company(Box<CompanyData>),
    /// Replace the statement series.
    Statements(FinancialStatements),
    /// Replace the market quote.
    Quote(Quote),
    /// Set the forecast horizon in years.
    Horizon(u32),
    /// Set or clear the manual WACC (%).
    WaccOverride(Option<f64>),
    /// Set or clear the manual growth rate (%).
    GrowthOverride(Option<f64>),
    /// Set or clear the exit multiple override.
    ExitMultiple(Option<f64>),
    /// Replace every assumption.
    Assumptions(Box<ValuationAssumptions>),
}

impl InputChange {
    /// Short name of the input that changed.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Company(_) => "company",
            Self::Statements(_) => "statements",
            Self::Quote(_) => "quote",
            Self::Horizon(_) => "horizon",
            Self::WaccOverride(_) => "wacc_override",
            Self::GrowthOverride(_) => "growth_override",
            Self::ExitMultiple(_) => "exit_multiple",
            Self::Assumptions(_) => "assumptions",
        }
    }

    /// Applies the change to `inputs`.
    pub fn apply(self, inputs: &mut ValuationInputs) {
        match self {
            Self::Company(company) => inputs.company = *company,
            Self::Statements(statements) => inputs.company.statements = statements,
            Self::Quote(quote) => inputs.company.quote = quote,
            Self::Horizon(years) => inputs.assumptions.horizon_years = years,
            Self::WaccOverride(pct) => inputs.assumptions.wacc_override_pct = pct,
            Self::GrowthOverride(pct) => inputs.assumptions.growth_override_pct = pct,
            Self::ExitMultiple(multiple) => inputs.assumptions.exit_multiple = multiple,
            Self::Assumptions(assumptions) => inputs.assumptions = *assumptions,
        }
    }
}

// =============================================================================
// STAGES
// =============================================================================

/// A node of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Revenue growth forecast.
    Growth,
    /// Cost of capital.
    Capital,
    /// Discounted cash flow.
    Dcf,
    /// Sustainable growth cross-check.
    Sustainable,
}

impl Stage {
    /// Every stage in evaluation order.
    pub const ALL: [Stage; 4] = [Stage::Growth, Stage::Capital, Stage::Sustainable, Stage::Dcf];

    /// Stages whose outputs this stage reads.
    pub fn dependencies(&self) -> &'static [Stage] {
        match self {
            Self::Dcf => &[Stage::Growth, Stage::Capital],
            Self::Growth | Self::Capital | Self::Sustainable => &[],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Growth => "growth",
            Self::Capital => "capital",
            Self::Dcf => "dcf",
            Self::Sustainable => "sustainable",
        };
        f.write_str(name)
    }
}

/// Revenue growth, replaced by the manual override when one is set.
pub fn growth_stage(inputs: &ValuationInputs) -> GrowthEstimate {
    let assumptions = &inputs.assumptions;
    let estimate = assumptions
        .growth_forecaster()
        .forecast_statements(&inputs.company.statements);
    match assumptions.growth_override() {
        Some(rate) => {
            debug!(forecast = %estimate.rate, override_rate = %rate, "growth override applied");
            estimate.overridden(rate)
        }
        None => estimate,
    }
}

/// Cost of capital breakdown.
pub fn capital_stage(inputs: &ValuationInputs) -> ValuationResult<CostOfCapitalBreakdown> {
    CapitalCostCalculator::new(inputs.assumptions.capital_assumptions()).calculate(&inputs.company)
}

/// The WACC the DCF discounts at: the override, else the computed one.
pub fn effective_wacc(
    inputs: &ValuationInputs,
    capital: &ValuationResult<CostOfCapitalBreakdown>,
) -> ValuationResult<Rate> {
    if let Some(rate) = inputs.assumptions.wacc_override() {
        return Ok(rate);
    }
    capital.as_ref().map(|c| c.wacc).map_err(Clone::clone)
}

/// DCF at the given growth and capital results.
pub fn dcf_stage(
    inputs: &ValuationInputs,
    growth: &GrowthEstimate,
    capital: &ValuationResult<CostOfCapitalBreakdown>,
) -> ValuationResult<DcfValuation> {
    let wacc = effective_wacc(inputs, capital)?;
    DcfProjector::new(inputs.assumptions.dcf_assumptions()).project(
        &inputs.company,
        growth.rate,
        wacc,
    )
}

/// Sustainable growth cross-check.
pub fn sustainable_stage(inputs: &ValuationInputs) -> ValuationResult<SustainableGrowth> {
    inputs
        .assumptions
        .sustainable_growth_estimator()
        .estimate(&inputs.company.statements)
}

// =============================================================================
// OUTPUTS
// =============================================================================

/// Every stage's result for one input revision.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationOutputs {
    /// Growth estimate (never fails).
    pub growth: GrowthEstimate,
    /// Cost of capital.
    pub capital: ValuationResult<CostOfCapitalBreakdown>,
    /// DCF valuation.
    pub dcf: ValuationResult<DcfValuation>,
    /// Sustainable growth cross-check.
    pub sustainable: ValuationResult<SustainableGrowth>,
}

impl ValuationOutputs {
    /// WACC used by the DCF, if it ran.
    pub fn wacc(&self) -> Option<Rate> {
        self.dcf.as_ref().ok().map(|d| d.wacc)
    }

    /// Intrinsic value per share, if the DCF ran.
    pub fn intrinsic_value_per_share(&self) -> Option<f64> {
        self.dcf.as_ref().ok().map(DcfValuation::intrinsic_value_per_share)
    }

    /// The DCF valuation, or the reason it could not be produced.
    pub fn require_dcf(&self) -> EngineResult<&DcfValuation> {
        self.dcf
            .as_ref()
            .map_err(|e| EngineError::Valuation(e.clone()))
    }
}

fn has_statements(statements: &FinancialStatements) -> bool {
    !(statements.income_statements.is_empty()
        && statements.balance_sheets.is_empty()
        && statements.cash_flow_statements.is_empty())
}

/// Computes every stage from scratch.
///
/// # Errors
///
/// Returns an error if the assumptions are invalid or the company has no
/// statements at all. Failures of individual stages are reported inside
/// [`ValuationOutputs`].
pub fn compute(inputs: &ValuationInputs) -> EngineResult<ValuationOutputs> {
    inputs.assumptions.validate_or_error()?;

    let symbol = &inputs.company.symbol;
    if !has_statements(&inputs.company.statements) {
        warn!(%symbol, "no statement data");
        return Err(EngineError::NoStatementData {
            symbol: symbol.clone(),
        });
    }

    let growth = growth_stage(inputs);
    let capital = capital_stage(inputs);
    let sustainable = sustainable_stage(inputs);
    let dcf = dcf_stage(inputs, &growth, &capital);

    match &dcf {
        Ok(valuation) => info!(
            %symbol,
            growth = %growth.rate,
            wacc = %valuation.wacc,
            value_per_share = valuation.intrinsic_value_per_share(),
            "valuation computed"
        ),
        Err(e) => warn!(%symbol, error = %e, "dcf unavailable"),
    }

    Ok(ValuationOutputs {
        growth,
        capital,
        dcf,
        sustainable,
    })
}
