//! WACC × exit multiple sensitivity of the per-share value.

use intrinsic_core::Rate;
use serde::Serialize;

use crate::dcf::DcfValuation;
use crate::error::{ValuationError, ValuationResult};

/// Grid shape, centered on the valuation's own WACC and exit multiple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensitivityConfig {
    /// Spacing of the WACC axis.
    pub wacc_step: Rate,
    /// Points on each side of the center WACC.
    pub wacc_steps: usize,
    /// Spacing of the multiple axis.
    pub multiple_step: f64,
    /// Points on each side of the center multiple.
    pub multiple_steps: usize,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            wacc_step: Rate::from_percent(1.0),
            wacc_steps: 2,
            multiple_step: 1.0,
            multiple_steps: 2,
        }
    }
}

/// Per-share values over the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityGrid {
    /// WACC axis (rows).
    pub waccs: Vec<Rate>,
    /// Exit multiple axis (columns).
    pub multiples: Vec<f64>,
    /// `values[i][j]` at `waccs[i]`, `multiples[j]`; `None` where undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

impl SensitivityGrid {
    /// Value at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied().flatten()
    }
}

/// Reprices `valuation` over a grid of WACCs and exit multiples.
///
/// The center multiple is the valuation's exit multiple, or
/// `fallback_multiple` when the valuation used perpetuity growth. Multiples
/// that would be non-positive are dropped from the axis.
///
/// # Errors
///
/// Returns an error if the steps are not positive.
pub fn sensitivity_grid(
    valuation: &DcfValuation,
    config: &SensitivityConfig,
    fallback_multiple: f64,
) -> ValuationResult<SensitivityGrid> {
    if !(config.wacc_step.as_decimal() > 0.0) {
        return Err(ValuationError::invalid_assumption(
            "wacc_step",
            "must be positive",
        ));
    }
    if !(config.multiple_step > 0.0) {
        return Err(ValuationError::invalid_assumption(
            "multiple_step",
            "must be positive",
        ));
    }

    let center_multiple = valuation.terminal.exit_multiple.unwrap_or(fallback_multiple);
    let waccs = axis(valuation.wacc.as_decimal(), config.wacc_step.as_decimal(), config.wacc_steps)
        .into_iter()
        .map(Rate::from_decimal)
        .collect::<Vec<_>>();
    let multiples: Vec<f64> = axis(center_multiple, config.multiple_step, config.multiple_steps)
        .into_iter()
        .filter(|m| *m > 0.0)
        .collect();

    let values = waccs
        .iter()
        .map(|&wacc| {
            multiples
                .iter()
                .map(|&multiple| valuation.reprice(wacc, multiple))
                .collect()
        })
        .collect();

    Ok(SensitivityGrid {
        waccs,
        multiples,
        values,
    })
}

fn axis(center: f64, step: f64, steps: usize) -> Vec<f64> {
    let steps = steps as i64;
    (-steps..=steps).map(|k| center + k as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcf::{DcfAssumptions, DcfProjector};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use intrinsic_core::types::{
        BalanceSheet, CashFlowStatement, IncomeStatement, Quote, StatementSeries,
    };
    use intrinsic_core::CompanyData;

    fn valuation() -> DcfValuation {
        let date = |y| NaiveDate::from_ymd_opt(y, 12, 31).unwrap();
        let mut data = CompanyData::new("GRID");
        data.quote = Quote::new(10.0, 1000.0).with_shares_outstanding(100.0);
        let incomes = [2022, 2023]
            .into_iter()
            .map(|y| {
                let mut s = IncomeStatement::new(date(y), 500.0);
                s.ebitda = Some(100.0);
                s.ebit = Some(80.0);
                s.income_before_tax = 80.0;
                s.income_tax_expense = 20.0;
                s
            })
            .collect();
        data.statements.income_statements = StatementSeries::new(incomes).unwrap();
        data.statements.balance_sheets =
            StatementSeries::new(vec![BalanceSheet::new(date(2023))]).unwrap();
        data.statements.cash_flow_statements =
            StatementSeries::new(vec![CashFlowStatement::new(date(2023))]).unwrap();

        DcfProjector::new(DcfAssumptions {
            exit_multiple: Some(8.0),
            ..DcfAssumptions::default()
        })
        .project(&data, Rate::from_percent(3.0), Rate::from_percent(9.0))
        .unwrap()
    }

    #[test]
    fn test_center_cell_matches_valuation() {
        let valuation = valuation();
        let grid = sensitivity_grid(&valuation, &SensitivityConfig::default(), 10.0).unwrap();

        assert_eq!(grid.waccs.len(), 5);
        assert_eq!(grid.multiples, vec![6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_relative_eq!(
            grid.get(2, 2).unwrap(),
            valuation.intrinsic_value_per_share(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_monotone_in_both_axes() {
        let grid = sensitivity_grid(&valuation(), &SensitivityConfig::default(), 10.0).unwrap();
        for i in 0..grid.waccs.len() {
            for j in 1..grid.multiples.len() {
                assert!(grid.get(i, j).unwrap() > grid.get(i, j - 1).unwrap());
            }
        }
        for j in 0..grid.multiples.len() {
            for i in 1..grid.waccs.len() {
                assert!(grid.get(i, j).unwrap() < grid.get(i - 1, j).unwrap());
            }
        }
    }

    #[test]
    fn test_non_positive_multiples_dropped() {
        let config = SensitivityConfig {
            multiple_step: 5.0,
            ..SensitivityConfig::default()
        };
        let grid = sensitivity_grid(&valuation(), &config, 10.0).unwrap();
        assert_eq!(grid.multiples, vec![3.0, 8.0, 13.0, 18.0]);
    }

    #[test]
    fn test_invalid_steps() {
        let config = SensitivityConfig {
            multiple_step: 0.0,
            ..SensitivityConfig::default()
        };
        assert!(sensitivity_grid(&valuation(), &config, 10.0).is_err());
    }
}
