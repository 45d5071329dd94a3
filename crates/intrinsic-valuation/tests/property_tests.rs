//! Property tests for the valuation engine.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use proptest::prelude::*;

use intrinsic_core::types::{
    BalanceSheet, CashFlowStatement, IncomeStatement, Quote, StatementSeries,
};
use intrinsic_core::{CompanyData, Rate};
use intrinsic_math::optimization::{two_stage_grid_search, TwoStageConfig};
use intrinsic_math::smoothing::HoltLinear;
use intrinsic_valuation::capital::{weighted_cost, CapitalStructure, SyntheticRatingTable};
use intrinsic_valuation::dcf::{DcfAssumptions, DcfProjector};
use intrinsic_valuation::growth::{GrowthForecaster, GROWTH_CAP, GROWTH_FLOOR};

fn date(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 12, 31).unwrap()
}

fn company(revenues: &[f64], margin: f64) -> CompanyData {
    let years: Vec<i32> = (0..revenues.len() as i32).map(|i| 2015 + i).collect();
    let mut data = CompanyData::new("PROP");
    data.quote = Quote::new(25.0, 2500.0).with_shares_outstanding(100.0);

    let incomes = years
        .iter()
        .zip(revenues)
        .map(|(&y, &revenue)| {
            let mut s = IncomeStatement::new(date(y), revenue);
            s.ebitda = Some(revenue * margin);
            s.depreciation_and_amortization = Some(revenue * 0.04);
            s.income_before_tax = revenue * margin * 0.8;
            s.income_tax_expense = revenue * margin * 0.8 * 0.21;
            s
        })
        .collect();
    let balances = years
        .iter()
        .zip(revenues)
        .map(|(&y, &revenue)| {
            let mut b = BalanceSheet::new(date(y));
            b.total_current_assets = revenue * 0.4;
            b.total_current_liabilities = revenue * 0.25;
            b.total_debt = Some(400.0);
            b.cash_and_cash_equivalents = 150.0;
            b
        })
        .collect();
    let cash_flows = years
        .iter()
        .zip(revenues)
        .map(|(&y, &revenue)| {
            let mut c = CashFlowStatement::new(date(y));
            c.capital_expenditure = -revenue * 0.05;
            c
        })
        .collect();

    data.statements.income_statements = StatementSeries::new(incomes).unwrap();
    data.statements.balance_sheets = StatementSeries::new(balances).unwrap();
    data.statements.cash_flow_statements = StatementSeries::new(cash_flows).unwrap();
    data
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn blended_growth_within_guardrails(
        revenue in prop::collection::vec(-1_000.0..10_000.0_f64, 3..10),
        horizon in 1u32..=10,
    ) {
        let estimate = GrowthForecaster::new(horizon).forecast(&revenue);
        prop_assert!(estimate.rate >= GROWTH_FLOOR);
        prop_assert!(estimate.rate <= GROWTH_CAP);
        let pct = estimate.rate.as_percent();
        prop_assert!((-20.0 - 1e-9..=50.0 + 1e-9).contains(&pct));
    }

    #[test]
    fn holt_search_stays_inside_unit_square(
        revenue in prop::collection::vec(1.0..1_000.0_f64, 3..8),
    ) {
        let objective = |alpha: f64, beta: f64| {
            HoltLinear::new(alpha, beta)
                .and_then(|m| m.fit(&revenue))
                .map_or(f64::NAN, |fit| fit.mse(&revenue))
        };
        let result = two_stage_grid_search(objective, &TwoStageConfig::default()).unwrap();
        for point in [result.coarse, result.refined] {
            prop_assert!(point.x > 0.0 && point.x < 1.0);
            prop_assert!(point.y > 0.0 && point.y < 1.0);
        }
        prop_assert!(result.refined.objective <= result.coarse.objective);
    }

    #[test]
    fn capital_weights_sum_to_one(
        debt in 0.0..1e9_f64,
        equity in 0.0..1e9_f64,
        preferred in 0.0..1e9_f64,
    ) {
        let s = CapitalStructure::from_values(debt, equity, preferred);
        prop_assert!((s.total() - 1.0).abs() <= 1e-9);
        prop_assert!(s.debt_weight >= 0.0);
        prop_assert!(s.equity_weight >= 0.0);
        prop_assert!(s.preferred_weight >= 0.0);
    }

    #[test]
    fn every_coverage_maps_to_exactly_one_band(icr in prop::num::f64::ANY) {
        let table = SyntheticRatingTable::standard();
        let matching = table.bands().iter().filter(|b| b.contains(icr)).count();
        if icr.is_nan() || icr == f64::NEG_INFINITY {
            prop_assert_eq!(matching, 0);
            prop_assert_eq!(table.lookup(icr).rating, table.bands()[0].rating);
        } else {
            prop_assert_eq!(matching, 1);
            prop_assert!(table.lookup(icr).contains(icr));
        }
    }

    #[test]
    fn wacc_monotone_in_component_costs(
        debt in 0.0..1e6_f64,
        equity in 0.0..1e6_f64,
        preferred in 0.0..1e6_f64,
        kd in 0.0..0.2_f64,
        ke in 0.0..0.3_f64,
        kp in 0.0..0.15_f64,
        bump in 0.0..0.1_f64,
    ) {
        let s = CapitalStructure::from_values(debt, equity, preferred);
        let wacc = |kd: f64, ke: f64| {
            weighted_cost(
                &s,
                Rate::from_decimal(kd),
                Rate::from_decimal(ke),
                Rate::from_decimal(kp),
            )
        };
        let base = wacc(kd, ke);
        let more_equity = wacc(kd, ke + bump);
        let more_debt = wacc(kd + bump, ke);
        prop_assert!(more_equity >= base);
        prop_assert!(more_debt >= base);
    }

    #[test]
    fn discounted_fcf_identity(
        growth_pct in -10.0..25.0_f64,
        wacc_pct in 2.0..20.0_f64,
        years in 2usize..=5,
        horizon in 1u32..=10,
    ) {
        let revenues: Vec<f64> = (0..years).map(|i| 1_000.0 * 1.05_f64.powi(i as i32)).collect();
        let data = company(&revenues, 0.22);
        let wacc = Rate::from_percent(wacc_pct);
        let valuation = DcfProjector::new(DcfAssumptions {
            horizon_years: horizon,
            ..DcfAssumptions::default()
        })
        .project(&data, Rate::from_percent(growth_pct), wacc)
        .unwrap();

        let first_offset = (years - 1) as f64;
        for (j, row) in valuation.projection.projected().enumerate() {
            let t = first_offset + (j + 1) as f64;
            prop_assert!((row.discount_period - t).abs() < 1e-12);
            let expected = row.unlevered_fcf.unwrap() / (1.0 + wacc.as_decimal()).powf(t);
            let actual = row.discounted_fcf.unwrap();
            prop_assert!((actual - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
        prop_assert_eq!(valuation.projection.projected().count(), horizon as usize);
        for row in valuation.projection.historical() {
            prop_assert_eq!(row.discount_factor, 1.0);
            prop_assert!(row.discounted_fcf.is_none());
        }
    }
}

#[test]
fn constant_growth_example() {
    let estimate = GrowthForecaster::new(1).forecast(&[100.0, 110.0, 121.0, 133.1]);
    assert_relative_eq!(estimate.holt_growth().unwrap().as_percent(), 10.0, epsilon = 0.5);
    assert_relative_eq!(estimate.regression_growth().unwrap().as_percent(), 10.0, epsilon = 0.5);
    assert_relative_eq!(estimate.rate.as_percent(), 10.0, epsilon = 0.5);
}

#[test]
fn all_equity_wacc_is_cost_of_equity() {
    let s = CapitalStructure::from_values(0.0, 1000.0, 0.0);
    assert_eq!(s.debt_weight, 0.0);
    assert_eq!(s.equity_weight, 1.0);
    assert_eq!(s.preferred_weight, 0.0);

    let ke = Rate::from_percent(10.85);
    assert_eq!(weighted_cost(&s, Rate::from_percent(4.5), ke, Rate::ZERO), ke);
}

#[test]
fn one_income_statement_is_insufficient_data() {
    let data = company(&[1_000.0], 0.2);
    let err = DcfProjector::default()
        .project(&data, Rate::from_percent(5.0), Rate::from_percent(8.0))
        .unwrap_err();
    assert!(err.is_insufficient_data());
}
