//! Forward revenue growth forecasting.
//!
//! Two models are fitted independently on the revenue history and their
//! annualized growth rates are averaged:
//!
//! - **Holt**: double exponential smoothing with `(α, β)` chosen by a
//!   two-stage grid search minimizing one-step-ahead MSE
//! - **Regression**: ordinary least squares against the period index
//!
//! When every observation is strictly positive both models are fitted on log
//! revenue, so a series growing at a constant rate is extrapolated at that rate.
//! Otherwise they are fitted on raw revenue. In both cases the Holt objective is
//! measured on the revenue scale.
//!
//! The blended rate is clamped to `[-20%, +50%]`. Fewer than three observations,
//! or two unusable models, yield the fallback rate instead.

use intrinsic_core::{FinancialStatements, Rate};
use intrinsic_math::optimization::{two_stage_grid_search, TwoStageConfig};
use intrinsic_math::regression::LinearRegression;
use intrinsic_math::smoothing::HoltLinear;
use intrinsic_math::stats::ZERO_TOLERANCE;
use serde::Serialize;

/// Minimum number of revenue observations needed to fit the models.
pub const MIN_OBSERVATIONS: usize = 3;

/// Lower guardrail on the blended growth rate.
pub const GROWTH_FLOOR: Rate = Rate::from_decimal(-0.20);

/// Upper guardrail on the blended growth rate.
pub const GROWTH_CAP: Rate = Rate::from_decimal(0.50);

/// Growth rate used when the history is too short to fit.
pub const DEFAULT_GROWTH: Rate = Rate::from_decimal(0.05);

/// How a [`GrowthEstimate`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthMethod {
    /// Mean of the fitted sub-models.
    Blended,
    /// Fixed default, history too short or degenerate.
    Fallback,
    /// Supplied by the user.
    Override,
}

/// Scale on which the models were fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelScale {
    /// Natural log of revenue.
    Log,
    /// Revenue as reported.
    Linear,
}

impl ModelScale {
    fn for_series(revenue: &[f64]) -> Self {
        if revenue.iter().all(|&r| r > 0.0) {
            Self::Log
        } else {
            Self::Linear
        }
    }

    fn apply(self, value: f64) -> f64 {
        match self {
            Self::Log => value.ln(),
            Self::Linear => value,
        }
    }

    fn invert(self, value: f64) -> f64 {
        match self {
            Self::Log => value.exp(),
            Self::Linear => value,
        }
    }
}

/// Fitted Holt model and its implied growth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoltEstimate {
    /// Selected level smoothing parameter.
    pub alpha: f64,
    /// Selected trend smoothing parameter.
    pub beta: f64,
    /// One-step-ahead MSE after refinement, on the revenue scale.
    pub mse: f64,
    /// One-step-ahead MSE at the coarse optimum.
    pub coarse_mse: f64,
    /// Revenue forecast at the horizon.
    pub forecast: f64,
    /// Annualized growth implied by the forecast.
    pub growth: Option<Rate>,
}

/// Fitted regression line and its implied growth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionEstimate {
    /// Slope per period on the fitting scale.
    pub slope: f64,
    /// Intercept on the fitting scale.
    pub intercept: f64,
    /// Coefficient of determination on the fitting scale.
    pub r_squared: f64,
    /// Revenue forecast at the horizon.
    pub forecast: f64,
    /// Annualized growth implied by the forecast.
    pub growth: Option<Rate>,
}

/// Forward annual revenue growth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthEstimate {
    /// Growth rate to use downstream.
    pub rate: Rate,
    /// How `rate` was produced.
    pub method: GrowthMethod,
    /// Fitting scale, when models were fitted.
    pub scale: Option<ModelScale>,
    /// Holt sub-model.
    pub holt: Option<HoltEstimate>,
    /// Regression sub-model.
    pub regression: Option<RegressionEstimate>,
    /// Number of revenue observations used.
    pub observations: usize,
    /// Forecast horizon in years.
    pub horizon: u32,
}

impl GrowthEstimate {
    /// An estimate that is just the fallback rate.
    #[must_use]
    pub fn fallback(rate: Rate, observations: usize, horizon: u32) -> Self {
        Self {
            rate,
            method: GrowthMethod::Fallback,
            scale: None,
            holt: None,
            regression: None,
            observations,
            horizon,
        }
    }

    /// Replaces the rate with a user override, keeping the fitted sub-models
    /// for reference.
    #[must_use]
    pub fn overridden(mut self, rate: Rate) -> Self {
        self.rate = rate;
        self.method = GrowthMethod::Override;
        self
    }

    /// Holt growth, if that model produced one.
    pub fn holt_growth(&self) -> Option<Rate> {
        self.holt.and_then(|h| h.growth)
    }

    /// Regression growth, if that model produced one.
    pub fn regression_growth(&self) -> Option<Rate> {
        self.regression.and_then(|r| r.growth)
    }
}

/// Blends Holt and regression forecasts into one growth rate.
///
/// # Example
///
/// ```rust
/// use intrinsic_valuation::growth::{GrowthForecaster, GrowthMethod};
///
/// let estimate = GrowthForecaster::new(1).forecast(&[100.0, 110.0, 121.0, 133.1]);
/// assert_eq!(estimate.method, GrowthMethod::Blended);
/// assert!((estimate.rate.as_percent() - 10.0).abs() < 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthForecaster {
    horizon: u32,
    fallback: Rate,
    search: TwoStageConfig,
}

impl Default for GrowthForecaster {
    fn default() -> Self {
        Self::new(1)
    }
}

impl GrowthForecaster {
    /// Creates a forecaster for the given horizon in years (at least 1).
    #[must_use]
    pub fn new(horizon: u32) -> Self {
        Self {
            horizon: horizon.max(1),
            fallback: DEFAULT_GROWTH,
            search: TwoStageConfig::default(),
        }
    }

    /// Sets the rate returned when the models cannot be fitted.
    #[must_use]
    pub fn with_fallback(mut self, rate: Rate) -> Self {
        self.fallback = rate;
        self
    }

    /// Sets the Holt hyperparameter search grid.
    #[must_use]
    pub fn with_search(mut self, search: TwoStageConfig) -> Self {
        self.search = search;
        self
    }

    /// Forecast horizon in years.
    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    /// Forecasts from the income statements' revenue, oldest first.
    pub fn forecast_statements(&self, statements: &FinancialStatements) -> GrowthEstimate {
        self.forecast(&statements.revenue_history())
    }

    /// Forecasts from annual revenue, oldest first.
    ///
    /// Non-finite observations are dropped.
    pub fn forecast(&self, revenue: &[f64]) -> GrowthEstimate {
        let revenue: Vec<f64> = revenue.iter().copied().filter(|r| r.is_finite()).collect();
        let n = revenue.len();

        if n < MIN_OBSERVATIONS {
            log::info!(
                "growth: {} revenue observations, using fallback {}",
                n,
                self.fallback
            );
            return GrowthEstimate::fallback(self.fallback, n, self.horizon);
        }

        let scale = ModelScale::for_series(&revenue);
        let transformed: Vec<f64> = revenue.iter().map(|&r| scale.apply(r)).collect();
        let last = revenue[n - 1];

        let holt = self.fit_holt(&revenue, &transformed, scale, last);
        let regression = self.fit_regression(&transformed, scale, last);

        let growths: Vec<f64> = [
            holt.and_then(|h| h.growth),
            regression.and_then(|r| r.growth),
        ]
        .into_iter()
        .flatten()
        .map(Rate::as_decimal)
        .collect();

        if growths.is_empty() {
            log::warn!(
                "growth: neither model produced a finite rate, using fallback {}",
                self.fallback
            );
            let mut estimate = GrowthEstimate::fallback(self.fallback, n, self.horizon);
            estimate.scale = Some(scale);
            estimate.holt = holt;
            estimate.regression = regression;
            return estimate;
        }

        let blended = growths.iter().sum::<f64>() / growths.len() as f64;
        let rate = Rate::from_decimal(blended).clamp(GROWTH_FLOOR, GROWTH_CAP);

        log::debug!(
            "growth: {:?} scale, holt {:?}, regression {:?}, blended {}",
            scale,
            holt.and_then(|h| h.growth),
            regression.and_then(|r| r.growth),
            rate
        );

        GrowthEstimate {
            rate,
            method: GrowthMethod::Blended,
            scale: Some(scale),
            holt,
            regression,
            observations: n,
            horizon: self.horizon,
        }
    }

    fn fit_holt(
        &self,
        revenue: &[f64],
        transformed: &[f64],
        scale: ModelScale,
        last: f64,
    ) -> Option<HoltEstimate> {
        let objective = |alpha: f64, beta: f64| {
            HoltLinear::new(alpha, beta)
                .and_then(|model| model.fit(transformed))
                .map_or(f64::NAN, |fit| fit.mse_by(revenue, |p| scale.invert(p)))
        };

        let search = match two_stage_grid_search(objective, &self.search) {
            Ok(search) => search,
            Err(e) => {
                log::debug!("growth: holt search failed: {}", e);
                return None;
            }
        };

        let fit = HoltLinear::new(search.refined.x, search.refined.y)
            .and_then(|model| model.fit(transformed))
            .ok()?;
        let forecast = scale.invert(fit.forecast(self.horizon));

        Some(HoltEstimate {
            alpha: search.refined.x,
            beta: search.refined.y,
            mse: search.refined.objective,
            coarse_mse: search.coarse.objective,
            forecast,
            growth: annualized_growth(forecast, last, self.horizon),
        })
    }

    fn fit_regression(
        &self,
        transformed: &[f64],
        scale: ModelScale,
        last: f64,
    ) -> Option<RegressionEstimate> {
        let line = match LinearRegression::fit_indexed(transformed) {
            Ok(line) => line,
            Err(e) => {
                log::debug!("growth: regression failed: {}", e);
                return None;
            }
        };

        let index = (transformed.len() - 1) as f64 + f64::from(self.horizon);
        let forecast = scale.invert(line.predict(index));

        Some(RegressionEstimate {
            slope: line.slope,
            intercept: line.intercept,
            r_squared: line.r_squared,
            forecast,
            growth: annualized_growth(forecast, last, self.horizon),
        })
    }
}

/// Annual rate that takes `last` to `forecast` over `horizon` years.
///
/// Compounds when the ratio is positive; otherwise spreads the change
/// linearly, since a fractional power of a negative ratio is undefined.
pub fn annualized_growth(forecast: f64, last: f64, horizon: u32) -> Option<Rate> {
    if !forecast.is_finite() || !last.is_finite() || last.abs() < ZERO_TOLERANCE {
        return None;
    }
    let years = f64::from(horizon.max(1));
    let ratio = forecast / last;
    let growth = if ratio > 0.0 {
        ratio.powf(1.0 / years) - 1.0
    } else {
        (ratio - 1.0) / years
    };
    growth.is_finite().then(|| Rate::from_decimal(growth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_growth_recovered_by_both_models() {
        let estimate = GrowthForecaster::new(1).forecast(&[100.0, 110.0, 121.0, 133.1]);

        assert_eq!(estimate.method, GrowthMethod::Blended);
        assert_eq!(estimate.scale, Some(ModelScale::Log));
        assert_relative_eq!(estimate.holt_growth().unwrap().as_decimal(), 0.10, epsilon = 5e-3);
        assert_relative_eq!(
            estimate.regression_growth().unwrap().as_decimal(),
            0.10,
            epsilon = 5e-3
        );
        assert_relative_eq!(estimate.rate.as_decimal(), 0.10, epsilon = 5e-3);
    }

    #[test]
    fn test_multi_year_horizon_is_annualized() {
        let estimate = GrowthForecaster::new(5).forecast(&[100.0, 110.0, 121.0, 133.1]);
        assert_relative_eq!(estimate.rate.as_decimal(), 0.10, epsilon = 5e-3);
        assert_eq!(estimate.horizon, 5);
    }

    #[test]
    fn test_short_history_falls_back() {
        let estimate = GrowthForecaster::new(1).forecast(&[100.0, 120.0]);
        assert_eq!(estimate.method, GrowthMethod::Fallback);
        assert_eq!(estimate.rate, DEFAULT_GROWTH);
        assert!(estimate.holt.is_none());

        let estimate = GrowthForecaster::new(1)
            .with_fallback(Rate::from_percent(3.0))
            .forecast(&[]);
        assert_relative_eq!(estimate.rate.as_percent(), 3.0);
    }

    #[test]
    fn test_explosive_growth_is_capped() {
        let estimate = GrowthForecaster::new(1).forecast(&[1.0, 10.0, 100.0, 1000.0]);
        assert_eq!(estimate.rate, GROWTH_CAP);
    }

    #[test]
    fn test_collapse_is_floored() {
        let estimate = GrowthForecaster::new(1).forecast(&[1000.0, 100.0, 10.0, 1.0]);
        assert_eq!(estimate.rate, GROWTH_FLOOR);
    }

    #[test]
    fn test_non_positive_revenue_uses_linear_scale() {
        let estimate = GrowthForecaster::new(1).forecast(&[-50.0, 0.0, 50.0, 100.0]);
        assert_eq!(estimate.scale, Some(ModelScale::Linear));
        // Regression predicts 150 from a last value of 100.
        assert_relative_eq!(
            estimate.regression_growth().unwrap().as_decimal(),
            0.5,
            epsilon = 1e-9
        );
        assert!(estimate.rate.as_decimal() <= GROWTH_CAP.as_decimal());
    }

    #[test]
    fn test_holt_refinement_not_worse_than_coarse() {
        let estimate = GrowthForecaster::new(1).forecast(&[90.0, 130.0, 100.0, 160.0, 150.0]);
        let holt = estimate.holt.unwrap();
        assert!(holt.mse <= holt.coarse_mse);
        assert!(holt.alpha > 0.0 && holt.alpha < 1.0);
        assert!(holt.beta > 0.0 && holt.beta < 1.0);
    }

    #[test]
    fn test_override_keeps_models() {
        let estimate = GrowthForecaster::new(1)
            .forecast(&[100.0, 110.0, 121.0])
            .overridden(Rate::from_percent(7.0));
        assert_eq!(estimate.method, GrowthMethod::Override);
        assert_relative_eq!(estimate.rate.as_percent(), 7.0);
        assert!(estimate.regression.is_some());
    }

    #[test]
    fn test_annualized_growth() {
        assert_relative_eq!(
            annualized_growth(121.0, 100.0, 2).unwrap().as_decimal(),
            0.1,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            annualized_growth(-100.0, 100.0, 2).unwrap().as_decimal(),
            -1.0,
            epsilon = 1e-12
        );
        assert!(annualized_growth(100.0, 0.0, 1).is_none());
        assert!(annualized_growth(f64::INFINITY, 1.0, 1).is_none());
    }
}
