//! Holt's linear-trend exponential smoothing.
//!
//! State is a `level` and a `trend`, initialized from the first two
//! observations:
//!
//! ```text
//! level₀ = y₀
//! trend₀ = y₁ − y₀
//! ```
//!
//! and updated for every subsequent observation `y`:
//!
//! ```text
//! level' = α·y + (1 − α)·(level + trend)
//! trend' = β·(level' − level) + (1 − β)·trend
//! ```
//!
//! The one-step-ahead prediction made before observing `yₜ` is
//! `level + trend`; the `h`-step forecast after the last observation is
//! `level + h·trend`.

use crate::error::{MathError, MathResult};

/// Holt's linear-trend model with fixed smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoltLinear {
    alpha: f64,
    beta: f64,
}

impl HoltLinear {
    /// Creates a model. Both parameters must lie strictly inside `(0, 1)`.
    pub fn new(alpha: f64, beta: f64) -> MathResult<Self> {
        for (name, value) in [("alpha", alpha), ("beta", beta)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(MathError::out_of_range(name, value, 0.0, 1.0));
            }
        }
        Ok(Self { alpha, beta })
    }

    /// Level smoothing parameter.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Trend smoothing parameter.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Runs the recursion over `series`.
    ///
    /// Requires at least two observations.
    pub fn fit(&self, series: &[f64]) -> MathResult<HoltFit> {
        if series.len() < 2 {
            return Err(MathError::insufficient_data(2, series.len()));
        }

        let mut level = series[0];
        let mut trend = series[1] - series[0];
        let mut predictions = Vec::with_capacity(series.len() - 1);

        for &observed in &series[1..] {
            predictions.push(level + trend);
            let previous_level = level;
            level = self.alpha * observed + (1.0 - self.alpha) * (level + trend);
            trend = self.beta * (level - previous_level) + (1.0 - self.beta) * trend;
        }

        Ok(HoltFit {
            level,
            trend,
            predictions,
        })
    }
}

/// Final state and one-step-ahead predictions of a fitted [`HoltLinear`].
#[derive(Debug, Clone, PartialEq)]
pub struct HoltFit {
    level: f64,
    trend: f64,
    predictions: Vec<f64>,
}

impl HoltFit {
    /// Level after the last observation.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Trend after the last observation.
    pub fn trend(&self) -> f64 {
        self.trend
    }

    /// Predictions for observations `1..n`, each made before seeing that observation.
    pub fn predictions(&self) -> &[f64] {
        &self.predictions
    }

    /// Forecast `horizon` steps after the last observation.
    pub fn forecast(&self, horizon: u32) -> f64 {
        self.level + f64::from(horizon) * self.trend
    }

    /// Mean squared one-step-ahead error against `series`.
    ///
    /// `series` must be the series the model was fitted on.
    pub fn mse(&self, series: &[f64]) -> f64 {
        self.mse_by(series, |p| p)
    }

    /// Mean squared error after mapping predictions through `inverse`.
    ///
    /// Used when the model was fitted on a transformed series (for example
    /// log values) but errors should be measured on the original scale:
    /// `actual` is the untransformed series.
    pub fn mse_by<F>(&self, actual: &[f64], inverse: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let n = self.predictions.len();
        if n == 0 || actual.len() != n + 1 {
            return f64::NAN;
        }
        let sum: f64 = self
            .predictions
            .iter()
            .zip(&actual[1..])
            .map(|(&p, &y)| (y - inverse(p)).powi(2))
            .sum();
        sum / n as f64
    }
}
