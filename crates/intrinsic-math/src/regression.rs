//! Ordinary least squares with a single regressor.

use crate::error::{MathError, MathResult};

/// Fitted line `y = intercept + slope·x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRegression {
    /// Slope coefficient.
    pub slope: f64,
    /// Intercept.
    pub intercept: f64,
    /// Coefficient of determination; `1.0` when `y` is constant and fitted exactly.
    pub r_squared: f64,
    /// Number of observations used.
    pub n: usize,
}

impl LinearRegression {
    /// Fits `y` on `x`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slices differ in length, have fewer than two
    /// points, or `x` has no variance.
    pub fn fit(x: &[f64], y: &[f64]) -> MathResult<Self> {
        if x.len() != y.len() {
            return Err(MathError::invalid_input(format!(
                "x has {} points, y has {}",
                x.len(),
                y.len()
            )));
        }
        let n = x.len();
        if n < 2 {
            return Err(MathError::insufficient_data(2, n));
        }

        let nf = n as f64;
        let x_mean = x.iter().sum::<f64>() / nf;
        let y_mean = y.iter().sum::<f64>() / nf;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        let mut syy = 0.0;
        for (&xi, &yi) in x.iter().zip(y) {
            let dx = xi - x_mean;
            let dy = yi - y_mean;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }

        if sxx.abs() < f64::EPSILON {
            return Err(MathError::DivisionByZero { value: sxx });
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;
        let r_squared = if syy.abs() < f64::EPSILON {
            1.0
        } else {
            (sxy * sxy) / (sxx * syy)
        };

        Ok(Self {
            slope,
            intercept,
            r_squared,
            n,
        })
    }

    /// Fits `y` against its index `0, 1, …, n-1`.
    pub fn fit_indexed(y: &[f64]) -> MathResult<Self> {
        let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
        Self::fit(&x, y)
    }

    /// Value of the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Mean squared residual over the given points.
    pub fn mse(&self, x: &[f64], y: &[f64]) -> f64 {
        self.mse_by(x, y, |p| p)
    }

    /// Mean squared residual after mapping predictions through `inverse`.
    ///
    /// `y` is on the original scale; the line was fitted on a transformed one.
    pub fn mse_by<F>(&self, x: &[f64], y: &[f64], inverse: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        if x.is_empty() || x.len() != y.len() {
            return f64::NAN;
        }
        let sum: f64 = x
            .iter()
            .zip(y)
            .map(|(&xi, &yi)| (yi - inverse(self.predict(xi))).powi(2))
            .sum();
        sum / x.len() as f64
    }
}
