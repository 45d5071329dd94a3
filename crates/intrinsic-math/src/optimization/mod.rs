//! Optimization algorithms.
//!
//! Hyperparameter fitting for the forecasting models uses exhaustive grid
//! search rather than gradient methods: the parameter space is two-dimensional,
//! bounded, and small, and the objective is cheap to evaluate.
//!
//! [`two_stage_grid_search`] runs a coarse pass over the whole box followed by
//! a fine pass in a window around the coarse optimum. Points are visited with
//! `x` ascending in the outer loop and `y` ascending in the inner loop, and a
//! point replaces the incumbent only if its objective is strictly lower, so
//! ties resolve to the first point found (lowest `x`, then lowest `y`).

use crate::error::{MathError, MathResult};

/// Evenly spaced points on a closed interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridAxis {
    /// First point.
    pub lower: f64,
    /// Last point (included when it falls on the grid).
    pub upper: f64,
    /// Spacing between points.
    pub step: f64,
}

impl GridAxis {
    /// Creates an axis.
    #[must_use]
    pub fn new(lower: f64, upper: f64, step: f64) -> Self {
        Self { lower, upper, step }
    }

    /// Grid points in ascending order.
    ///
    /// Points are generated from an integer index to avoid accumulating
    /// floating-point drift.
    pub fn points(&self) -> Vec<f64> {
        if !(self.step > 0.0) || self.upper < self.lower {
            return Vec::new();
        }
        let count = ((self.upper - self.lower) / self.step + 1e-9).floor() as usize + 1;
        (0..count)
            .map(|k| snap(self.lower + k as f64 * self.step))
            .collect()
    }
}

/// Snaps to 1e-12 so that `0.1 * 3` compares equal to `0.3`.
fn snap(value: f64) -> f64 {
    (value * 1e12).round() / 1e12
}

/// A point of a two-dimensional search and its objective value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    /// First coordinate.
    pub x: f64,
    /// Second coordinate.
    pub y: f64,
    /// Objective value at `(x, y)`.
    pub objective: f64,
}

/// Exhaustive search over the product of two axes.
///
/// Non-finite objective values are skipped. Returns an error if no grid point
/// has a finite objective.
pub fn grid_search_2d<F>(f: F, x_axis: &GridAxis, y_axis: &GridAxis) -> MathResult<GridPoint>
where
    F: Fn(f64, f64) -> f64,
{
    search_from(&f, x_axis, y_axis, None)
}

fn search_from<F>(
    f: &F,
    x_axis: &GridAxis,
    y_axis: &GridAxis,
    incumbent: Option<GridPoint>,
) -> MathResult<GridPoint>
where
    F: Fn(f64, f64) -> f64,
{
    let xs = x_axis.points();
    let ys = y_axis.points();
    let mut best = incumbent;

    for &x in &xs {
        for &y in &ys {
            let objective = f(x, y);
            if !objective.is_finite() {
                continue;
            }
            if best.map_or(true, |b| objective < b.objective) {
                best = Some(GridPoint { x, y, objective });
            }
        }
    }

    best.ok_or(MathError::NoFiniteObjective {
        evaluations: xs.len() * ys.len(),
    })
}

/// Configuration for [`two_stage_grid_search`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoStageConfig {
    /// Smallest admissible value of either parameter.
    pub lower_bound: f64,
    /// Largest admissible value of either parameter.
    pub upper_bound: f64,
    /// Spacing of the coarse grid.
    pub coarse_step: f64,
    /// Half-width of the refinement window around the coarse optimum.
    pub refine_radius: f64,
    /// Spacing of the refinement grid.
    pub refine_step: f64,
}

impl Default for TwoStageConfig {
    /// Coarse 0.1 grid over `[0.1, 0.9]`, then a ±0.1 window at 0.01 spacing,
    /// never leaving `[0.01, 0.99]`.
    fn default() -> Self {
        Self {
            lower_bound: 0.01,
            upper_bound: 0.99,
            coarse_step: 0.1,
            refine_radius: 0.1,
            refine_step: 0.01,
        }
    }
}

impl TwoStageConfig {
    fn coarse_axis(&self) -> GridAxis {
        let lower = (self.lower_bound / self.coarse_step).ceil() * self.coarse_step;
        let upper = (self.upper_bound / self.coarse_step).floor() * self.coarse_step;
        GridAxis::new(snap(lower), snap(upper), self.coarse_step)
    }

    fn refine_axis(&self, center: f64) -> GridAxis {
        GridAxis::new(
            snap((center - self.refine_radius).max(self.lower_bound)),
            snap((center + self.refine_radius).min(self.upper_bound)),
            self.refine_step,
        )
    }
}

/// Outcome of a coarse-to-fine search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoStageResult {
    /// Optimum of the coarse pass.
    pub coarse: GridPoint,
    /// Optimum after refinement; never worse than `coarse`.
    pub refined: GridPoint,
}

/// Coarse grid search followed by a local refinement pass.
///
/// The refinement starts from the coarse optimum as incumbent, so the refined
/// objective is always `<=` the coarse one.
///
/// # Example
///
/// ```rust
/// use intrinsic_math::optimization::{two_stage_grid_search, TwoStageConfig};
///
/// let f = |x: f64, y: f64| (x - 0.37).powi(2) + (y - 0.62).powi(2);
/// let result = two_stage_grid_search(f, &TwoStageConfig::default()).unwrap();
///
/// assert!((result.refined.x - 0.37).abs() < 1e-9);
/// assert!((result.refined.y - 0.62).abs() < 1e-9);
/// assert!(result.refined.objective <= result.coarse.objective);
/// ```
pub fn two_stage_grid_search<F>(f: F, config: &TwoStageConfig) -> MathResult<TwoStageResult>
where
    F: Fn(f64, f64) -> f64,
{
    if !(config.lower_bound < config.upper_bound) {
        return Err(MathError::invalid_input(format!(
            "lower bound {} must be below upper bound {}",
            config.lower_bound, config.upper_bound
        )));
    }

    let coarse_axis = config.coarse_axis();
    let coarse = search_from(&f, &coarse_axis, &coarse_axis, None)?;

    let refined = search_from(
        &f,
        &config.refine_axis(coarse.x),
        &config.refine_axis(coarse.y),
        Some(coarse),
    )?;

    log::debug!(
        "grid search: coarse ({:.2}, {:.2}) -> {:.6e}, refined ({:.2}, {:.2}) -> {:.6e}",
        coarse.x,
        coarse.y,
        coarse.objective,
        refined.x,
        refined.y,
        refined.objective
    );

    Ok(TwoStageResult { coarse, refined })
}
