//! Rate type used for growth rates, discount rates, spreads, and tax rates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A rate stored as a decimal fraction.
///
/// `Rate` is the single canonical unit for every rate the engine handles:
/// growth, cost of capital, credit spreads, tax. Percent values enter and
/// leave only through [`Rate::from_percent`] and [`Rate::as_percent`].
///
/// # Example
///
/// ```rust
/// use intrinsic_core::Rate;
///
/// let wacc = Rate::from_percent(8.5);
/// assert!((wacc.as_decimal() - 0.085).abs() < 1e-12);
/// assert!((wacc.as_percent() - 8.5).abs() < 1e-12);
/// assert!((Rate::from_bps(150.0).as_percent() - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(f64);

impl Rate {
    /// A zero rate.
    pub const ZERO: Self = Self(0.0);

    /// Creates a rate from a decimal fraction (0.05 = 5%).
    #[must_use]
    pub const fn from_decimal(value: f64) -> Self {
        Self(value)
    }

    /// Creates a rate from percentage points (5.0 = 5%).
    #[must_use]
    pub fn from_percent(percent: f64) -> Self {
        Self(percent / 100.0)
    }

    /// Creates a rate from basis points (150 = 1.5%).
    #[must_use]
    pub fn from_bps(bps: f64) -> Self {
        Self(bps / 10_000.0)
    }

    /// Returns the rate as a decimal fraction.
    #[must_use]
    pub const fn as_decimal(self) -> f64 {
        self.0
    }

    /// Returns the rate in percentage points.
    #[must_use]
    pub fn as_percent(self) -> f64 {
        self.0 * 100.0
    }

    /// Returns the rate in basis points.
    #[must_use]
    pub fn as_bps(self) -> f64 {
        self.0 * 10_000.0
    }

    /// Restricts the rate to `[min, max]`.
    #[must_use]
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Self(self.0.clamp(min.0, max.0))
    }

    /// Returns true if the underlying value is finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Compounding factor `(1 + r)^periods`.
    #[must_use]
    pub fn growth_factor(self, periods: f64) -> f64 {
        (1.0 + self.0).powf(periods)
    }

    /// Discount factor `1 / (1 + r)^periods`.
    #[must_use]
    pub fn discount_factor(self, periods: f64) -> f64 {
        1.0 / self.growth_factor(periods)
    }
}

impl Add for Rate {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Rate {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Rate {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Neg for Rate {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.as_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_percent_round_trip() {
        let r = Rate::from_percent(7.25);
        assert_relative_eq!(r.as_decimal(), 0.0725, epsilon = 1e-15);
        assert_relative_eq!(r.as_percent(), 7.25, epsilon = 1e-12);
        assert_relative_eq!(r.as_bps(), 725.0, epsilon = 1e-9);
    }

    #[test]
    fn test_arithmetic() {
        let rf = Rate::from_percent(4.0);
        let spread = Rate::from_bps(150.0);
        assert_relative_eq!((rf + spread).as_percent(), 5.5, epsilon = 1e-12);
        assert_relative_eq!((rf - spread).as_percent(), 2.5, epsilon = 1e-12);
        assert_relative_eq!((rf * 0.5).as_percent(), 2.0, epsilon = 1e-12);
        assert_relative_eq!((-rf).as_percent(), -4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_clamp() {
        let lo = Rate::from_percent(-20.0);
        let hi = Rate::from_percent(50.0);
        assert_eq!(Rate::from_percent(80.0).clamp(lo, hi), hi);
        assert_eq!(Rate::from_percent(-35.0).clamp(lo, hi), lo);
        assert_eq!(Rate::from_percent(12.0).clamp(lo, hi), Rate::from_percent(12.0));
    }

    #[test]
    fn test_discount_factor() {
        let r = Rate::from_percent(10.0);
        assert_relative_eq!(r.discount_factor(2.0), 1.0 / 1.21, epsilon = 1e-12);
        assert_relative_eq!(r.growth_factor(0.0), 1.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rate::from_decimal(0.085).to_string(), "8.50%");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Rate::from_decimal(0.05)).unwrap();
        assert_eq!(json, "0.05");
        let parsed: Rate = serde_json::from_str("0.05").unwrap();
        assert_eq!(parsed, Rate::from_decimal(0.05));
    }
}
