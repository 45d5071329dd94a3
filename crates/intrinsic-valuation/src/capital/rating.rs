//! Synthetic credit rating from interest coverage.
//!
//! A company without traded debt is assigned the rating (and default spread)
//! of the interest-coverage band its EBIT / interest ratio falls in. Bands are
//! half-open `(min, max]`, sorted ascending, contiguous, and together cover the
//! whole real line, so every coverage ratio maps to exactly one band.

use intrinsic_core::types::CreditRating;
use intrinsic_core::Rate;
use serde::Serialize;

use crate::error::{ValuationError, ValuationResult};

/// Coverage ratio used when interest expense is effectively zero.
pub const ICR_SENTINEL: f64 = 100.0;

/// Interest expense below this magnitude counts as none.
const INTEREST_TOLERANCE: f64 = 1e-9;

/// Interest coverage ratio `EBIT / |interest expense|`.
///
/// Returns [`ICR_SENTINEL`] when there is no interest expense.
pub fn interest_coverage(ebit: f64, interest_expense: f64) -> f64 {
    let interest = interest_expense.abs();
    if interest < INTEREST_TOLERANCE {
        ICR_SENTINEL
    } else {
        ebit / interest
    }
}

/// One coverage band of the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingBand {
    /// Exclusive lower bound on coverage.
    pub min_icr: f64,
    /// Inclusive upper bound on coverage.
    pub max_icr: f64,
    /// Rating assigned to the band.
    pub rating: CreditRating,
    /// Default spread over the risk-free rate.
    pub spread: Rate,
}

impl RatingBand {
    /// Creates a band; `spread` is a decimal fraction.
    #[must_use]
    pub const fn new(min_icr: f64, max_icr: f64, rating: CreditRating, spread: f64) -> Self {
        Self {
            min_icr,
            max_icr,
            rating,
            spread: Rate::from_decimal(spread),
        }
    }

    /// Returns true if `icr` falls in `(min_icr, max_icr]`.
    pub fn contains(&self, icr: f64) -> bool {
        self.min_icr < icr && icr <= self.max_icr
    }
}

/// Large non-financial firm bands.
const STANDARD_BANDS: [RatingBand; 16] = [
    RatingBand::new(f64::NEG_INFINITY, 0.2, CreditRating::D, 0.14),
    RatingBand::new(0.2, 0.65, CreditRating::C, 0.12),
    RatingBand::new(0.65, 0.8, CreditRating::CC, 0.1),
    RatingBand::new(0.8, 1.25, CreditRating::CCC, 0.08),
    RatingBand::new(1.25, 1.5, CreditRating::BMinus, 0.065),
    RatingBand::new(1.5, 1.75, CreditRating::B, 0.055),
    RatingBand::new(1.75, 2.0, CreditRating::BPlus, 0.045),
    RatingBand::new(2.0, 2.25, CreditRating::BB, 0.035),
    RatingBand::new(2.25, 2.5, CreditRating::BBPlus, 0.03),
    RatingBand::new(2.5, 3.5, CreditRating::BBB, 0.0225),
    RatingBand::new(3.5, 4.5, CreditRating::BBBPlus, 0.0175),
    RatingBand::new(4.5, 6.0, CreditRating::AMinus, 0.015),
    RatingBand::new(6.0, 7.5, CreditRating::A, 0.0125),
    RatingBand::new(7.5, 9.5, CreditRating::APlus, 0.011),
    RatingBand::new(9.5, 12.5, CreditRating::AA, 0.01),
    RatingBand::new(12.5, f64::INFINITY, CreditRating::AAA, 0.0075),
];

/// Ordered coverage-to-rating lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticRatingTable {
    bands: Vec<RatingBand>,
}

impl Default for SyntheticRatingTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl SyntheticRatingTable {
    /// The standard sixteen-band table, from `D` at 14% to `AAA` at 0.75%.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bands: STANDARD_BANDS.to_vec(),
        }
    }

    /// Builds a custom table.
    ///
    /// # Errors
    ///
    /// Returns [`ValuationError::InvalidRatingTable`] if the bands are empty,
    /// not sorted ascending, have gaps or overlaps, or do not extend from
    /// `-∞` to `+∞`.
    pub fn new(bands: Vec<RatingBand>) -> ValuationResult<Self> {
        let table = Self { bands };
        table.validate()?;
        Ok(table)
    }

    /// Checks ordering, contiguity, and totality.
    pub fn validate(&self) -> ValuationResult<()> {
        let (first, last) = match (self.bands.first(), self.bands.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ValuationError::invalid_rating_table("no bands")),
        };

        if first.min_icr != f64::NEG_INFINITY {
            return Err(ValuationError::invalid_rating_table(format!(
                "first band starts at {} instead of -inf",
                first.min_icr
            )));
        }
        if last.max_icr != f64::INFINITY {
            return Err(ValuationError::invalid_rating_table(format!(
                "last band ends at {} instead of +inf",
                last.max_icr
            )));
        }

        for band in &self.bands {
            if !(band.min_icr < band.max_icr) {
                return Err(ValuationError::invalid_rating_table(format!(
                    "band {} has empty range ({}, {}]",
                    band.rating, band.min_icr, band.max_icr
                )));
            }
        }

        for pair in self.bands.windows(2) {
            if pair[0].max_icr != pair[1].min_icr {
                return Err(ValuationError::invalid_rating_table(format!(
                    "bands {} and {} are not contiguous ({} vs {})",
                    pair[0].rating, pair[1].rating, pair[0].max_icr, pair[1].min_icr
                )));
            }
        }

        Ok(())
    }

    /// Bands in ascending coverage order.
    pub fn bands(&self) -> &[RatingBand] {
        &self.bands
    }

    /// Band containing `icr`.
    ///
    /// `NaN` coverage is treated as distress and maps to the lowest band.
    pub fn lookup(&self, icr: f64) -> &RatingBand {
        let distress = &self.bands[0];
        if icr.is_nan() {
            return distress;
        }
        self.bands
            .iter()
            .find(|band| band.contains(icr))
            .unwrap_or(distress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_table_is_valid() {
        assert!(SyntheticRatingTable::standard().validate().is_ok());
        assert_eq!(SyntheticRatingTable::standard().bands().len(), 16);
    }

    #[test]
    fn test_icr_five_is_a_minus() {
        let icr = interest_coverage(500.0, 100.0);
        assert_relative_eq!(icr, 5.0);

        let table = SyntheticRatingTable::standard();
        let band = table.lookup(icr);
        assert_eq!(band.rating, CreditRating::AMinus);
        assert_relative_eq!(band.spread.as_percent(), 1.50, epsilon = 1e-12);
    }

    #[test]
    fn test_band_edges_are_upper_inclusive() {
        let table = SyntheticRatingTable::standard();
        assert_eq!(table.lookup(0.2).rating, CreditRating::D);
        assert_eq!(table.lookup(0.2000001).rating, CreditRating::C);
        assert_eq!(table.lookup(12.5).rating, CreditRating::AA);
        assert_eq!(table.lookup(12.5000001).rating, CreditRating::AAA);
    }

    #[test]
    fn test_extremes() {
        let table = SyntheticRatingTable::standard();
        assert_eq!(table.lookup(-50.0).rating, CreditRating::D);
        assert_eq!(table.lookup(f64::NEG_INFINITY).rating, CreditRating::D);
        assert_eq!(table.lookup(f64::INFINITY).rating, CreditRating::AAA);
        assert_eq!(table.lookup(f64::NAN).rating, CreditRating::D);
    }

    #[test]
    fn test_zero_interest_uses_sentinel() {
        assert_relative_eq!(interest_coverage(10.0, 0.0), ICR_SENTINEL);
        assert_eq!(
            SyntheticRatingTable::standard()
                .lookup(interest_coverage(-10.0, 0.0))
                .rating,
            CreditRating::AAA
        );
    }

    #[test]
    fn test_negative_interest_sign_ignored() {
        assert_relative_eq!(interest_coverage(300.0, -100.0), 3.0);
    }

    #[test]
    fn test_custom_table_validation() {
        let gapped = vec![
            RatingBand::new(f64::NEG_INFINITY, 1.0, CreditRating::D, 0.10),
            RatingBand::new(2.0, f64::INFINITY, CreditRating::AAA, 0.01),
        ];
        assert!(matches!(
            SyntheticRatingTable::new(gapped),
            Err(ValuationError::InvalidRatingTable { .. })
        ));

        let bounded = vec![RatingBand::new(0.0, f64::INFINITY, CreditRating::AAA, 0.01)];
        assert!(SyntheticRatingTable::new(bounded).is_err());
        assert!(SyntheticRatingTable::new(Vec::new()).is_err());

        let two = vec![
            RatingBand::new(f64::NEG_INFINITY, 1.0, CreditRating::D, 0.10),
            RatingBand::new(1.0, f64::INFINITY, CreditRating::AAA, 0.01),
        ];
        let table = SyntheticRatingTable::new(two).unwrap();
        assert_eq!(table.lookup(1.0).rating, CreditRating::D);
    }
}
