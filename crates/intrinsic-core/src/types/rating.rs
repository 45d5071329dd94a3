//! Credit rating scale used by synthetic ratings.

use serde::{Deserialize, Serialize};

/// Normalized credit rating (agency-agnostic).
///
/// Uses S&P-style notation. The ordering is from highest quality (AAA) to
/// lowest (D), so `AAA < D`.
///
/// # Examples
///
/// ```
/// use intrinsic_core::types::CreditRating;
///
/// let rating = CreditRating::parse("A-").unwrap();
/// assert_eq!(rating, CreditRating::AMinus);
/// assert!(rating.is_investment_grade());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CreditRating {
    /// Highest quality
    AAA = 1,
    /// AA+
    AAPlus = 2,
    /// AA
    AA = 3,
    /// AA-
    AAMinus = 4,
    /// A+
    APlus = 5,
    /// A
    A = 6,
    /// A-
    AMinus = 7,
    /// BBB+
    BBBPlus = 8,
    /// BBB
    BBB = 9,
    /// BBB- (lowest investment grade)
    BBBMinus = 10,
    /// BB+ (highest high yield)
    BBPlus = 11,
    /// BB
    BB = 12,
    /// BB-
    BBMinus = 13,
    /// B+
    BPlus = 14,
    /// B
    B = 15,
    /// B-
    BMinus = 16,
    /// CCC
    CCC = 17,
    /// CC
    CC = 18,
    /// C
    C = 19,
    /// Default
    D = 20,
}

impl CreditRating {
    /// Returns the numeric score (1 = AAA, 20 = D).
    #[must_use]
    pub fn score(&self) -> u8 {
        *self as u8
    }

    /// Returns true if this is investment grade (BBB- or better).
    #[must_use]
    pub fn is_investment_grade(&self) -> bool {
        *self <= CreditRating::BBBMinus
    }

    /// Returns the S&P-style notation.
    #[must_use]
    pub fn sp_notation(&self) -> &'static str {
        match self {
            Self::AAA => "AAA",
            Self::AAPlus => "AA+",
            Self::AA => "AA",
            Self::AAMinus => "AA-",
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BBBPlus => "BBB+",
            Self::BBB => "BBB",
            Self::BBBMinus => "BBB-",
            Self::BBPlus => "BB+",
            Self::BB => "BB",
            Self::BBMinus => "BB-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CCC => "CCC",
            Self::CC => "CC",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// Parses a rating from S&P notation (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "AAA" => Some(Self::AAA),
            "AA+" => Some(Self::AAPlus),
            "AA" => Some(Self::AA),
            "AA-" => Some(Self::AAMinus),
            "A+" => Some(Self::APlus),
            "A" => Some(Self::A),
            "A-" => Some(Self::AMinus),
            "BBB+" => Some(Self::BBBPlus),
            "BBB" => Some(Self::BBB),
            "BBB-" => Some(Self::BBBMinus),
            "BB+" => Some(Self::BBPlus),
            "BB" => Some(Self::BB),
            "BB-" => Some(Self::BBMinus),
            "B+" => Some(Self::BPlus),
            "B" => Some(Self::B),
            "B-" => Some(Self::BMinus),
            "CCC" => Some(Self::CCC),
            "CC" => Some(Self::CC),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }
}

impl std::fmt::Display for CreditRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sp_notation())
    }
}
