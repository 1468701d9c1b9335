//! American odds conversions
//!
//! All detector comparisons use raw implied probability; no vig removal,
//! so thresholds stay symmetric across detectors.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

/// Odds conversion errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OddsError {
    /// Price is not a valid American odds value (|price| must be >= 100)
    #[error("Invalid American odds: {0}")]
    InvalidOdds(Decimal),
    /// Probability outside the open interval (0, 1)
    #[error("Invalid probability: {0}")]
    InvalidProbability(Decimal),
}

/// Convert American odds to implied probability in (0, 1).
///
/// Positive odds: `100 / (a + 100)`. Negative odds: `-a / (-a + 100)`.
/// Anything with |a| < 100 (including zero) is malformed.
pub fn implied_probability(price: Decimal) -> Result<Decimal, OddsError> {
    let hundred = dec!(100);
    if price >= hundred {
        Ok(hundred / (price + hundred))
    } else if price <= -hundred {
        Ok(-price / (-price + hundred))
    } else {
        Err(OddsError::InvalidOdds(price))
    }
}

/// Convert an implied probability back to American odds.
///
/// Probabilities above one half map to negative (favorite) odds; exactly
/// one half maps to +100 by convention.
pub fn american_odds(prob: Decimal) -> Result<Decimal, OddsError> {
    if prob <= Decimal::ZERO || prob >= Decimal::ONE {
        return Err(OddsError::InvalidProbability(prob));
    }
    let hundred = dec!(100);
    if prob > dec!(0.5) {
        Ok(-(prob / (Decimal::ONE - prob)) * hundred)
    } else {
        Ok(((Decimal::ONE - prob) / prob) * hundred)
    }
}
