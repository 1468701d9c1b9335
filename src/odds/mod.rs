//! Odds domain types and price math
//!
//! American odds quotes, market/direction enums, and the implied
//! probability conversions every detector compares prices with.

mod math;
mod types;

pub use math::{american_odds, implied_probability, OddsError};
pub use types::{Direction, MarketType, OddsQuote};
