//! Quote types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bet market type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    /// Win outcome (h2h)
    Moneyline,
    /// Scoring margin with a handicap
    Spread,
    /// Combined score over/under
    Total,
}

impl MarketType {
    /// Whether quotes on this market carry a point line
    pub fn uses_points(&self) -> bool {
        !matches!(self, MarketType::Moneyline)
    }

    /// All market types, in the order the pipeline scans them
    pub fn all() -> [MarketType; 3] {
        [MarketType::Moneyline, MarketType::Spread, MarketType::Total]
    }
}

impl std::fmt::Display for MarketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MarketType::Moneyline => "moneyline",
            MarketType::Spread => "spread",
            MarketType::Total => "total",
        };
        f.write_str(s)
    }
}

/// Direction of a line or price move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Classify a nonzero delta; zero has no direction
    pub fn from_delta(delta: Decimal) -> Option<Self> {
        if delta > Decimal::ZERO {
            Some(Direction::Up)
        } else if delta < Decimal::ZERO {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// One observed quote for a single (event, bookmaker, market, outcome) key.
///
/// Quotes are immutable facts: a line change produces a new quote with a
/// later `observed_at`, never an update in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsQuote {
    /// Provider event identifier
    pub event_id: String,
    /// Sport key, e.g. "basketball_nba"
    pub sport: String,
    /// Home team name
    pub home_team: String,
    /// Away team name
    pub away_team: String,
    /// Scheduled start time
    pub commence_time: DateTime<Utc>,
    /// Bookmaker key, e.g. "draftkings"
    pub bookmaker: String,
    /// Market this quote belongs to
    pub market: MarketType,
    /// Outcome label: team name, "Over" or "Under"
    pub outcome_label: String,
    /// Point / handicap; None for moneyline
    pub line_value: Option<Decimal>,
    /// American odds price
    pub price: Decimal,
    /// When this quote was observed
    pub observed_at: DateTime<Utc>,
}

impl OddsQuote {
    /// The value detectors compare over time: the point line when the
    /// market has one, otherwise the price.
    pub fn tracked_value(&self) -> Decimal {
        match self.line_value {
            Some(point) if self.market.uses_points() => point,
            _ => self.price,
        }
    }
}
