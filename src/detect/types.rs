//! Signal types

use crate::odds::{Direction, MarketType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Detection strategy that produced a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    /// Several books moved the same line in the same direction
    SteamMove,
    /// One book moved a line sharply between polls
    RapidChange,
    /// A tracked book's price diverges from the reference book
    PinnacleDivergence,
    /// Consensus moved opposite to the reference book
    ReverseLineMovement,
    /// The exchange book's implied probability shifted
    ExchangeMonitor,
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SignalType::SteamMove => "steam_move",
            SignalType::RapidChange => "rapid_change",
            SignalType::PinnacleDivergence => "pinnacle_divergence",
            SignalType::ReverseLineMovement => "reverse_line_movement",
            SignalType::ExchangeMonitor => "exchange_monitor",
        };
        f.write_str(s)
    }
}

/// A book's movement backing a signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributingBook {
    pub bookmaker: String,
    pub from_price: Decimal,
    pub to_price: Decimal,
    pub from_point: Option<Decimal>,
    pub to_point: Option<Decimal>,
    /// When the book's latest quote in the move was observed
    pub observed_at: DateTime<Utc>,
}

/// A book whose price has not yet caught up with a detected move
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueBet {
    pub bookmaker: String,
    pub outcome_label: String,
    /// Price at detection time
    pub price: Decimal,
    pub line_value: Option<Decimal>,
}

/// A detected sharp-action signal.
///
/// Immutable once handed to the pipeline; grading attaches a separate
/// result record and never mutates the signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Unique signal identifier
    pub id: Uuid,
    pub signal_type: SignalType,
    pub event_id: String,
    pub sport: String,
    pub home_team: String,
    pub away_team: String,
    pub market: MarketType,
    /// Outcome label: team name, "Over" or "Under"
    pub outcome_label: String,
    /// Detector-specific movement direction for this outcome; see each
    /// detector for its meaning
    pub direction: Direction,
    /// Point line as of signal time; grading applies this, never a later line
    pub line_value: Option<Decimal>,
    /// Normalized strength in [0, 1]
    pub strength: Decimal,
    pub detected_at: DateTime<Utc>,
    /// Books whose movement triggered the signal, in detection order
    pub contributing_books: Vec<ContributingBook>,
    /// Books still on stale lines, filled by the value scanner
    pub value_bets: Vec<ValueBet>,
    /// Human-readable one-liner for alert delivery
    pub summary: String,
}

impl Signal {
    /// Create a new signal with a fresh id and no value bets
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        signal_type: SignalType,
        event_id: impl Into<String>,
        sport: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        market: MarketType,
        outcome_label: impl Into<String>,
        direction: Direction,
        line_value: Option<Decimal>,
        strength: Decimal,
        detected_at: DateTime<Utc>,
        contributing_books: Vec<ContributingBook>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            signal_type,
            event_id: event_id.into(),
            sport: sport.into(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            market,
            outcome_label: outcome_label.into(),
            direction,
            line_value,
            strength: strength.clamp(Decimal::ZERO, Decimal::ONE),
            detected_at,
            contributing_books,
            value_bets: Vec::new(),
            summary: summary.into(),
        }
    }

    /// Cooldown suppression key: exactly the 4-tuple
    /// (event, type, market, outcome)
    pub fn cooldown_key(&self) -> (String, SignalType, MarketType, String) {
        (
            self.event_id.clone(),
            self.signal_type,
            self.market,
            self.outcome_label.clone(),
        )
    }

    /// The signal's direction expressed in tracked-value space (point or
    /// American price). ExchangeMonitor records an implied-probability
    /// direction, which inverts for prices; PinnacleDivergence has no
    /// movement direction at all.
    pub fn line_direction(&self) -> Option<Direction> {
        match self.signal_type {
            SignalType::PinnacleDivergence => None,
            SignalType::ExchangeMonitor => Some(self.direction.opposite()),
            _ => Some(self.direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_signal(signal_type: SignalType, direction: Direction) -> Signal {
        Signal::new(
            signal_type,
            "evt1",
            "basketball_nba",
            "Lakers",
            "Celtics",
            MarketType::Spread,
            "Lakers",
            direction,
            Some(dec!(-4.0)),
            dec!(0.7),
            Utc::now(),
            vec![],
            "test",
        )
    }

    #[test]
    fn test_strength_is_clamped() {
        let sig = Signal::new(
            SignalType::SteamMove,
            "evt1",
            "basketball_nba",
            "Lakers",
            "Celtics",
            MarketType::Spread,
            "Lakers",
            Direction::Down,
            None,
            dec!(1.4),
            Utc::now(),
            vec![],
            "test",
        );
        assert_eq!(sig.strength, Decimal::ONE);
    }

    #[test]
    fn test_cooldown_key_is_four_tuple() {
        let sig = make_signal(SignalType::SteamMove, Direction::Down);
        let key = sig.cooldown_key();
        assert_eq!(key.0, "evt1");
        assert_eq!(key.1, SignalType::SteamMove);
        assert_eq!(key.2, MarketType::Spread);
        assert_eq!(key.3, "Lakers");
    }

    #[test]
    fn test_line_direction_inverts_for_exchange() {
        let sig = make_signal(SignalType::ExchangeMonitor, Direction::Up);
        assert_eq!(sig.line_direction(), Some(Direction::Down));
    }

    #[test]
    fn test_line_direction_none_for_divergence() {
        let sig = make_signal(SignalType::PinnacleDivergence, Direction::Up);
        assert_eq!(sig.line_direction(), None);
    }

    #[test]
    fn test_signal_type_serde_names() {
        let json = serde_json::to_string(&SignalType::ReverseLineMovement).unwrap();
        assert_eq!(json, "\"reverse_line_movement\"");
    }
}
