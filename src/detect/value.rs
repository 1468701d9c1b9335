//! Value-bet scanner
//!
//! After a signal fires, every tracked book that has not yet repriced the
//! same outcome is a potential value bet. The scanner re-reads the latest
//! quotes at detection time and flags books whose line never moved in the
//! signal's direction since the window start.

use super::types::{Signal, ValueBet};
use super::window::moves_by_outcome;
use crate::history::SnapshotHistory;
use crate::odds::Direction;
use chrono::Duration;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Configuration for value scanning
#[derive(Debug, Clone)]
pub struct ValueScannerConfig {
    /// Books eligible to surface as value bets
    pub tracked_books: Vec<String>,
    /// Lookback matching the detection window (default: 30 minutes)
    pub window_minutes: i64,
}

impl Default for ValueScannerConfig {
    fn default() -> Self {
        Self {
            tracked_books: vec![
                "draftkings".to_string(),
                "fanduel".to_string(),
                "betmgm".to_string(),
                "caesars".to_string(),
                "williamhill_us".to_string(),
            ],
            window_minutes: 30,
        }
    }
}

/// Scans for books still on stale lines
pub struct ValueScanner {
    config: ValueScannerConfig,
}

impl ValueScanner {
    pub fn new(config: ValueScannerConfig) -> Self {
        Self { config }
    }

    /// Fill a candidate signal's `value_bets` from the latest quotes at
    /// detection time. Books already listed as contributing movers are
    /// excluded; a book qualifies when its own window move has no
    /// component in the signal's direction.
    pub async fn annotate(
        &self,
        history: &dyn SnapshotHistory,
        signal: &mut Signal,
    ) -> anyhow::Result<()> {
        let moved: HashSet<&str> = signal
            .contributing_books
            .iter()
            .map(|b| b.bookmaker.as_str())
            .collect();

        let since = signal.detected_at - Duration::minutes(self.config.window_minutes);
        let window = history.query(&signal.event_id, signal.market, since).await?;
        let moves = moves_by_outcome(&window);
        let window_deltas: HashMap<&str, Decimal> = moves
            .get(&signal.outcome_label)
            .map(|ms| {
                ms.iter()
                    .map(|m| (m.bookmaker.as_str(), m.delta()))
                    .collect()
            })
            .unwrap_or_default();

        let latest = history.latest(&signal.event_id, signal.market).await?;
        let line_direction = signal.line_direction();

        let mut value_bets = Vec::new();
        for quote in latest
            .iter()
            .filter(|q| q.outcome_label == signal.outcome_label)
        {
            if moved.contains(quote.bookmaker.as_str()) {
                continue;
            }
            if !self.config.tracked_books.contains(&quote.bookmaker) {
                continue;
            }

            let delta = window_deltas
                .get(quote.bookmaker.as_str())
                .copied()
                .unwrap_or(Decimal::ZERO);
            let caught_up = match (line_direction, Direction::from_delta(delta)) {
                // Any move in the signal's direction means the book has
                // started repricing.
                (Some(signal_dir), Some(book_dir)) => signal_dir == book_dir,
                // No movement direction on the signal (divergence): only
                // fully static books count as stale.
                (None, Some(_)) => true,
                (_, None) => false,
            };
            if caught_up {
                continue;
            }

            value_bets.push(ValueBet {
                bookmaker: quote.bookmaker.clone(),
                outcome_label: quote.outcome_label.clone(),
                price: quote.price,
                line_value: quote.line_value,
            });
        }
        value_bets.sort_by(|a, b| a.bookmaker.cmp(&b.bookmaker));
        signal.value_bets = value_bets;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::types::{ContributingBook, SignalType};
    use crate::history::MemoryHistory;
    use crate::odds::{MarketType, OddsQuote};
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, minute, 0).unwrap()
    }

    fn spread(bookmaker: &str, point: Decimal, minute: u32) -> OddsQuote {
        OddsQuote {
            event_id: "evt1".to_string(),
            sport: "basketball_nba".to_string(),
            home_team: "Lakers".to_string(),
            away_team: "Celtics".to_string(),
            commence_time: ts(0) + Duration::hours(8),
            bookmaker: bookmaker.to_string(),
            market: MarketType::Spread,
            outcome_label: "Lakers".to_string(),
            line_value: Some(point),
            price: dec!(-110),
            observed_at: ts(minute),
        }
    }

    fn steam_signal() -> Signal {
        Signal::new(
            SignalType::SteamMove,
            "evt1",
            "basketball_nba",
            "Lakers",
            "Celtics",
            MarketType::Spread,
            "Lakers",
            crate::odds::Direction::Down,
            Some(dec!(-4.0)),
            dec!(0.7),
            ts(20),
            vec![ContributingBook {
                bookmaker: "draftkings".to_string(),
                from_price: dec!(-110),
                to_price: dec!(-110),
                from_point: Some(dec!(-3.5)),
                to_point: Some(dec!(-4.0)),
                observed_at: ts(20),
            }],
            "test",
        )
    }

    #[tokio::test]
    async fn test_stale_book_is_a_value_bet() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                spread("draftkings", dec!(-3.5), 0),
                spread("draftkings", dec!(-4.0), 20),
                spread("fanduel", dec!(-3.5), 0),
                spread("fanduel", dec!(-3.5), 20),
            ])
            .await;

        let scanner = ValueScanner::new(ValueScannerConfig::default());
        let mut signal = steam_signal();
        scanner.annotate(&history, &mut signal).await.unwrap();

        assert_eq!(signal.value_bets.len(), 1);
        assert_eq!(signal.value_bets[0].bookmaker, "fanduel");
        assert_eq!(signal.value_bets[0].line_value, Some(dec!(-3.5)));
    }

    #[tokio::test]
    async fn test_caught_up_book_excluded() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                spread("draftkings", dec!(-3.5), 0),
                spread("draftkings", dec!(-4.0), 20),
                // Fanduel moved the same direction: no longer stale.
                spread("fanduel", dec!(-3.5), 0),
                spread("fanduel", dec!(-4.0), 20),
            ])
            .await;

        let scanner = ValueScanner::new(ValueScannerConfig::default());
        let mut signal = steam_signal();
        scanner.annotate(&history, &mut signal).await.unwrap();
        assert!(signal.value_bets.is_empty());
    }

    #[tokio::test]
    async fn test_contributing_books_excluded() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                spread("draftkings", dec!(-3.5), 0),
                spread("draftkings", dec!(-4.0), 20),
            ])
            .await;

        let scanner = ValueScanner::new(ValueScannerConfig::default());
        let mut signal = steam_signal();
        scanner.annotate(&history, &mut signal).await.unwrap();
        assert!(signal.value_bets.is_empty());
    }

    #[tokio::test]
    async fn test_untracked_books_excluded() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                spread("draftkings", dec!(-3.5), 0),
                spread("draftkings", dec!(-4.0), 20),
                spread("pinnacle", dec!(-3.5), 20),
            ])
            .await;

        let scanner = ValueScanner::new(ValueScannerConfig::default());
        let mut signal = steam_signal();
        scanner.annotate(&history, &mut signal).await.unwrap();
        assert!(signal.value_bets.is_empty());
    }

    #[tokio::test]
    async fn test_book_moving_against_signal_still_value() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                spread("draftkings", dec!(-3.5), 0),
                spread("draftkings", dec!(-4.0), 20),
                // Fanduel moved the other way: even more stale.
                spread("fanduel", dec!(-3.5), 0),
                spread("fanduel", dec!(-3.0), 20),
            ])
            .await;

        let scanner = ValueScanner::new(ValueScannerConfig::default());
        let mut signal = steam_signal();
        scanner.annotate(&history, &mut signal).await.unwrap();
        assert_eq!(signal.value_bets.len(), 1);
        assert_eq!(signal.value_bets[0].bookmaker, "fanduel");
    }
}
