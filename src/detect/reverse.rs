//! Reverse line movement detector
//!
//! The tracked-book consensus moving one way while the reference book
//! moves the other is the classic public-vs-sharp split. The sharp side
//! is defined by the reference book's movement, not the majority.

use super::types::{ContributingBook, Signal, SignalType};
use super::window::{median, moves_by_outcome, BookMove};
use super::Detector;
use crate::history::SnapshotHistory;
use crate::odds::{Direction, MarketType};
use async_trait::async_trait;
use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Configuration for reverse line movement detection
#[derive(Debug, Clone)]
pub struct ReverseLineConfig {
    /// Reference bookmaker key (default: "pinnacle")
    pub reference_book: String,
    /// Books forming the consensus side
    pub tracked_books: Vec<String>,
    /// Minimum tracked books that moved (default: 2)
    pub min_consensus_books: usize,
    /// Trailing window in minutes (default: 30)
    pub window_minutes: i64,
}

impl Default for ReverseLineConfig {
    fn default() -> Self {
        Self {
            reference_book: "pinnacle".to_string(),
            tracked_books: vec![
                "draftkings".to_string(),
                "fanduel".to_string(),
                "betmgm".to_string(),
                "caesars".to_string(),
                "williamhill_us".to_string(),
            ],
            min_consensus_books: 2,
            window_minutes: 30,
        }
    }
}

/// Detects consensus movement opposing the reference book
pub struct ReverseLineMovementDetector {
    config: ReverseLineConfig,
}

impl ReverseLineMovementDetector {
    pub fn new(config: ReverseLineConfig) -> Self {
        Self { config }
    }

    fn strength(&self, consensus: Decimal, reference: Decimal, market: MarketType) -> Decimal {
        let norm = match market {
            MarketType::Moneyline => dec!(60),
            MarketType::Spread | MarketType::Total => dec!(4),
        };
        ((consensus.abs() + reference.abs()) / norm).min(Decimal::ONE)
    }
}

#[async_trait]
impl Detector for ReverseLineMovementDetector {
    fn signal_type(&self) -> SignalType {
        SignalType::ReverseLineMovement
    }

    async fn detect(
        &self,
        history: &dyn SnapshotHistory,
        event_id: &str,
        market: MarketType,
    ) -> anyhow::Result<Vec<Signal>> {
        let latest = history.latest(event_id, market).await?;
        let window_end = match latest.iter().map(|q| q.observed_at).max() {
            Some(end) => end,
            None => return Ok(vec![]),
        };
        let since = window_end - Duration::minutes(self.config.window_minutes);
        let quotes = history.query(event_id, market, since).await?;
        if quotes.is_empty() {
            return Ok(vec![]);
        }

        let mut outcomes: Vec<(String, Vec<BookMove>)> =
            moves_by_outcome(&quotes).into_iter().collect();
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));

        let mut signals = Vec::new();

        for (outcome_label, moves) in outcomes {
            let reference = match moves
                .iter()
                .find(|m| m.bookmaker == self.config.reference_book)
            {
                Some(m) => m,
                None => continue,
            };
            let ref_delta = reference.delta();
            let ref_direction = match Direction::from_delta(ref_delta) {
                Some(d) => d,
                None => continue,
            };

            let movers: Vec<&BookMove> = moves
                .iter()
                .filter(|m| {
                    self.config.tracked_books.contains(&m.bookmaker)
                        && m.delta() != Decimal::ZERO
                })
                .collect();
            if movers.len() < self.config.min_consensus_books {
                continue;
            }

            // Consensus statistic: median of the movers' signed deltas.
            // A zero median means no consensus direction, so no trigger.
            let deltas: Vec<Decimal> = movers.iter().map(|m| m.delta()).collect();
            let consensus = median(&deltas);
            let consensus_direction = match Direction::from_delta(consensus) {
                Some(d) => d,
                None => continue,
            };

            if consensus_direction == ref_direction {
                continue;
            }

            let strength = self.strength(consensus, ref_delta, market);

            // Reference book first: its movement defines the sharp side.
            let mut contributing = vec![ContributingBook {
                bookmaker: reference.bookmaker.clone(),
                from_price: reference.first.price,
                to_price: reference.last.price,
                from_point: reference.first.line_value,
                to_point: reference.last.line_value,
                observed_at: reference.last.observed_at,
            }];
            contributing.extend(movers.iter().map(|m| ContributingBook {
                bookmaker: m.bookmaker.clone(),
                from_price: m.first.price,
                to_price: m.last.price,
                from_point: m.first.line_value,
                to_point: m.last.line_value,
                observed_at: m.last.observed_at,
            }));

            let summary = format!(
                "Reverse line movement: consensus moved {consensus_direction} \
                 (median {consensus}) but {} moved {ref_direction} ({}) on \
                 {outcome_label} ({market})",
                self.config.reference_book, ref_delta,
            );

            let meta = &reference.last;
            signals.push(Signal::new(
                SignalType::ReverseLineMovement,
                event_id,
                meta.sport.clone(),
                meta.home_team.clone(),
                meta.away_team.clone(),
                market,
                outcome_label,
                ref_direction,
                meta.line_value,
                strength,
                window_end,
                contributing,
                summary,
            ));
        }

        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;
    use crate::odds::OddsQuote;
    use chrono::{DateTime, TimeZone, Utc};

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

    #[tokio::test]
    async fn test_opposing_moves_trigger() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                // Consensus drifts the line up...
                spread("draftkings", dec!(-3.5), 0),
                spread("draftkings", dec!(-3.0), 20),
                spread("fanduel", dec!(-3.5), 0),
                spread("fanduel", dec!(-3.0), 20),
                // ...while the reference tightens it.
                spread("pinnacle", dec!(-3.5), 0),
                spread("pinnacle", dec!(-4.0), 20),
            ])
            .await;

        let detector = ReverseLineMovementDetector::new(ReverseLineConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Spread)
            .await
            .unwrap();

        assert_eq!(signals.len(), 1);
        let sig = &signals[0];
        // Direction follows the reference book, the presumed-sharp side.
        assert_eq!(sig.direction, Direction::Down);
        assert_eq!(sig.contributing_books[0].bookmaker, "pinnacle");
        assert_eq!(sig.contributing_books.len(), 3);
    }

    #[tokio::test]
    async fn test_agreeing_moves_are_quiet() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                spread("draftkings", dec!(-3.5), 0),
                spread("draftkings", dec!(-4.0), 20),
                spread("fanduel", dec!(-3.5), 0),
                spread("fanduel", dec!(-4.0), 20),
                spread("pinnacle", dec!(-3.5), 0),
                spread("pinnacle", dec!(-4.0), 20),
            ])
            .await;

        let detector = ReverseLineMovementDetector::new(ReverseLineConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Spread)
            .await
            .unwrap();
        assert!(signals.is_empty());
    }

    #[tokio::test]
    async fn test_single_mover_is_not_consensus() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                spread("draftkings", dec!(-3.5), 0),
                spread("draftkings", dec!(-3.0), 20),
                spread("pinnacle", dec!(-3.5), 0),
                spread("pinnacle", dec!(-4.0), 20),
            ])
            .await;

        let detector = ReverseLineMovementDetector::new(ReverseLineConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Spread)
            .await
            .unwrap();
        assert!(signals.is_empty());
    }

    #[tokio::test]
    async fn test_split_consensus_with_zero_median_is_quiet() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                // Two movers split evenly: median is zero.
                spread("draftkings", dec!(-3.5), 0),
                spread("draftkings", dec!(-3.0), 20),
                spread("fanduel", dec!(-3.5), 0),
                spread("fanduel", dec!(-4.0), 20),
                spread("pinnacle", dec!(-3.5), 0),
                spread("pinnacle", dec!(-4.0), 20),
            ])
            .await;

        let detector = ReverseLineMovementDetector::new(ReverseLineConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Spread)
            .await
            .unwrap();
        assert!(signals.is_empty());
    }

    #[tokio::test]
    async fn test_static_reference_is_quiet() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                spread("draftkings", dec!(-3.5), 0),
                spread("draftkings", dec!(-3.0), 20),
                spread("fanduel", dec!(-3.5), 0),
                spread("fanduel", dec!(-3.0), 20),
                spread("pinnacle", dec!(-3.5), 0),
                spread("pinnacle", dec!(-3.5), 20),
            ])
            .await;

        let detector = ReverseLineMovementDetector::new(ReverseLineConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Spread)
            .await
            .unwrap();
        assert!(signals.is_empty());
    }
}
