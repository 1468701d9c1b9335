//! Exchange monitor detector
//!
//! Watches the designated exchange book's implied probability between
//! polls. Exchange prices are set by traders rather than a bookmaker, so
//! a large shift is treated as informed flow. Exchange quotes are only
//! reliable on moneylines; other markets are ignored.

use super::types::{ContributingBook, Signal, SignalType};
use super::Detector;
use crate::history::SnapshotHistory;
use crate::odds::{implied_probability, Direction, MarketType, OddsQuote};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Configuration for exchange shift detection
#[derive(Debug, Clone)]
pub struct ExchangeMonitorConfig {
    /// Exchange bookmaker key (default: "betfair_ex_eu")
    pub exchange_book: String,
    /// Minimum implied-probability shift (default: 0.05)
    pub shift_threshold: Decimal,
}

impl Default for ExchangeMonitorConfig {
    fn default() -> Self {
        Self {
            exchange_book: "betfair_ex_eu".to_string(),
            shift_threshold: dec!(0.05),
        }
    }
}

/// Detects implied-probability shifts at the exchange book
pub struct ExchangeMonitorDetector {
    config: ExchangeMonitorConfig,
}

impl ExchangeMonitorDetector {
    pub fn new(config: ExchangeMonitorConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Detector for ExchangeMonitorDetector {
    fn signal_type(&self) -> SignalType {
        SignalType::ExchangeMonitor
    }

    async fn detect(
        &self,
        history: &dyn SnapshotHistory,
        event_id: &str,
        market: MarketType,
    ) -> anyhow::Result<Vec<Signal>> {
        if market != MarketType::Moneyline {
            return Ok(vec![]);
        }

        let latest = history.latest(event_id, market).await?;
        let window_end = match latest.iter().map(|q| q.observed_at).max() {
            Some(end) => end,
            None => return Ok(vec![]),
        };
        let previous = history.previous(event_id, market, window_end).await?;

        let prev_map: HashMap<String, &OddsQuote> = previous
            .iter()
            .filter(|q| q.bookmaker == self.config.exchange_book)
            .map(|q| (q.outcome_label.clone(), q))
            .collect();
        if prev_map.is_empty() {
            return Ok(vec![]);
        }

        let mut signals = Vec::new();

        for quote in latest
            .iter()
            .filter(|q| q.bookmaker == self.config.exchange_book)
        {
            let prev = match prev_map.get(&quote.outcome_label) {
                Some(p) => *p,
                None => continue,
            };

            let old_prob = implied_probability(prev.price)?;
            let new_prob = implied_probability(quote.price)?;
            let shift = new_prob - old_prob;
            if shift.abs() < self.config.shift_threshold {
                continue;
            }

            // Direction is in probability space: Up = shortened.
            let direction = if shift > Decimal::ZERO {
                Direction::Up
            } else {
                Direction::Down
            };
            // A 15-point probability swing saturates strength.
            let strength = (shift.abs() / dec!(0.15)).min(Decimal::ONE);

            let verb = match direction {
                Direction::Up => "shortened",
                Direction::Down => "drifted",
            };
            let summary = format!(
                "Exchange shift: {} {verb} on {} ({old_prob:.3} -> {new_prob:.3})",
                quote.outcome_label, self.config.exchange_book,
            );

            signals.push(Signal::new(
                SignalType::ExchangeMonitor,
                event_id,
                quote.sport.clone(),
                quote.home_team.clone(),
                quote.away_team.clone(),
                market,
                quote.outcome_label.clone(),
                direction,
                None,
                strength,
                quote.observed_at,
                vec![ContributingBook {
                    bookmaker: quote.bookmaker.clone(),
                    from_price: prev.price,
                    to_price: quote.price,
                    from_point: None,
                    to_point: None,
                    observed_at: quote.observed_at,
                }],
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
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, minute, 0).unwrap()
    }

    fn quote(bookmaker: &str, outcome: &str, price: Decimal, minute: u32) -> OddsQuote {
        OddsQuote {
            event_id: "evt1".to_string(),
            sport: "basketball_nba".to_string(),
            home_team: "Lakers".to_string(),
            away_team: "Celtics".to_string(),
            commence_time: ts(0) + Duration::hours(8),
            bookmaker: bookmaker.to_string(),
            market: MarketType::Moneyline,
            outcome_label: outcome.to_string(),
            line_value: None,
            price,
            observed_at: ts(minute),
        }
    }

    #[tokio::test]
    async fn test_large_shift_triggers() {
        let history = MemoryHistory::new();
        // -110 (0.5238) to -160 (0.6154): shift ~0.09.
        history
            .insert(vec![
                quote("betfair_ex_eu", "Lakers", dec!(-110), 0),
                quote("betfair_ex_eu", "Lakers", dec!(-160), 20),
            ])
            .await;

        let detector = ExchangeMonitorDetector::new(ExchangeMonitorConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Moneyline)
            .await
            .unwrap();

        assert_eq!(signals.len(), 1);
        let sig = &signals[0];
        assert_eq!(sig.direction, Direction::Up);
        assert!(sig.strength > dec!(0.5));
    }

    #[tokio::test]
    async fn test_drift_direction_down() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                quote("betfair_ex_eu", "Lakers", dec!(-160), 0),
                quote("betfair_ex_eu", "Lakers", dec!(-110), 20),
            ])
            .await;

        let detector = ExchangeMonitorDetector::new(ExchangeMonitorConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Moneyline)
            .await
            .unwrap();
        assert_eq!(signals[0].direction, Direction::Down);
    }

    #[tokio::test]
    async fn test_small_shift_is_quiet() {
        let history = MemoryHistory::new();
        // -110 to -120: shift ~0.02, below the 0.05 default.
        history
            .insert(vec![
                quote("betfair_ex_eu", "Lakers", dec!(-110), 0),
                quote("betfair_ex_eu", "Lakers", dec!(-120), 20),
            ])
            .await;

        let detector = ExchangeMonitorDetector::new(ExchangeMonitorConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Moneyline)
            .await
            .unwrap();
        assert!(signals.is_empty());
    }

    #[tokio::test]
    async fn test_other_books_ignored() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                quote("draftkings", "Lakers", dec!(-110), 0),
                quote("draftkings", "Lakers", dec!(-200), 20),
            ])
            .await;

        let detector = ExchangeMonitorDetector::new(ExchangeMonitorConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Moneyline)
            .await
            .unwrap();
        assert!(signals.is_empty());
    }

    #[tokio::test]
    async fn test_non_moneyline_markets_ignored() {
        let history = MemoryHistory::new();
        let detector = ExchangeMonitorDetector::new(ExchangeMonitorConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Spread)
            .await
            .unwrap();
        assert!(signals.is_empty());
    }
}
