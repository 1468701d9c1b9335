//! Pinnacle divergence detector
//!
//! The reference book is treated as the most informationally efficient;
//! a tracked book quoting the same outcome far away from it is presumed
//! mispriced. Moneyline comparisons happen in implied-probability space,
//! spread/total comparisons in points.

use super::types::{ContributingBook, Signal, SignalType};
use super::Detector;
use crate::history::SnapshotHistory;
use crate::odds::{implied_probability, Direction, MarketType, OddsQuote};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Configuration for reference-book divergence detection
#[derive(Debug, Clone)]
pub struct DivergenceConfig {
    /// Reference bookmaker key (default: "pinnacle")
    pub reference_book: String,
    /// Books compared against the reference
    pub tracked_books: Vec<String>,
    /// Minimum point gap on spread/total markets (default: 1.0)
    pub spread_threshold: Decimal,
    /// Minimum implied-probability gap on moneylines (default: 0.04)
    pub ml_prob_threshold: Decimal,
}

impl Default for DivergenceConfig {
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
            spread_threshold: dec!(1.0),
            ml_prob_threshold: dec!(0.04),
        }
    }
}

/// Detects tracked books diverging from the reference book's current line
pub struct PinnacleDivergenceDetector {
    config: DivergenceConfig,
}

impl PinnacleDivergenceDetector {
    pub fn new(config: DivergenceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Detector for PinnacleDivergenceDetector {
    fn signal_type(&self) -> SignalType {
        SignalType::PinnacleDivergence
    }

    async fn detect(
        &self,
        history: &dyn SnapshotHistory,
        event_id: &str,
        market: MarketType,
    ) -> anyhow::Result<Vec<Signal>> {
        let latest = history.latest(event_id, market).await?;
        if latest.is_empty() {
            return Ok(vec![]);
        }

        // outcome -> bookmaker -> quote
        let mut by_outcome: HashMap<String, HashMap<String, &OddsQuote>> = HashMap::new();
        for quote in &latest {
            by_outcome
                .entry(quote.outcome_label.clone())
                .or_default()
                .insert(quote.bookmaker.clone(), quote);
        }

        let mut outcomes: Vec<(&String, &HashMap<String, &OddsQuote>)> =
            by_outcome.iter().collect();
        outcomes.sort_by(|a, b| a.0.cmp(b.0));

        let mut signals = Vec::new();

        for (outcome_label, books) in outcomes {
            let reference = match books.get(&self.config.reference_book) {
                Some(q) => *q,
                None => continue,
            };

            for bookmaker in &self.config.tracked_books {
                let quote = match books.get(bookmaker) {
                    Some(q) => *q,
                    None => continue,
                };

                let (delta, threshold, direction) = match market {
                    MarketType::Moneyline => {
                        let book_prob = implied_probability(quote.price)?;
                        let ref_prob = implied_probability(reference.price)?;
                        let gap = book_prob - ref_prob;
                        // A book pricing the outcome below the reference's
                        // probability is offering better value on it.
                        let dir = if gap < Decimal::ZERO {
                            Direction::Up
                        } else {
                            Direction::Down
                        };
                        (gap.abs(), self.config.ml_prob_threshold, dir)
                    }
                    MarketType::Spread | MarketType::Total => {
                        let (book_point, ref_point) =
                            match (quote.line_value, reference.line_value) {
                                (Some(b), Some(r)) => (b, r),
                                _ => continue,
                            };
                        let gap = book_point - ref_point;
                        // More points than the reference gives = better value.
                        let dir = if gap > Decimal::ZERO {
                            Direction::Up
                        } else {
                            Direction::Down
                        };
                        (gap.abs(), self.config.spread_threshold, dir)
                    }
                };

                if delta < threshold {
                    continue;
                }

                let strength = (delta / (threshold * dec!(3))).min(Decimal::ONE);
                let summary = format!(
                    "Divergence: {bookmaker} has {outcome_label} ({market}) off the \
                     {} line by {delta}",
                    self.config.reference_book,
                );

                signals.push(Signal::new(
                    SignalType::PinnacleDivergence,
                    event_id,
                    quote.sport.clone(),
                    quote.home_team.clone(),
                    quote.away_team.clone(),
                    market,
                    outcome_label.clone(),
                    direction,
                    reference.line_value,
                    strength,
                    quote.observed_at,
                    vec![ContributingBook {
                        bookmaker: bookmaker.clone(),
                        from_price: reference.price,
                        to_price: quote.price,
                        from_point: reference.line_value,
                        to_point: quote.line_value,
                        observed_at: quote.observed_at,
                    }],
                    summary,
                ));
            }
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

    fn quote(
        bookmaker: &str,
        market: MarketType,
        outcome: &str,
        price: Decimal,
        point: Option<Decimal>,
    ) -> OddsQuote {
        OddsQuote {
            event_id: "evt1".to_string(),
            sport: "basketball_nba".to_string(),
            home_team: "Lakers".to_string(),
            away_team: "Celtics".to_string(),
            commence_time: ts(0) + Duration::hours(8),
            bookmaker: bookmaker.to_string(),
            market,
            outcome_label: outcome.to_string(),
            line_value: point,
            price,
            observed_at: ts(0),
        }
    }

    #[tokio::test]
    async fn test_spread_divergence_fires() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                quote("pinnacle", MarketType::Spread, "Lakers", dec!(-110), Some(dec!(-3.0))),
                quote("draftkings", MarketType::Spread, "Lakers", dec!(-110), Some(dec!(-4.5))),
            ])
            .await;

        let detector = PinnacleDivergenceDetector::new(DivergenceConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Spread)
            .await
            .unwrap();

        assert_eq!(signals.len(), 1);
        let sig = &signals[0];
        // DraftKings gives fewer points than the reference: worse value.
        assert_eq!(sig.direction, Direction::Down);
        assert_eq!(sig.line_value, Some(dec!(-3.0)));
        assert_eq!(sig.strength, dec!(1.5) / dec!(3.0));
    }

    #[tokio::test]
    async fn test_moneyline_divergence_in_probability_space() {
        let history = MemoryHistory::new();
        // Pinnacle -150 (0.600), DraftKings -120 (0.545...): gap > 0.04.
        history
            .insert(vec![
                quote("pinnacle", MarketType::Moneyline, "Lakers", dec!(-150), None),
                quote("draftkings", MarketType::Moneyline, "Lakers", dec!(-120), None),
            ])
            .await;

        let detector = PinnacleDivergenceDetector::new(DivergenceConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Moneyline)
            .await
            .unwrap();

        assert_eq!(signals.len(), 1);
        // The cheaper book offers better value on the outcome.
        assert_eq!(signals[0].direction, Direction::Up);
    }

    #[tokio::test]
    async fn test_small_gap_is_quiet() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                quote("pinnacle", MarketType::Spread, "Lakers", dec!(-110), Some(dec!(-3.0))),
                quote("draftkings", MarketType::Spread, "Lakers", dec!(-110), Some(dec!(-3.5))),
            ])
            .await;

        let detector = PinnacleDivergenceDetector::new(DivergenceConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Spread)
            .await
            .unwrap();
        assert!(signals.is_empty());
    }

    #[tokio::test]
    async fn test_no_reference_quote_is_no_signal() {
        let history = MemoryHistory::new();
        history
            .insert(vec![quote(
                "draftkings",
                MarketType::Spread,
                "Lakers",
                dec!(-110),
                Some(dec!(-8.0)),
            )])
            .await;

        let detector = PinnacleDivergenceDetector::new(DivergenceConfig::default());
        let signals = detector
            .detect(&history, "evt1", MarketType::Spread)
            .await
            .unwrap();
        assert!(signals.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_odds_propagate() {
        let history = MemoryHistory::new();
        history
            .insert(vec![
                quote("pinnacle", MarketType::Moneyline, "Lakers", dec!(0), None),
                quote("draftkings", MarketType::Moneyline, "Lakers", dec!(-120), None),
            ])
            .await;

        let detector = PinnacleDivergenceDetector::new(DivergenceConfig::default());
        let result = detector.detect(&history, "evt1", MarketType::Moneyline).await;
        assert!(result.is_err());
    }
}
