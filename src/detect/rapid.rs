//! Rapid change detector
//!
//! A single book moving a line by a large amount between consecutive
//! polls fires on its own, no consensus required. That is what separates
//! this from a steam move.

use super::types::{ContributingBook, Signal, SignalType};
use super::Detector;
use crate::history::SnapshotHistory;
use crate::odds::{Direction, MarketType, OddsQuote};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Configuration for rapid change detection
#[derive(Debug, Clone)]
pub struct RapidChangeConfig {
    /// Minimum point move on spread/total markets (default: 0.5)
    pub spread_threshold: Decimal,
    /// Minimum cents move on moneyline markets (default: 20)
    pub ml_threshold: Decimal,
}

impl Default for RapidChangeConfig {
    fn default() -> Self {
        Self {
            spread_threshold: dec!(0.5),
            ml_threshold: dec!(20),
        }
    }
}

/// Detects sharp single-book moves between the two most recent quotes
pub struct RapidChangeDetector {
    config: RapidChangeConfig,
}

impl RapidChangeDetector {
    pub fn new(config: RapidChangeConfig) -> Self {
        Self { config }
    }

    fn threshold(&self, market: MarketType) -> Decimal {
        match market {
            MarketType::Moneyline => self.config.ml_threshold,
            MarketType::Spread | MarketType::Total => self.config.spread_threshold,
        }
    }
}

#[async_trait]
impl Detector for RapidChangeDetector {
    fn signal_type(&self) -> SignalType {
        SignalType::RapidChange
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
        let previous = history.previous(event_id, market, window_end).await?;
        if previous.is_empty() {
            return Ok(vec![]);
        }

        let prev_map: HashMap<(String, String), &OddsQuote> = previous
            .iter()
            .map(|q| ((q.bookmaker.clone(), q.outcome_label.clone()), q))
            .collect();

        let threshold = self.threshold(market);
        let mut signals = Vec::new();

        for quote in &latest {
            let prev = match prev_map.get(&(quote.bookmaker.clone(), quote.outcome_label.clone()))
            {
                Some(p) => *p,
                None => continue,
            };

            // Spread/total moves are judged on the point; skip pairs where
            // either side lacks one.
            if market.uses_points() && (quote.line_value.is_none() || prev.line_value.is_none()) {
                continue;
            }

            let delta = quote.tracked_value() - prev.tracked_value();
            if delta.abs() < threshold {
                continue;
            }
            let direction = match Direction::from_delta(delta) {
                Some(d) => d,
                None => continue,
            };

            let strength = (delta.abs() / (threshold * dec!(3))).min(Decimal::ONE);

            let summary = format!(
                "Rapid change at {}: {} ({market}) moved {direction} by {}",
                quote.bookmaker,
                quote.outcome_label,
                delta.abs(),
            );

            signals.push(Signal::new(
                SignalType::RapidChange,
                event_id,
                quote.sport.clone(),
                quote.home_team.clone(),
                quote.away_team.clone(),
                market,
                quote.outcome_label.clone(),
                direction,
                quote.line_value,
                strength,
                quote.observed_at,
                vec![ContributingBook {
                    bookmaker: quote.bookmaker.clone(),
                    from_price: prev.price,
                    to_price: quote.price,
                    from_point: prev.line_value,
                    to_point: quote.line_value,
                    observed_at: quote.observed_at,
                }],
                summary,
            ));
        }

        Ok(signals)
    }
}
