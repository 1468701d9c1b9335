//! Steam move detector
//!
//! Several distinct books moving a line the same direction inside a
//! trailing window is the classic footprint of sharp money hitting the
//! market at once.

use super::types::{ContributingBook, Signal, SignalType};
use super::window::{median_magnitude, moves_by_outcome, BookMove};
use super::Detector;
use crate::history::SnapshotHistory;
use crate::odds::{Direction, MarketType};
use async_trait::async_trait;
use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Configuration for steam move detection
#[derive(Debug, Clone)]
pub struct SteamConfig {
    /// Minimum distinct books moving the same direction (default: 3)
    pub min_books: usize,
    /// Trailing window in minutes (default: 30)
    pub window_minutes: i64,
}

impl Default for SteamConfig {
    fn default() -> Self {
        Self {
            min_books: 3,
            window_minutes: 30,
        }
    }
}

/// Detects synchronized line movement across books
pub struct SteamMoveDetector {
    config: SteamConfig,
}

impl SteamMoveDetector {
    pub fn new(config: SteamConfig) -> Self {
        Self { config }
    }

    /// Strength blends breadth (books beyond the minimum) with the median
    /// move magnitude, each normalized into [0, 1].
    fn strength(&self, aligned: &[&BookMove], market: MarketType) -> Decimal {
        let books_score = (Decimal::from(aligned.len())
            / Decimal::from(self.config.min_books + 2))
        .min(Decimal::ONE);

        let deltas: Vec<Decimal> = aligned.iter().map(|m| m.delta()).collect();
        let unit = match market {
            MarketType::Moneyline => dec!(40),
            MarketType::Spread | MarketType::Total => Decimal::ONE,
        };
        let move_score = (median_magnitude(&deltas) / unit).min(Decimal::ONE);

        dec!(0.6) * books_score + dec!(0.4) * move_score
    }
}

#[async_trait]
impl Detector for SteamMoveDetector {
    fn signal_type(&self) -> SignalType {
        SignalType::SteamMove
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

        let mut signals = Vec::new();

        let mut outcomes: Vec<(String, Vec<BookMove>)> =
            moves_by_outcome(&quotes).into_iter().collect();
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));

        for (outcome_label, moves) in outcomes {
            let up: Vec<&BookMove> = moves.iter().filter(|m| m.delta() > Decimal::ZERO).collect();
            let down: Vec<&BookMove> =
                moves.iter().filter(|m| m.delta() < Decimal::ZERO).collect();

            // Larger side wins; a dead-even split goes to the side with
            // the bigger median move.
            let aligned = match up.len().cmp(&down.len()) {
                std::cmp::Ordering::Greater => up,
                std::cmp::Ordering::Less => down,
                std::cmp::Ordering::Equal => {
                    let up_med =
                        median_magnitude(&up.iter().map(|m| m.delta()).collect::<Vec<_>>());
                    let down_med =
                        median_magnitude(&down.iter().map(|m| m.delta()).collect::<Vec<_>>());
                    if up_med >= down_med {
                        up
                    } else {
                        down
                    }
                }
            };

            if aligned.len() < self.config.min_books {
                continue;
            }

            let direction = match Direction::from_delta(aligned[0].delta()) {
                Some(d) => d,
                None => continue,
            };
            let strength = self.strength(&aligned, market);

            let meta = &aligned[0].last;
            let newest = aligned
                .iter()
                .max_by_key(|m| m.last.observed_at)
                .map(|m| &m.last)
                .unwrap_or(meta);

            let contributing: Vec<ContributingBook> = aligned
                .iter()
                .map(|m| ContributingBook {
                    bookmaker: m.bookmaker.clone(),
                    from_price: m.first.price,
                    to_price: m.last.price,
                    from_point: m.first.line_value,
                    to_point: m.last.line_value,
                    observed_at: m.last.observed_at,
                })
                .collect();

            let deltas: Vec<Decimal> = aligned.iter().map(|m| m.delta()).collect();
            let summary = format!(
                "Steam move {direction}: {} books moved {outcome_label} ({market}) median {}",
                aligned.len(),
                median_magnitude(&deltas),
            );

            signals.push(Signal::new(
                SignalType::SteamMove,
                event_id,
                meta.sport.clone(),
                meta.home_team.clone(),
                meta.away_team.clone(),
                market,
                outcome_label,
                direction,
                newest.line_value,
                strength,
                window_end,
                contributing,
                summary,
            ));
        }

        Ok(signals)
    }
}
