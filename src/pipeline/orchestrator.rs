//! Detection pass orchestration
//!
//! Runs every detector over every (event, market) touched at a tick,
//! annotates candidates with value bets, then applies the three filter
//! stages in order: strength cut, market-side dedup, cooldown dedup.
//! Survivors are persisted first and delivered second, so a failed
//! publish never loses the record.

use super::cooldown::{ClaimOutcome, CooldownStore};
use super::filter::{dedup_market_sides, FilterResult, StrengthFilter};
use crate::detect::{Detector, Signal, ValueScanner};
use crate::history::SnapshotHistory;
use crate::odds::MarketType;
use crate::store::{AlertSink, SignalStore};
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pipeline filter thresholds
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum strength a candidate needs to survive stage one
    pub min_signal_strength: Decimal,
    /// Cooldown window applied per (event, type, market, outcome)
    pub alert_cooldown_minutes: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_signal_strength: rust_decimal_macros::dec!(0.5),
            alert_cooldown_minutes: 60,
        }
    }
}

/// Counters for one detection pass
#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
    /// Signals that survived all three stages, in emission order
    pub emitted: Vec<Signal>,
    /// Raw candidates produced by the detectors
    pub candidates: usize,
    /// Dropped by the strength filter
    pub below_strength: usize,
    /// Dropped by market-side dedup
    pub deduped: usize,
    /// Dropped by cooldown dedup
    pub suppressed: usize,
    /// Detector invocations that errored and were skipped
    pub detector_errors: usize,
}

/// Sequences detectors and the filter stages over one tick
pub struct Pipeline {
    detectors: Vec<Box<dyn Detector>>,
    scanner: ValueScanner,
    strength: StrengthFilter,
    cooldown_window: Duration,
    cooldown: Arc<dyn CooldownStore>,
    store: Arc<dyn SignalStore>,
    sink: Arc<dyn AlertSink>,
}

impl Pipeline {
    /// Build a pipeline over an ordered detector set. Registration order
    /// is the dedup tiebreak of last resort, so it is part of the
    /// observable behavior.
    pub fn new(
        detectors: Vec<Box<dyn Detector>>,
        scanner: ValueScanner,
        config: PipelineConfig,
        cooldown: Arc<dyn CooldownStore>,
        store: Arc<dyn SignalStore>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            detectors,
            scanner,
            strength: StrengthFilter::new(config.min_signal_strength),
            cooldown_window: Duration::minutes(config.alert_cooldown_minutes),
            cooldown,
            store,
            sink,
        }
    }

    /// Run one detection pass over every event with quotes at `tick`.
    ///
    /// A failing detector invocation is skipped; a failing store write
    /// releases its cooldown claim and aborts the pass.
    pub async fn run_pass(
        &self,
        history: &dyn SnapshotHistory,
        tick: DateTime<Utc>,
    ) -> anyhow::Result<PassOutcome> {
        let mut outcome = PassOutcome::default();
        let events = history.events_at(tick).await?;

        let mut candidates = Vec::new();
        for event_id in &events {
            for market in MarketType::all() {
                for detector in &self.detectors {
                    match detector.detect(history, event_id, market).await {
                        Ok(signals) => candidates.extend(signals),
                        Err(e) => {
                            warn!(
                                event_id = %event_id,
                                market = %market,
                                signal_type = %detector.signal_type(),
                                error = %e,
                                "Detector invocation failed, skipping"
                            );
                            outcome.detector_errors += 1;
                        }
                    }
                }
            }
        }
        outcome.candidates = candidates.len();
        for signal in &candidates {
            counter!(
                "sharpline_candidates_total",
                "signal_type" => signal.signal_type.to_string()
            )
            .increment(1);
        }

        for signal in &mut candidates {
            if let Err(e) = self.scanner.annotate(history, signal).await {
                warn!(
                    signal_id = %signal.id,
                    error = %e,
                    "Value scan failed, emitting without value bets"
                );
                signal.value_bets.clear();
            }
        }

        // Stage 1: strength cut.
        let strong: Vec<Signal> = candidates
            .into_iter()
            .filter(|signal| match self.strength.apply(signal) {
                FilterResult::Pass => true,
                FilterResult::Reject(reason) => {
                    debug!(signal_id = %signal.id, ?reason, "Candidate rejected");
                    outcome.below_strength += 1;
                    counter!("sharpline_rejected_total", "stage" => "strength").increment(1);
                    false
                }
            })
            .collect();

        // Stage 2: market-side dedup.
        let before = strong.len();
        let survivors = dedup_market_sides(strong);
        outcome.deduped = before - survivors.len();
        counter!("sharpline_rejected_total", "stage" => "dedup")
            .increment(outcome.deduped as u64);

        // Stage 3: cooldown dedup, then persist and deliver.
        for signal in survivors {
            let key = signal.cooldown_key();
            let claim = self
                .cooldown
                .try_claim(&key, tick, self.cooldown_window)
                .await?;
            let previous = match claim {
                ClaimOutcome::Suppressed { last_alerted_at } => {
                    debug!(
                        signal_id = %signal.id,
                        %last_alerted_at,
                        "Candidate suppressed by cooldown"
                    );
                    outcome.suppressed += 1;
                    counter!("sharpline_rejected_total", "stage" => "cooldown").increment(1);
                    continue;
                }
                ClaimOutcome::Claimed { previous } => previous,
            };

            if let Err(e) = self.store.save(&signal).await {
                self.cooldown.release(&key, previous).await?;
                return Err(e);
            }
            if let Err(e) = self.sink.publish(&signal).await {
                warn!(signal_id = %signal.id, error = %e, "Alert delivery failed");
            }

            info!(
                signal_type = %signal.signal_type,
                event_id = %signal.event_id,
                market = %signal.market,
                outcome = %signal.outcome_label,
                strength = %signal.strength,
                "Signal emitted"
            );
            counter!(
                "sharpline_alerts_total",
                "signal_type" => signal.signal_type.to_string()
            )
            .increment(1);
            outcome.emitted.push(signal);
        }

        Ok(outcome)
    }
}
