//! Grading engine
//!
//! Walks the unresolved signals, fetches final scores, and writes one
//! grading record per signal. Re-running a pass never regrades.

use super::types::{FinalScore, FinalScoreSource, GradeOutcome, GradingResult};
use crate::detect::Signal;
use crate::odds::MarketType;
use crate::store::SignalStore;
use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

/// Counters for one grading pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradingSummary {
    /// Signals graded this pass
    pub resolved: usize,
    /// Signals left unresolved (no score yet, or ungradeable)
    pub skipped: usize,
    /// Score lookups or store writes that failed
    pub errors: usize,
}

/// Resolves unresolved signals against final scores
pub struct Grader {
    scores: Arc<dyn FinalScoreSource>,
    store: Arc<dyn SignalStore>,
}

impl Grader {
    pub fn new(scores: Arc<dyn FinalScoreSource>, store: Arc<dyn SignalStore>) -> Self {
        Self { scores, store }
    }

    /// Grade every unresolved signal whose event has a final score.
    /// One failing signal never aborts the pass.
    pub async fn resolve_all(&self, now: DateTime<Utc>) -> anyhow::Result<GradingSummary> {
        let mut summary = GradingSummary::default();

        for signal in self.store.unresolved().await? {
            let score = match self.scores.get(&signal.event_id).await {
                Ok(Some(score)) => score,
                Ok(None) => {
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(event_id = %signal.event_id, error = %e, "Score lookup failed");
                    summary.errors += 1;
                    continue;
                }
            };

            let Some(outcome) = grade(&signal, score) else {
                debug!(
                    signal_id = %signal.id,
                    market = %signal.market,
                    "Signal not gradeable, leaving unresolved"
                );
                summary.skipped += 1;
                continue;
            };

            let result = GradingResult {
                signal_id: signal.id,
                outcome,
                final_score: score,
                resolved_at: now,
            };
            match self.store.save_grading(&result).await {
                Ok(()) => {
                    debug!(signal_id = %signal.id, outcome = %outcome, "Graded signal");
                    counter!("sharpline_gradings_total", "outcome" => outcome.to_string())
                        .increment(1);
                    summary.resolved += 1;
                }
                Err(e) => {
                    warn!(signal_id = %signal.id, error = %e, "Failed to persist grading");
                    summary.errors += 1;
                }
            }
        }

        Ok(summary)
    }
}

/// Grade a signal against the final score, always using the line the
/// signal was detected at. Returns None when the signal carries no line
/// on a market that needs one.
pub fn grade(signal: &Signal, score: FinalScore) -> Option<GradeOutcome> {
    match signal.market {
        MarketType::Moneyline => Some(grade_moneyline(signal, score)),
        MarketType::Spread => grade_spread(signal, score),
        MarketType::Total => grade_total(signal, score),
    }
}

fn grade_moneyline(signal: &Signal, score: FinalScore) -> GradeOutcome {
    let margin = if signal.outcome_label == signal.home_team {
        score.home_score - score.away_score
    } else if signal.outcome_label == signal.away_team {
        score.away_score - score.home_score
    } else {
        // Outcome names neither side; nothing to settle against.
        return GradeOutcome::Void;
    };

    match margin {
        m if m > 0 => GradeOutcome::Won,
        m if m < 0 => GradeOutcome::Lost,
        _ => GradeOutcome::Void,
    }
}

fn grade_spread(signal: &Signal, score: FinalScore) -> Option<GradeOutcome> {
    let line = signal.line_value?;
    let margin = if signal.outcome_label == signal.home_team {
        score.home_score - score.away_score
    } else if signal.outcome_label == signal.away_team {
        score.away_score - score.home_score
    } else {
        return Some(GradeOutcome::Void);
    };

    let adjusted = Decimal::from(margin) + line;
    Some(if adjusted > Decimal::ZERO {
        GradeOutcome::Won
    } else if adjusted < Decimal::ZERO {
        GradeOutcome::Lost
    } else {
        GradeOutcome::Push
    })
}

fn grade_total(signal: &Signal, score: FinalScore) -> Option<GradeOutcome> {
    let line = signal.line_value?;
    let combined = Decimal::from(score.combined());

    let label = signal.outcome_label.to_ascii_lowercase();
    let outcome = if combined == line {
        GradeOutcome::Push
    } else if label == "over" {
        if combined > line {
            GradeOutcome::Won
        } else {
            GradeOutcome::Lost
        }
    } else if label == "under" {
        if combined < line {
            GradeOutcome::Won
        } else {
            GradeOutcome::Lost
        }
    } else {
        GradeOutcome::Void
    };
    Some(outcome)
}
