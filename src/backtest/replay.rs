//! Snapshot replay
//!
//! Feeds recorded quotes into an in-memory history in observed-at order
//! and runs a detection pass at every distinct tick, exactly as the live
//! poller would have seen them. Grading runs once at the end.

use super::summary::PerformanceSummary;
use crate::detect::{Detector, Signal, ValueScanner};
use crate::grading::{FinalScore, Grader, GradingResult, GradingSummary, MemoryScoreSource};
use crate::history::MemoryHistory;
use crate::odds::OddsQuote;
use crate::pipeline::{MemoryCooldownStore, Pipeline, PipelineConfig};
use crate::store::{LogAlertSink, MemorySignalStore, SignalStore};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Outcome of a full replay
#[derive(Debug, Clone)]
pub struct ReplayReport {
    /// Distinct detection ticks replayed
    pub ticks: usize,
    /// Alerts emitted across all passes, in emission order
    pub emitted: Vec<Signal>,
    /// Grading records written at the end of the replay
    pub gradings: Vec<GradingResult>,
    /// Grading pass counters
    pub grading: GradingSummary,
    /// Win/loss breakdown per signal type
    pub summary: PerformanceSummary,
}

/// Replays a snapshot archive through the pipeline
pub struct ReplayEngine {
    pipeline: Pipeline,
    store: Arc<MemorySignalStore>,
    scores: Arc<MemoryScoreSource>,
}

impl ReplayEngine {
    /// Build a replay over an ordered detector set with fresh in-memory
    /// state, so consecutive replays never share cooldown entries.
    pub fn new(
        detectors: Vec<Box<dyn Detector>>,
        scanner: ValueScanner,
        config: PipelineConfig,
    ) -> Self {
        let store = Arc::new(MemorySignalStore::new());
        let pipeline = Pipeline::new(
            detectors,
            scanner,
            config,
            Arc::new(MemoryCooldownStore::new()),
            store.clone(),
            Arc::new(LogAlertSink),
        );
        Self {
            pipeline,
            store,
            scores: Arc::new(MemoryScoreSource::new()),
        }
    }

    /// Replay quotes tick by tick, then grade against the final scores.
    pub async fn run(
        self,
        quotes: Vec<OddsQuote>,
        final_scores: HashMap<String, FinalScore>,
    ) -> anyhow::Result<ReplayReport> {
        let mut ticks: Vec<DateTime<Utc>> = quotes.iter().map(|q| q.observed_at).collect();
        ticks.sort_unstable();
        ticks.dedup();

        let history = MemoryHistory::new();
        let mut by_tick: HashMap<DateTime<Utc>, Vec<OddsQuote>> = HashMap::new();
        for quote in quotes {
            by_tick.entry(quote.observed_at).or_default().push(quote);
        }

        let mut emitted = Vec::new();
        for tick in &ticks {
            if let Some(batch) = by_tick.remove(tick) {
                history.insert(batch).await;
            }
            let pass = self.pipeline.run_pass(&history, *tick).await?;
            emitted.extend(pass.emitted);
        }
        info!(
            ticks = ticks.len(),
            emitted = emitted.len(),
            "Replay detection complete"
        );

        for (event_id, score) in final_scores {
            self.scores.set(event_id, score).await;
        }
        let resolved_at = ticks.last().copied().unwrap_or_else(Utc::now);
        let grader = Grader::new(self.scores.clone(), self.store.clone());
        let grading = grader.resolve_all(resolved_at).await?;

        let gradings = self.store.gradings().await?;
        let summary = PerformanceSummary::build(&emitted, &gradings);

        Ok(ReplayReport {
            ticks: ticks.len(),
            emitted,
            gradings,
            grading,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{SignalType, SteamConfig, SteamMoveDetector, ValueScannerConfig};
    use crate::grading::GradeOutcome;
    use crate::odds::MarketType;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, minute, 0).unwrap()
    }

    fn spread(bookmaker: &str, outcome: &str, point: Decimal, minute: u32) -> OddsQuote {
        OddsQuote {
            event_id: "evt1".to_string(),
            sport: "basketball_nba".to_string(),
            home_team: "Lakers".to_string(),
            away_team: "Celtics".to_string(),
            commence_time: ts(0) + Duration::hours(8),
            bookmaker: bookmaker.to_string(),
            market: MarketType::Spread,
            outcome_label: outcome.to_string(),
            line_value: Some(point),
            price: dec!(-110),
            observed_at: ts(minute),
        }
    }

    #[tokio::test]
    async fn test_replay_detects_and_grades() {
        let mut quotes = Vec::new();
        for book in ["draftkings", "fanduel", "betmgm"] {
            quotes.push(spread(book, "Lakers", dec!(-4.0), 0));
            quotes.push(spread(book, "Lakers", dec!(-4.5), 20));
        }

        let engine = ReplayEngine::new(
            vec![Box::new(SteamMoveDetector::new(SteamConfig::default()))],
            ValueScanner::new(ValueScannerConfig::default()),
            PipelineConfig::default(),
        );
        let scores = HashMap::from([(
            "evt1".to_string(),
            FinalScore {
                home_score: 110,
                away_score: 98,
            },
        )]);
        let report = engine.run(quotes, scores).await.unwrap();

        assert_eq!(report.ticks, 2);
        assert_eq!(report.emitted.len(), 1);
        assert_eq!(report.emitted[0].signal_type, SignalType::SteamMove);
        assert_eq!(report.grading.resolved, 1);
        // Lakers -4.5, won by 12: covered.
        assert_eq!(report.gradings[0].outcome, GradeOutcome::Won);

        let row = report.summary.row(SignalType::SteamMove).unwrap();
        assert_eq!(row.won, 1);
        assert_eq!(row.total, 1);
    }

    #[tokio::test]
    async fn test_replay_without_scores_leaves_unresolved() {
        let mut quotes = Vec::new();
        for book in ["draftkings", "fanduel", "betmgm"] {
            quotes.push(spread(book, "Lakers", dec!(-4.0), 0));
            quotes.push(spread(book, "Lakers", dec!(-4.5), 20));
        }

        let engine = ReplayEngine::new(
            vec![Box::new(SteamMoveDetector::new(SteamConfig::default()))],
            ValueScanner::new(ValueScannerConfig::default()),
            PipelineConfig::default(),
        );
        let report = engine.run(quotes, HashMap::new()).await.unwrap();

        assert_eq!(report.emitted.len(), 1);
        assert_eq!(report.grading.resolved, 0);
        assert_eq!(report.grading.skipped, 1);
        assert!(report.gradings.is_empty());
    }
}
