//! Grade command implementation

use crate::backtest::PerformanceSummary;
use crate::detect::Signal;
use crate::grading::{FinalScore, Grader, MemoryScoreSource};
use crate::store::{MemorySignalStore, SignalStore};
use chrono::Utc;
use clap::Args;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct GradeArgs {
    /// JSON file with previously emitted signals
    #[arg(long)]
    pub signals: PathBuf,

    /// JSON file mapping event ids to final scores
    #[arg(long)]
    pub scores: PathBuf,
}

impl GradeArgs {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let content = std::fs::read_to_string(&self.signals)?;
        let signals: Vec<Signal> = serde_json::from_str(&content)?;
        let content = std::fs::read_to_string(&self.scores)?;
        let final_scores: HashMap<String, FinalScore> = serde_json::from_str(&content)?;

        let store = Arc::new(MemorySignalStore::new());
        for signal in &signals {
            store.save(signal).await?;
        }
        let scores = Arc::new(MemoryScoreSource::new());
        for (event_id, score) in final_scores {
            scores.set(event_id, score).await;
        }

        let grader = Grader::new(scores, store.clone());
        let summary = grader.resolve_all(Utc::now()).await?;
        println!(
            "Graded {} signals ({} skipped, {} errors)",
            summary.resolved, summary.skipped, summary.errors
        );

        let gradings = store.gradings().await?;
        let performance = PerformanceSummary::build(&signals, &gradings);
        if !performance.is_empty() {
            println!("{}", performance.format_table());
        }
        Ok(())
    }
}
