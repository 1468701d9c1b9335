//! Replay command implementation

use crate::backtest::ReplayEngine;
use crate::config::Config;
use crate::detect::ValueScanner;
use crate::grading::FinalScore;
use crate::odds::OddsQuote;
use clap::Args;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON file with recorded odds quotes
    #[arg(long)]
    pub snapshots: PathBuf,

    /// JSON file mapping event ids to final scores
    #[arg(long)]
    pub scores: Option<PathBuf>,

    /// Output format: json or table
    #[arg(long, default_value = "table")]
    pub format: String,
}

impl ReplayArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let quotes = load_quotes(&self.snapshots)?;
        let scores = match &self.scores {
            Some(path) => load_scores(path)?,
            None => HashMap::new(),
        };
        tracing::info!(
            quotes = quotes.len(),
            events_with_scores = scores.len(),
            "Starting replay"
        );

        let engine = ReplayEngine::new(
            config.build_detectors(),
            ValueScanner::new(config.value_scanner_config()),
            config.pipeline_config(),
        );
        let report = engine.run(quotes, scores).await?;

        if self.format == "json" {
            println!("{}", serde_json::to_string_pretty(&report.emitted)?);
        } else {
            println!(
                "Replayed {} ticks, emitted {} signals, graded {}",
                report.ticks,
                report.emitted.len(),
                report.grading.resolved
            );
            if !report.summary.is_empty() {
                println!("{}", report.summary.format_table());
            }
        }
        Ok(())
    }
}

fn load_quotes(path: &Path) -> anyhow::Result<Vec<OddsQuote>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn load_scores(path: &Path) -> anyhow::Result<HashMap<String, FinalScore>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
