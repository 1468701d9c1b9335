//! Signal persistence and alert delivery boundaries
//!
//! The durable store and the alert channel live behind these traits; the
//! in-memory implementations back tests and backtest replay.

mod memory;

pub use memory::{CollectingAlertSink, MemorySignalStore};

use crate::detect::Signal;
use crate::grading::GradingResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Durable signal persistence. Both writes are idempotent keyed by
/// signal id: replaying a save must not duplicate or overwrite.
#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn save(&self, signal: &Signal) -> anyhow::Result<()>;
    async fn save_grading(&self, result: &GradingResult) -> anyhow::Result<()>;
    /// Signals without a grading record yet
    async fn unresolved(&self) -> anyhow::Result<Vec<Signal>>;
    async fn grading_for(&self, signal_id: Uuid) -> anyhow::Result<Option<GradingResult>>;
    async fn gradings(&self) -> anyhow::Result<Vec<GradingResult>>;
}

/// Alert delivery channel. Fire-and-forget from the pipeline's
/// perspective: a failed publish is reported but never blocks signal
/// persistence.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn publish(&self, signal: &Signal) -> anyhow::Result<()>;
}

/// Sink that just logs each alert
pub struct LogAlertSink;

#[async_trait]
impl AlertSink for LogAlertSink {
    async fn publish(&self, signal: &Signal) -> anyhow::Result<()> {
        tracing::info!(
            signal_type = %signal.signal_type,
            event_id = %signal.event_id,
            outcome = %signal.outcome_label,
            strength = %signal.strength,
            summary = %signal.summary,
            "Alert"
        );
        Ok(())
    }
}
