//! Backtesting module
//!
//! Replays recorded odds snapshots through the full detection pipeline
//! tick by tick, grades the emitted signals against final scores, and
//! reports per-signal-type performance.

mod replay;
mod summary;

pub use replay::{ReplayEngine, ReplayReport};
pub use summary::{PerformanceSummary, TypePerformance};
