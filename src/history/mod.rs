//! Snapshot history access
//!
//! The append-only quote archive the detectors read from. The storage
//! engine itself lives behind [`SnapshotHistory`]; the in-memory
//! implementation backs tests and backtest replay.

mod memory;

pub use memory::MemoryHistory;

use crate::odds::{MarketType, OddsQuote};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read-only access to the ordered quote archive.
///
/// All methods return quotes in non-decreasing `observed_at` order,
/// deduplicated by (bookmaker, observed_at) per outcome key.
#[async_trait]
pub trait SnapshotHistory: Send + Sync {
    /// All quotes for an event/market observed at or after `since`.
    async fn query(
        &self,
        event_id: &str,
        market: MarketType,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<OddsQuote>>;

    /// The most recent quote per (bookmaker, outcome) for an event/market.
    async fn latest(&self, event_id: &str, market: MarketType) -> anyhow::Result<Vec<OddsQuote>>;

    /// The quote immediately preceding `before` per (bookmaker, outcome).
    async fn previous(
        &self,
        event_id: &str,
        market: MarketType,
        before: DateTime<Utc>,
    ) -> anyhow::Result<Vec<OddsQuote>>;

    /// Distinct event ids with quotes observed at exactly `observed_at`.
    async fn events_at(&self, observed_at: DateTime<Utc>) -> anyhow::Result<Vec<String>>;
}
