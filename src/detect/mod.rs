//! Detection strategies
//!
//! Five independent detectors share one contract: a pure read of the
//! snapshot history for an (event, market) key yielding zero or more
//! candidate signals. Detectors never observe each other's output, and
//! insufficient data is an empty list, never an error.

mod divergence;
mod exchange;
mod rapid;
mod reverse;
mod steam;
mod types;
mod value;
mod window;

pub use divergence::{DivergenceConfig, PinnacleDivergenceDetector};
pub use exchange::{ExchangeMonitorConfig, ExchangeMonitorDetector};
pub use rapid::{RapidChangeConfig, RapidChangeDetector};
pub use reverse::{ReverseLineConfig, ReverseLineMovementDetector};
pub use steam::{SteamConfig, SteamMoveDetector};
pub use types::{ContributingBook, Signal, SignalType, ValueBet};
pub use value::{ValueScanner, ValueScannerConfig};

use crate::history::SnapshotHistory;
use crate::odds::MarketType;
use async_trait::async_trait;

/// Shared contract for all detection strategies.
///
/// `detect` is side-effect free and callable for any (event, market) key
/// in any order. Odds-math failures propagate as errors and are caught at
/// the pipeline boundary, which skips that single invocation.
#[async_trait]
pub trait Detector: Send + Sync {
    /// The signal type this detector produces
    fn signal_type(&self) -> SignalType;

    /// Analyze the history for one event/market and return any signals
    async fn detect(
        &self,
        history: &dyn SnapshotHistory,
        event_id: &str,
        market: MarketType,
    ) -> anyhow::Result<Vec<Signal>>;
}
