//! Alert cooldown state
//!
//! One entry per (event, signal type, market, outcome) holding the last
//! alert time. The claim is check-and-set in one critical section so two
//! concurrent passes can never both emit inside the window, and a claim
//! can be released to roll back a pass that fails after claiming.

use crate::detect::SignalType;
use crate::odds::MarketType;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Cooldown suppression key
pub type CooldownKey = (String, SignalType, MarketType, String);

/// Result of a cooldown claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Claimed: the entry now records the claim time. `previous` restores
    /// the prior state on release.
    Claimed {
        previous: Option<DateTime<Utc>>,
    },
    /// Still inside the window of the last alert
    Suppressed {
        last_alerted_at: DateTime<Utc>,
    },
}

/// Cooldown entry storage
#[async_trait]
pub trait CooldownStore: Send + Sync {
    /// Atomically check the key against the window and, if clear, record
    /// `now` as the last alert time.
    async fn try_claim(
        &self,
        key: &CooldownKey,
        now: DateTime<Utc>,
        window: Duration,
    ) -> anyhow::Result<ClaimOutcome>;

    /// Undo a successful claim, restoring the pre-claim entry
    async fn release(
        &self,
        key: &CooldownKey,
        previous: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()>;
}

/// Cooldown entries held in memory
#[derive(Default)]
pub struct MemoryCooldownStore {
    entries: Mutex<HashMap<CooldownKey, DateTime<Utc>>>,
}

impl MemoryCooldownStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CooldownStore for MemoryCooldownStore {
    async fn try_claim(
        &self,
        key: &CooldownKey,
        now: DateTime<Utc>,
        window: Duration,
    ) -> anyhow::Result<ClaimOutcome> {
        let mut entries = self.entries.lock().await;
        if let Some(&last_alerted_at) = entries.get(key) {
            if now - last_alerted_at < window {
                return Ok(ClaimOutcome::Suppressed { last_alerted_at });
            }
        }
        let previous = entries.insert(key.clone(), now);
        Ok(ClaimOutcome::Claimed { previous })
    }

    async fn release(
        &self,
        key: &CooldownKey,
        previous: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().await;
        match previous {
            Some(ts) => {
                entries.insert(key.clone(), ts);
            }
            None => {
                entries.remove(key);
            }
        }
        Ok(())
    }
}
