//! In-memory store and sink implementations

use super::{AlertSink, SignalStore};
use crate::detect::Signal;
use crate::grading::GradingResult;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Signal store held in memory, insert-or-ignore on signal id
#[derive(Default)]
pub struct MemorySignalStore {
    signals: RwLock<Vec<Signal>>,
    gradings: RwLock<HashMap<Uuid, GradingResult>>,
}

impl MemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn signals(&self) -> Vec<Signal> {
        self.signals.read().await.clone()
    }
}

#[async_trait]
impl SignalStore for MemorySignalStore {
    async fn save(&self, signal: &Signal) -> anyhow::Result<()> {
        let mut signals = self.signals.write().await;
        if !signals.iter().any(|s| s.id == signal.id) {
            signals.push(signal.clone());
        }
        Ok(())
    }

    async fn save_grading(&self, result: &GradingResult) -> anyhow::Result<()> {
        let mut gradings = self.gradings.write().await;
        // First write wins: an existing result is never changed.
        gradings.entry(result.signal_id).or_insert_with(|| result.clone());
        Ok(())
    }

    async fn unresolved(&self) -> anyhow::Result<Vec<Signal>> {
        let signals = self.signals.read().await;
        let gradings = self.gradings.read().await;
        Ok(signals
            .iter()
            .filter(|s| !gradings.contains_key(&s.id))
            .cloned()
            .collect())
    }

    async fn grading_for(&self, signal_id: Uuid) -> anyhow::Result<Option<GradingResult>> {
        Ok(self.gradings.read().await.get(&signal_id).cloned())
    }

    async fn gradings(&self) -> anyhow::Result<Vec<GradingResult>> {
        Ok(self.gradings.read().await.values().cloned().collect())
    }
}

/// Sink that collects published alerts for inspection in tests
#[derive(Default)]
pub struct CollectingAlertSink {
    alerts: RwLock<Vec<Signal>>,
}

impl CollectingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn alerts(&self) -> Vec<Signal> {
        self.alerts.read().await.clone()
    }
}

#[async_trait]
impl AlertSink for CollectingAlertSink {
    async fn publish(&self, signal: &Signal) -> anyhow::Result<()> {
        self.alerts.write().await.push(signal.clone());
        Ok(())
    }
}
