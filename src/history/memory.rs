//! In-memory snapshot history

use super::SnapshotHistory;
use crate::odds::{MarketType, OddsQuote};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

/// Append-only quote archive held in memory.
///
/// Backs unit tests and backtest replay; the live deployment puts the
/// durable store behind the same trait.
#[derive(Default)]
pub struct MemoryHistory {
    quotes: RwLock<Vec<OddsQuote>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append quotes, ignoring duplicates on
    /// (event, bookmaker, market, outcome, observed_at). Returns the
    /// number actually inserted.
    pub async fn insert(&self, rows: Vec<OddsQuote>) -> usize {
        let mut quotes = self.quotes.write().await;
        let mut seen: BTreeSet<(String, String, String, String, DateTime<Utc>)> = quotes
            .iter()
            .map(|q| {
                (
                    q.event_id.clone(),
                    q.bookmaker.clone(),
                    q.market.to_string(),
                    q.outcome_label.clone(),
                    q.observed_at,
                )
            })
            .collect();

        let mut inserted = 0;
        for row in rows {
            let key = (
                row.event_id.clone(),
                row.bookmaker.clone(),
                row.market.to_string(),
                row.outcome_label.clone(),
                row.observed_at,
            );
            if seen.insert(key) {
                quotes.push(row);
                inserted += 1;
            }
        }
        quotes.sort_by_key(|q| q.observed_at);
        inserted
    }

    /// Total stored quote count
    pub async fn len(&self) -> usize {
        self.quotes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.quotes.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotHistory for MemoryHistory {
    async fn query(
        &self,
        event_id: &str,
        market: MarketType,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<OddsQuote>> {
        let quotes = self.quotes.read().await;
        Ok(quotes
            .iter()
            .filter(|q| q.event_id == event_id && q.market == market && q.observed_at >= since)
            .cloned()
            .collect())
    }

    async fn latest(&self, event_id: &str, market: MarketType) -> anyhow::Result<Vec<OddsQuote>> {
        let quotes = self.quotes.read().await;
        let mut newest: HashMap<(String, String), OddsQuote> = HashMap::new();
        for q in quotes
            .iter()
            .filter(|q| q.event_id == event_id && q.market == market)
        {
            let key = (q.bookmaker.clone(), q.outcome_label.clone());
            match newest.get(&key) {
                Some(existing) if existing.observed_at >= q.observed_at => {}
                _ => {
                    newest.insert(key, q.clone());
                }
            }
        }
        let mut rows: Vec<OddsQuote> = newest.into_values().collect();
        rows.sort_by_key(|q| q.observed_at);
        Ok(rows)
    }

    async fn previous(
        &self,
        event_id: &str,
        market: MarketType,
        before: DateTime<Utc>,
    ) -> anyhow::Result<Vec<OddsQuote>> {
        let quotes = self.quotes.read().await;
        let mut newest: HashMap<(String, String), OddsQuote> = HashMap::new();
        for q in quotes.iter().filter(|q| {
            q.event_id == event_id && q.market == market && q.observed_at < before
        }) {
            let key = (q.bookmaker.clone(), q.outcome_label.clone());
            match newest.get(&key) {
                Some(existing) if existing.observed_at >= q.observed_at => {}
                _ => {
                    newest.insert(key, q.clone());
                }
            }
        }
        let mut rows: Vec<OddsQuote> = newest.into_values().collect();
        rows.sort_by_key(|q| q.observed_at);
        Ok(rows)
    }

    async fn events_at(&self, observed_at: DateTime<Utc>) -> anyhow::Result<Vec<String>> {
        let quotes = self.quotes.read().await;
        let mut ids: Vec<String> = Vec::new();
        for q in quotes.iter().filter(|q| q.observed_at == observed_at) {
            if !ids.contains(&q.event_id) {
                ids.push(q.event_id.clone());
            }
        }
        Ok(ids)
    }
}
