//! Grading types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Final score for a completed event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScore {
    pub home_score: i64,
    pub away_score: i64,
}

impl FinalScore {
    pub fn combined(&self) -> i64 {
        self.home_score + self.away_score
    }
}

/// Resolution of a graded signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeOutcome {
    Won,
    Lost,
    Push,
    /// No meaningful resolution, e.g. a moneyline tie
    Void,
}

impl std::fmt::Display for GradeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GradeOutcome::Won => "won",
            GradeOutcome::Lost => "lost",
            GradeOutcome::Push => "push",
            GradeOutcome::Void => "void",
        };
        f.write_str(s)
    }
}

/// The one-and-only grading record for a signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingResult {
    pub signal_id: Uuid,
    pub outcome: GradeOutcome,
    pub final_score: FinalScore,
    pub resolved_at: DateTime<Utc>,
}

/// Source of final scores, consumed only by the grading engine
#[async_trait]
pub trait FinalScoreSource: Send + Sync {
    /// Final score for an event, or None while it is still unsettled
    async fn get(&self, event_id: &str) -> anyhow::Result<Option<FinalScore>>;
}

/// In-memory score source for tests and replay
#[derive(Default)]
pub struct MemoryScoreSource {
    scores: RwLock<HashMap<String, FinalScore>>,
}

impl MemoryScoreSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, event_id: impl Into<String>, score: FinalScore) {
        self.scores.write().await.insert(event_id.into(), score);
    }
}

#[async_trait]
impl FinalScoreSource for MemoryScoreSource {
    async fn get(&self, event_id: &str) -> anyhow::Result<Option<FinalScore>> {
        Ok(self.scores.read().await.get(event_id).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_score_source() {
        let source = MemoryScoreSource::new();
        assert!(source.get("evt1").await.unwrap().is_none());

        source
            .set(
                "evt1",
                FinalScore {
                    home_score: 110,
                    away_score: 98,
                },
            )
            .await;
        let score = source.get("evt1").await.unwrap().unwrap();
        assert_eq!(score.combined(), 208);
    }

    #[test]
    fn test_outcome_serde_names() {
        assert_eq!(
            serde_json::to_string(&GradeOutcome::Void).unwrap(),
            "\"void\""
        );
    }
}
