//! Replay performance reporting

use crate::detect::{Signal, SignalType};
use crate::grading::{GradeOutcome, GradingResult};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Win/loss record for one signal type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePerformance {
    pub total: usize,
    pub won: usize,
    pub lost: usize,
    pub push: usize,
    pub void: usize,
    pub unresolved: usize,
}

impl TypePerformance {
    /// Won over decided (won + lost); pushes and voids sit out
    pub fn win_rate(&self) -> Option<Decimal> {
        let decided = self.won + self.lost;
        if decided == 0 {
            return None;
        }
        Some(Decimal::from(self.won as u64) / Decimal::from(decided as u64))
    }
}

/// Per-signal-type breakdown of graded replay results
#[derive(Debug, Clone, Default)]
pub struct PerformanceSummary {
    rows: BTreeMap<SignalType, TypePerformance>,
}

impl PerformanceSummary {
    /// Join emitted signals against their grading records
    pub fn build(signals: &[Signal], gradings: &[GradingResult]) -> Self {
        let by_id: BTreeMap<Uuid, GradeOutcome> =
            gradings.iter().map(|g| (g.signal_id, g.outcome)).collect();

        let mut rows: BTreeMap<SignalType, TypePerformance> = BTreeMap::new();
        for signal in signals {
            let row = rows.entry(signal.signal_type).or_default();
            row.total += 1;
            match by_id.get(&signal.id) {
                Some(GradeOutcome::Won) => row.won += 1,
                Some(GradeOutcome::Lost) => row.lost += 1,
                Some(GradeOutcome::Push) => row.push += 1,
                Some(GradeOutcome::Void) => row.void += 1,
                None => row.unresolved += 1,
            }
        }
        Self { rows }
    }

    pub fn row(&self, signal_type: SignalType) -> Option<&TypePerformance> {
        self.rows.get(&signal_type)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let mut out = String::from(
            "\n═══════════════════════════════════════════════════════════════\n\
             SIGNAL PERFORMANCE\n\
             ═══════════════════════════════════════════════════════════════\n",
        );
        out.push_str(&format!(
            "{:<22} {:>5} {:>5} {:>5} {:>5} {:>5} {:>8}\n",
            "Type", "Total", "Won", "Lost", "Push", "Void", "Win%"
        ));
        out.push_str(
            "───────────────────────────────────────────────────────────────\n",
        );
        for (signal_type, row) in &self.rows {
            let win_rate = row
                .win_rate()
                .map(|r| format!("{:.1}", r * Decimal::from(100)))
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "{:<22} {:>5} {:>5} {:>5} {:>5} {:>5} {:>8}\n",
                signal_type.to_string(),
                row.total,
                row.won,
                row.lost,
                row.push,
                row.void,
                win_rate,
            ));
        }
        out.push_str(
            "═══════════════════════════════════════════════════════════════\n",
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::FinalScore;
    use crate::odds::{Direction, MarketType};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn signal(signal_type: SignalType) -> Signal {
        Signal::new(
            signal_type,
            "evt1",
            "basketball_nba",
            "Lakers",
            "Celtics",
            MarketType::Spread,
            "Lakers",
            Direction::Down,
            Some(dec!(-4.0)),
            dec!(0.7),
            Utc::now(),
            vec![],
            "test",
        )
    }

    fn grading(signal: &Signal, outcome: GradeOutcome) -> GradingResult {
        GradingResult {
            signal_id: signal.id,
            outcome,
            final_score: FinalScore {
                home_score: 110,
                away_score: 98,
            },
            resolved_at: Utc::now(),
        }
    }

    #[test]
    fn test_win_rate_ignores_pushes() {
        let signals = vec![
            signal(SignalType::SteamMove),
            signal(SignalType::SteamMove),
            signal(SignalType::SteamMove),
        ];
        let gradings = vec![
            grading(&signals[0], GradeOutcome::Won),
            grading(&signals[1], GradeOutcome::Lost),
            grading(&signals[2], GradeOutcome::Push),
        ];

        let summary = PerformanceSummary::build(&signals, &gradings);
        let row = summary.row(SignalType::SteamMove).unwrap();
        assert_eq!(row.total, 3);
        assert_eq!(row.push, 1);
        assert_eq!(row.win_rate(), Some(dec!(0.5)));
    }

    #[test]
    fn test_ungraded_signals_counted_unresolved() {
        let signals = vec![signal(SignalType::RapidChange)];
        let summary = PerformanceSummary::build(&signals, &[]);
        let row = summary.row(SignalType::RapidChange).unwrap();
        assert_eq!(row.unresolved, 1);
        assert_eq!(row.win_rate(), None);
    }

    #[test]
    fn test_format_table_lists_each_type() {
        let signals = vec![signal(SignalType::SteamMove)];
        let gradings = vec![grading(&signals[0], GradeOutcome::Won)];
        let table = PerformanceSummary::build(&signals, &gradings).format_table();
        assert!(table.contains("steam_move"));
        assert!(table.contains("100.0"));
    }
}
