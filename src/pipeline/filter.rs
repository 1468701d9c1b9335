//! Candidate signal filtering
//!
//! Stages one and two of the pipeline filter: the strength cut and the
//! market-side dedup that collapses complementary sides of the same
//! market into a single alert.

use crate::detect::{Signal, SignalType};
use crate::odds::{Direction, MarketType};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Result of applying the strength filter to a candidate
#[derive(Debug, Clone)]
pub enum FilterResult {
    /// Candidate passed
    Pass,
    /// Candidate rejected
    Reject(RejectReason),
}

/// Reason a candidate was rejected
#[derive(Debug, Clone)]
pub enum RejectReason {
    /// Strength below the minimum threshold
    StrengthTooLow(Decimal),
}

/// Minimum-strength cut
pub struct StrengthFilter {
    min_strength: Decimal,
}

impl StrengthFilter {
    pub fn new(min_strength: Decimal) -> Self {
        Self { min_strength }
    }

    pub fn apply(&self, signal: &Signal) -> FilterResult {
        if signal.strength < self.min_strength {
            return FilterResult::Reject(RejectReason::StrengthTooLow(signal.strength));
        }
        FilterResult::Pass
    }
}

/// Whether a movement signal backs the side it was detected on.
///
/// Spread and moneyline value dropping means the market is moving toward
/// that side; a total backs Over on an upward line and Under on a
/// downward one. PinnacleDivergence and ExchangeMonitor record
/// reference-aligned directions where Up already marks the favored side.
/// Returns None when no directional policy exists for the label.
fn backs_own_side(signal: &Signal) -> Option<bool> {
    match signal.signal_type {
        SignalType::PinnacleDivergence | SignalType::ExchangeMonitor => {
            Some(signal.direction == Direction::Up)
        }
        _ => match signal.market {
            MarketType::Spread | MarketType::Moneyline => {
                Some(signal.direction == Direction::Down)
            }
            MarketType::Total => match signal.outcome_label.to_ascii_lowercase().as_str() {
                "over" => Some(signal.direction == Direction::Up),
                "under" => Some(signal.direction == Direction::Down),
                _ => None,
            },
        },
    }
}

/// Collapse complementary sides of the same market, keeping exactly one
/// candidate per (event, signal type, market).
///
/// The keeper is the side its own movement backs; with no resolvable
/// directional tiebreak the higher strength wins, and a remaining tie
/// keeps the candidate encountered first. Output preserves the surviving
/// candidates' original order.
pub fn dedup_market_sides(candidates: Vec<Signal>) -> Vec<Signal> {
    let mut keeper: HashMap<(String, SignalType, MarketType), usize> = HashMap::new();

    for (idx, signal) in candidates.iter().enumerate() {
        let key = (
            signal.event_id.clone(),
            signal.signal_type,
            signal.market,
        );
        match keeper.get(&key) {
            None => {
                keeper.insert(key, idx);
            }
            Some(&held) => {
                if prefer_challenger(&candidates[held], signal) {
                    keeper.insert(key, idx);
                }
            }
        }
    }

    let mut kept: Vec<usize> = keeper.into_values().collect();
    kept.sort_unstable();
    let mut kept = kept.into_iter().peekable();

    candidates
        .into_iter()
        .enumerate()
        .filter_map(|(idx, signal)| {
            if kept.peek() == Some(&idx) {
                kept.next();
                Some(signal)
            } else {
                None
            }
        })
        .collect()
}

fn prefer_challenger(held: &Signal, challenger: &Signal) -> bool {
    let held_backed = backs_own_side(held) == Some(true);
    let challenger_backed = backs_own_side(challenger) == Some(true);
    if held_backed != challenger_backed {
        return challenger_backed;
    }
    // Strict: an equal-strength challenger never displaces the holder.
    challenger.strength > held.strength
}
