//! Windowed per-book movement aggregation shared by the trailing-window
//! detectors.

use crate::odds::OddsQuote;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// A single book's net move over the window: first and last quote for one
/// (bookmaker, outcome) key.
#[derive(Debug, Clone)]
pub struct BookMove {
    pub bookmaker: String,
    pub first: OddsQuote,
    pub last: OddsQuote,
}

impl BookMove {
    /// Net change of the tracked value (point for spread/total, price for
    /// moneyline) from window start to the latest quote.
    pub fn delta(&self) -> Decimal {
        self.last.tracked_value() - self.first.tracked_value()
    }
}

/// Group window quotes by outcome label, then reduce each bookmaker's
/// quotes to its first/last pair. Books with fewer than two quotes in the
/// window are dropped: no movement can be established for them.
///
/// Input must be ordered by `observed_at` (the history contract).
pub fn moves_by_outcome(quotes: &[OddsQuote]) -> HashMap<String, Vec<BookMove>> {
    let mut grouped: HashMap<String, HashMap<String, (OddsQuote, OddsQuote, usize)>> =
        HashMap::new();

    for quote in quotes {
        let books = grouped.entry(quote.outcome_label.clone()).or_default();
        match books.get_mut(&quote.bookmaker) {
            Some((_, last, count)) => {
                *last = quote.clone();
                *count += 1;
            }
            None => {
                books.insert(
                    quote.bookmaker.clone(),
                    (quote.clone(), quote.clone(), 1),
                );
            }
        }
    }

    grouped
        .into_iter()
        .map(|(outcome, books)| {
            let mut moves: Vec<BookMove> = books
                .into_iter()
                .filter(|(_, (_, _, count))| *count >= 2)
                .map(|(bookmaker, (first, last, _))| BookMove {
                    bookmaker,
                    first,
                    last,
                })
                .collect();
            moves.sort_by(|a, b| a.bookmaker.cmp(&b.bookmaker));
            (outcome, moves)
        })
        .collect()
}

/// Median of absolute deltas; an even count averages the middle pair.
pub fn median_magnitude(deltas: &[Decimal]) -> Decimal {
    if deltas.is_empty() {
        return Decimal::ZERO;
    }
    let mut magnitudes: Vec<Decimal> = deltas.iter().map(|d| d.abs()).collect();
    magnitudes.sort();
    median(&magnitudes)
}

/// Median of signed values over a pre-sorted-or-not slice; an even count
/// averages the middle pair.
pub fn median(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / rust_decimal_macros::dec!(2)
    }
}
