//! Signal grading
//!
//! Resolves previously emitted signals against final scores using the
//! signal-time line, never a later one.

mod grader;
mod types;

pub use grader::{Grader, GradingSummary};
pub use types::{FinalScore, FinalScoreSource, GradeOutcome, GradingResult, MemoryScoreSource};
