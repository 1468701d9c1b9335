//! Alert pipeline
//!
//! Turns raw detector candidates into emitted alerts through a fixed
//! three-stage filter: strength cut, market-side dedup, cooldown dedup.

mod cooldown;
mod filter;
mod orchestrator;

pub use cooldown::{ClaimOutcome, CooldownKey, CooldownStore, MemoryCooldownStore};
pub use filter::{dedup_market_sides, FilterResult, RejectReason, StrengthFilter};
pub use orchestrator::{PassOutcome, Pipeline, PipelineConfig};
