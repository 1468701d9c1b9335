//! sharpline: Sharp-action detection engine for sportsbook line movement
//!
//! This library provides the core components for:
//! - American-odds math and quote types
//! - Snapshot history access over recorded lines
//! - Five line-movement detectors (steam, rapid change, reference-book
//!   divergence, reverse line movement, exchange monitor)
//! - Value-bet scanning against books on stale lines
//! - A three-stage alert pipeline (strength, market-side dedup, cooldown)
//! - Signal grading against final scores
//! - Snapshot replay backtesting with per-type performance reporting
//! - Full observability stack

pub mod backtest;
pub mod cli;
pub mod config;
pub mod detect;
pub mod grading;
pub mod history;
pub mod odds;
pub mod pipeline;
pub mod store;
pub mod telemetry;
