//! CLI interface for sharpline
//!
//! Provides subcommands for:
//! - `replay`: Replay recorded snapshots through the detection pipeline
//! - `grade`: Grade previously emitted signals against final scores
//! - `status`: Show current state
//! - `config`: Show effective configuration

mod grade;
mod replay;

pub use grade::GradeArgs;
pub use replay::ReplayArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sharpline")]
#[command(about = "Sharp-action detection engine for sportsbook line movement")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay recorded snapshots through the detection pipeline
    Replay(ReplayArgs),
    /// Grade emitted signals against final scores
    Grade(GradeArgs),
    /// Show current state
    Status,
    /// Show effective configuration
    Config,
}
