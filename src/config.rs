//! Configuration types for sharpline

use crate::detect::{
    Detector, DivergenceConfig, ExchangeMonitorConfig, ExchangeMonitorDetector,
    PinnacleDivergenceDetector,
    RapidChangeConfig, RapidChangeDetector, ReverseLineConfig, ReverseLineMovementDetector,
    SteamConfig, SteamMoveDetector, ValueScannerConfig,
};
use crate::pipeline::PipelineConfig;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub books: BooksConfig,
    #[serde(default)]
    pub steam: SteamSection,
    #[serde(default)]
    pub rapid: RapidSection,
    #[serde(default)]
    pub divergence: DivergenceSection,
    #[serde(default)]
    pub reverse: ReverseSection,
    #[serde(default)]
    pub exchange_monitor: ExchangeSection,
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Bookmaker roles shared by every detector
#[derive(Debug, Clone, Deserialize)]
pub struct BooksConfig {
    /// Sharp reference book for divergence and reverse-line detection
    #[serde(default = "default_reference_book")]
    pub reference_book: String,

    /// Exchange book monitored for implied-probability shifts
    #[serde(default = "default_exchange_book")]
    pub exchange_book: String,

    /// Retail books eligible for detection and value scanning
    #[serde(default = "default_tracked_books")]
    pub tracked_books: Vec<String>,
}

fn default_reference_book() -> String {
    "pinnacle".to_string()
}
fn default_exchange_book() -> String {
    "betfair_ex_eu".to_string()
}
fn default_tracked_books() -> Vec<String> {
    vec![
        "draftkings".to_string(),
        "fanduel".to_string(),
        "betmgm".to_string(),
        "caesars".to_string(),
        "williamhill_us".to_string(),
    ]
}

impl Default for BooksConfig {
    fn default() -> Self {
        Self {
            reference_book: default_reference_book(),
            exchange_book: default_exchange_book(),
            tracked_books: default_tracked_books(),
        }
    }
}

/// Steam move detection thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct SteamSection {
    /// Minimum books moving the same direction inside the window
    #[serde(default = "default_steam_min_books")]
    pub min_books: usize,

    /// Trailing window in minutes
    #[serde(default = "default_steam_window_minutes")]
    pub window_minutes: i64,
}

fn default_steam_min_books() -> usize {
    3
}
fn default_steam_window_minutes() -> i64 {
    30
}

impl Default for SteamSection {
    fn default() -> Self {
        Self {
            min_books: 3,
            window_minutes: 30,
        }
    }
}

/// Rapid change detection thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct RapidSection {
    /// Minimum point move between consecutive polls (spread/total)
    #[serde(default = "default_rapid_spread_threshold")]
    pub spread_threshold: Decimal,

    /// Minimum American-price move between consecutive polls (moneyline)
    #[serde(default = "default_rapid_ml_threshold")]
    pub ml_threshold: Decimal,
}

fn default_rapid_spread_threshold() -> Decimal {
    Decimal::new(5, 1) // 0.5 points
}
fn default_rapid_ml_threshold() -> Decimal {
    Decimal::from(20) // 20 cents
}

impl Default for RapidSection {
    fn default() -> Self {
        Self {
            spread_threshold: Decimal::new(5, 1),
            ml_threshold: Decimal::from(20),
        }
    }
}

/// Reference-book divergence thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct DivergenceSection {
    /// Minimum point gap against the reference book (spread/total)
    #[serde(default = "default_divergence_spread_threshold")]
    pub spread_threshold: Decimal,

    /// Minimum implied-probability gap against the reference book (moneyline)
    #[serde(default = "default_divergence_ml_prob_threshold")]
    pub ml_prob_threshold: Decimal,
}

fn default_divergence_spread_threshold() -> Decimal {
    Decimal::ONE // 1.0 points
}
fn default_divergence_ml_prob_threshold() -> Decimal {
    Decimal::new(4, 2) // 0.04
}

impl Default for DivergenceSection {
    fn default() -> Self {
        Self {
            spread_threshold: Decimal::ONE,
            ml_prob_threshold: Decimal::new(4, 2),
        }
    }
}

/// Reverse line movement thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct ReverseSection {
    /// Minimum tracked books moving for a consensus
    #[serde(default = "default_reverse_min_consensus_books")]
    pub min_consensus_books: usize,

    /// Trailing window in minutes
    #[serde(default = "default_reverse_window_minutes")]
    pub window_minutes: i64,
}

fn default_reverse_min_consensus_books() -> usize {
    2
}
fn default_reverse_window_minutes() -> i64 {
    30
}

impl Default for ReverseSection {
    fn default() -> Self {
        Self {
            min_consensus_books: 2,
            window_minutes: 30,
        }
    }
}

/// Exchange monitor thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeSection {
    /// Minimum implied-probability shift between polls
    #[serde(default = "default_exchange_shift_threshold")]
    pub shift_threshold: Decimal,
}

fn default_exchange_shift_threshold() -> Decimal {
    Decimal::new(5, 2) // 0.05
}

impl Default for ExchangeSection {
    fn default() -> Self {
        Self {
            shift_threshold: Decimal::new(5, 2),
        }
    }
}

/// Pipeline filter thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    /// Minimum signal strength to survive the first filter stage
    #[serde(default = "default_min_signal_strength")]
    pub min_signal_strength: Decimal,

    /// Cooldown window per (event, type, market, outcome) in minutes
    #[serde(default = "default_alert_cooldown_minutes")]
    pub alert_cooldown_minutes: i64,
}

fn default_min_signal_strength() -> Decimal {
    Decimal::new(5, 1) // 0.5
}
fn default_alert_cooldown_minutes() -> i64 {
    60
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            min_signal_strength: Decimal::new(5, 1),
            alert_cooldown_minutes: 60,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Prometheus scrape port, 0 disables the exporter
    #[serde(default)]
    pub metrics_port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: 0,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn steam_config(&self) -> SteamConfig {
        SteamConfig {
            min_books: self.steam.min_books,
            window_minutes: self.steam.window_minutes,
        }
    }

    pub fn rapid_config(&self) -> RapidChangeConfig {
        RapidChangeConfig {
            spread_threshold: self.rapid.spread_threshold,
            ml_threshold: self.rapid.ml_threshold,
        }
    }

    pub fn divergence_config(&self) -> DivergenceConfig {
        DivergenceConfig {
            reference_book: self.books.reference_book.clone(),
            tracked_books: self.books.tracked_books.clone(),
            spread_threshold: self.divergence.spread_threshold,
            ml_prob_threshold: self.divergence.ml_prob_threshold,
        }
    }

    pub fn reverse_config(&self) -> ReverseLineConfig {
        ReverseLineConfig {
            reference_book: self.books.reference_book.clone(),
            tracked_books: self.books.tracked_books.clone(),
            min_consensus_books: self.reverse.min_consensus_books,
            window_minutes: self.reverse.window_minutes,
        }
    }

    pub fn exchange_config(&self) -> ExchangeMonitorConfig {
        ExchangeMonitorConfig {
            exchange_book: self.books.exchange_book.clone(),
            shift_threshold: self.exchange_monitor.shift_threshold,
        }
    }

    pub fn value_scanner_config(&self) -> ValueScannerConfig {
        ValueScannerConfig {
            tracked_books: self.books.tracked_books.clone(),
            window_minutes: self.steam.window_minutes,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            min_signal_strength: self.pipeline.min_signal_strength,
            alert_cooldown_minutes: self.pipeline.alert_cooldown_minutes,
        }
    }

    /// The full detector set in registration order. This order doubles as
    /// the dedup tiebreak of last resort, so it is fixed.
    pub fn build_detectors(&self) -> Vec<Box<dyn Detector>> {
        vec![
            Box::new(SteamMoveDetector::new(self.steam_config())),
            Box::new(RapidChangeDetector::new(self.rapid_config())),
            Box::new(PinnacleDivergenceDetector::new(self.divergence_config())),
            Box::new(ReverseLineMovementDetector::new(self.reverse_config())),
            Box::new(ExchangeMonitorDetector::new(self.exchange_config())),
        ]
    }
}
