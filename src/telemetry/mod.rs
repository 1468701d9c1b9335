//! Telemetry module
//!
//! Metrics and logging

mod logging;
mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;

use crate::config::TelemetryConfig;

/// Guard that cleans up telemetry on drop
pub struct TelemetryGuard {
    _priv: (),
}

/// Initialize all telemetry subsystems. A metrics port of 0 leaves the
/// Prometheus exporter off.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level)?;

    if config.metrics_port != 0 {
        init_metrics(config.metrics_port)?;
    }

    Ok(TelemetryGuard { _priv: () })
}
