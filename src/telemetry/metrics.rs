//! Prometheus metrics

use metrics::{describe_counter, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Install the Prometheus exporter on the given port
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    describe_counters();
    tracing::info!(port, "Prometheus exporter listening");
    Ok(())
}

fn describe_counters() {
    describe_counter!(
        "sharpline_candidates_total",
        Unit::Count,
        "Raw candidate signals produced by the detectors"
    );
    describe_counter!(
        "sharpline_rejected_total",
        Unit::Count,
        "Candidates dropped per filter stage"
    );
    describe_counter!(
        "sharpline_alerts_total",
        Unit::Count,
        "Signals that survived all filter stages"
    );
    describe_counter!(
        "sharpline_gradings_total",
        Unit::Count,
        "Grading records written per outcome"
    );
}
