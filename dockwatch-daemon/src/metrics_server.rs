//! Prometheus metrics HTTP server.
//!
//! Uses the built-in HTTP listener from `metrics-exporter-prometheus`
//! to expose the Docker subscription counters on `/metrics`.

use std::net::SocketAddr;

use anyhow::Result;
use dockwatch_core::config::MetricsConfig;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Parses `listen_addr` and `port` into a socket address.
pub fn listen_socket(config: &MetricsConfig) -> Result<SocketAddr> {
    let ip: std::net::IpAddr = config
        .listen_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid metrics listen address: {}", e))?;
    Ok(SocketAddr::new(ip, config.port))
}

/// Install the global metrics recorder and start the HTTP listener.
///
/// This function should be called once per process. Afterwards every
/// `metrics::counter!()` in the workspace is exported in Prometheus format.
///
/// # Errors
///
/// - Invalid listen address
/// - Socket binding fails
/// - Global recorder is already installed
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    let addr = listen_socket(config)?;

    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics endpoint is exposed on all interfaces; restrict listen_addr in untrusted networks"
        );
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {}", e))?;

    dockwatch_core::metrics::describe_all();

    tracing::info!(listen_addr = %addr, "Prometheus metrics endpoint active");
    Ok(())
}
