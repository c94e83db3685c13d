// packages/engine/src/observability/mod.rs
//! Logging and metrics setup
//!
//! The engine logs through `tracing` and counts through `metrics`; both are
//! silent until a subscriber or recorder is installed, so libraries embedding
//! the engine are free to install their own instead.

use crate::utils::config::{LoggingConfig, MetricsConfig};
use crate::utils::errors::{EngineError, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Metric names emitted by the engine
pub mod names {
    pub const INVOCATIONS: &str = "mockcall_invocations_total";
    pub const UNATTACHED_CALLS: &str = "mockcall_unattached_calls_total";
    pub const DEFAULT_STUBS: &str = "mockcall_default_stubs_total";
    pub const TRANSPORT_FAILURES: &str = "mockcall_transport_failures_total";
    pub const MOCKS_CREATED: &str = "mockcall_mocks_created_total";
}

/// Install the global tracing subscriber
///
/// A subscriber already installed by the host is kept as is.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| EngineError::Observability(format!("Invalid log filter: {}", e)))?;

    let installed = if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
    };

    // try_init only fails when a global subscriber or logger is already set.
    if let Err(e) = installed {
        debug!("Keeping the installed subscriber: {}", e);
        return Ok(());
    }

    info!("Tracing initialized at level {}", config.level);
    Ok(())
}

/// Install the Prometheus recorder
///
/// Returns a render handle when metrics are enabled without a scrape listener.
pub fn init_metrics(config: &MetricsConfig) -> Result<Option<PrometheusHandle>> {
    if !config.enabled {
        return Ok(None);
    }

    if let Some(addr) = config.listen_socket()? {
        // The listener serves scrapes itself, so no render handle is returned.
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .map_err(|e| EngineError::Observability(format!("Metrics install failed: {}", e)))?;
        info!("Prometheus metrics listening on {}", addr);
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| EngineError::Observability(format!("Metrics install failed: {}", e)))?;
    info!("Prometheus metrics recorder installed");

    Ok(Some(handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_disabled_is_noop() {
        let config = MetricsConfig::default();
        let handle = init_metrics(&config).unwrap();
        assert!(handle.is_none());
    }

    #[test]
    fn test_existing_subscriber_is_kept() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        init_tracing(&LoggingConfig::default()).unwrap();
        init_tracing(&LoggingConfig {
            level: "debug".to_string(),
            json: true,
        })
        .unwrap();
    }

    #[test]
    fn test_invalid_log_filter_rejected() {
        let config = LoggingConfig {
            level: "mockcall_engine=verbose".to_string(),
            json: false,
        };
        assert!(matches!(
            init_tracing(&config),
            Err(EngineError::Observability(_))
        ));
    }
}
