// packages/engine/src/utils/config.rs
//! Engine configuration
//!
//! Layered loading: built-in defaults, then an optional `mockcall.{toml,yaml,json}`
//! file, then `MOCKCALL__SECTION__KEY` environment variables.

use crate::utils::errors::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::debug;

const ENV_PREFIX: &str = "MOCKCALL";
const DEFAULT_FILE: &str = "mockcall";

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Log output
    pub logging: LoggingConfig,

    /// Prometheus metrics
    pub metrics: MetricsConfig,

    /// Global invocation sequencer
    pub sequencer: SequencerConfig,

    /// Cross-boundary transport limits
    pub transport: TransportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `mockcall_engine=trace`
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,

    /// Scrape endpoint; when absent the recorder is installed without a listener
    pub listen_addr: Option<String>,
}

impl MetricsConfig {
    pub fn listen_socket(&self) -> Result<Option<SocketAddr>> {
        self.listen_addr
            .as_deref()
            .map(|addr| {
                addr.parse::<SocketAddr>().map_err(|e| {
                    EngineError::Config(format!("Invalid metrics listen address {}: {}", addr, e))
                })
            })
            .transpose()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SequencerConfig {
    /// First sequence number handed out by the global sequencer
    pub base: u64,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self { base: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    /// Upper bound on an encoded mock descriptor
    pub max_payload_bytes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: 1024 * 1024,
        }
    }
}

impl EngineConfig {
    /// Load from `./mockcall.*` (if present) and the environment
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(DEFAULT_FILE).required(false))
            .add_source(Self::env_source())
            .build()?;

        Self::finish(settings)
    }

    /// Load from an explicit file, still honoring environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {:?}", path);

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(Self::env_source())
            .build()?;

        Self::finish(settings)
    }

    fn env_source() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    fn finish(settings: config::Config) -> Result<Self> {
        let config: EngineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.logging.level.trim().is_empty() {
            return Err(EngineError::Config("logging.level cannot be empty".to_string()));
        }

        if self.transport.max_payload_bytes == 0 {
            return Err(EngineError::Config(
                "transport.max_payload_bytes must be positive".to_string(),
            ));
        }

        if self.sequencer.base == u64::MAX {
            return Err(EngineError::Config(
                "sequencer.base leaves no room for sequence numbers".to_string(),
            ));
        }

        self.metrics.listen_socket()?;

        Ok(())
    }
}
