// packages/engine/src/lib.rs
//! Mockcall Interception Engine Library
//!
//! This library intercepts every call made on a mock, turns it into an
//! immutable invocation record and routes it to a pluggable handler that
//! decides the outcome.
//!
//! # Architecture
//!
//! The engine is structured into several key modules:
//!
//! - **invocation**: Invocation records, method descriptors, sequencing
//! - **interception**: Mock handles, dispatcher and the surrogate entry points
//! - **creation**: Mock settings and surrogate construction
//! - **handler**: Handler capability and the reference handlers
//! - **transport**: Carrying mocks across serialization boundaries
//! - **observability**: Logging and metrics
//! - **utils**: Errors and configuration

// Public module exports
pub mod creation;
pub mod handler;
pub mod interception;
pub mod invocation;
pub mod observability;
pub mod transport;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use creation::{MockMaker, MockSettings};
pub use handler::{HandlerSnapshot, MockHandler, RecordingHandler, ReturnsDefaults};
pub use interception::{intercept_abstract, intercept_concrete, Mock, MockAccess, Surrogate};
pub use invocation::{InvocationRecord, MethodSignature, RealCall, Value, ValueKind};
pub use transport::{CrossBoundaryTransport, HandlerRegistry};
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wire logging, metrics and the global sequencer from one configuration
///
/// Call once, before the first mock is created. A tracing subscriber the
/// host installed beforehand is kept. Returns the Prometheus
/// render handle when metrics are enabled without a scrape listener.
pub fn init(config: &EngineConfig) -> Result<Option<PrometheusHandle>> {
    config.validate()?;

    invocation::sequence::init_global(config.sequencer.base)?;
    observability::init_tracing(&config.logging)?;
    let metrics = observability::init_metrics(&config.metrics)?;

    info!("Mockcall engine {} initialized", VERSION);
    Ok(metrics)
}
