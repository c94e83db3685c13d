// packages/engine/src/transport/cross_boundary.rs
//! Writing mocks out and reading them back
//!
//! A mock is written as its replacement descriptor and read back by running
//! the normal creation path, so the result is a new instance with a fresh
//! dispatcher, identity overrides intact and no invocation history.

use crate::creation::mock_maker::MockMaker;
use crate::interception::mock::{Mock, MockAccess, Surrogate};
use crate::observability::names;
use crate::transport::descriptor::{MockReplacement, FORMAT_VERSION};
use crate::transport::registry::HandlerRegistry;
use crate::utils::config::TransportConfig;
use crate::utils::errors::{EngineError, Result};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

const UNKNOWN: &str = "<unknown>";

/// Moves mocks across serialization boundaries
pub struct CrossBoundaryTransport {
    registry: Arc<HandlerRegistry>,
    config: TransportConfig,
}

impl CrossBoundaryTransport {
    /// Transport that restores the built-in handlers
    pub fn new() -> Self {
        Self::with_registry(Arc::new(HandlerRegistry::with_builtin()))
    }

    pub fn with_registry(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            config: TransportConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TransportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Build the replacement descriptor for a mock
    pub fn describe<M: MockAccess + ?Sized>(&self, surrogate: &M) -> Result<MockReplacement> {
        let mock = surrogate.mock();
        let handler = handler_name(mock);

        if !mock.settings().is_serializable() {
            return Err(failure(mock, handler, "mock is not configured for transport"));
        }

        let dispatcher = mock
            .dispatcher()
            .ok_or_else(|| failure(mock, handler, "no dispatcher attached"))?;

        let snapshot = dispatcher
            .handler()
            .snapshot()
            .ok_or_else(|| failure(mock, handler, "handler cannot be transported"))?;

        Ok(MockReplacement::new(mock, snapshot))
    }

    /// Encode a mock for transport
    pub fn write_replace<M: MockAccess + ?Sized>(&self, surrogate: &M) -> Result<Bytes> {
        let replacement = self.describe(surrogate)?;
        let mock = surrogate.mock();

        let encoded = replacement.encode().map_err(|e| {
            failure(mock, &replacement.handler.kind, format!("encoding failed: {}", e))
        })?;

        if encoded.len() > self.config.max_payload_bytes {
            return Err(failure(
                mock,
                &replacement.handler.kind,
                format!(
                    "descriptor is {} bytes, limit is {}",
                    encoded.len(),
                    self.config.max_payload_bytes
                ),
            ));
        }

        debug!("Wrote {} as {} bytes", mock, encoded.len());
        Ok(Bytes::from(encoded))
    }

    /// Rebuild a mock of `S` from bytes written by [`write_replace`](Self::write_replace)
    pub fn read_resolve<S: Surrogate>(&self, bytes: &[u8]) -> Result<S> {
        if bytes.len() > self.config.max_payload_bytes {
            return Err(failure(
                UNKNOWN,
                UNKNOWN,
                format!(
                    "payload is {} bytes, limit is {}",
                    bytes.len(),
                    self.config.max_payload_bytes
                ),
            ));
        }

        let replacement = MockReplacement::decode(bytes)
            .map_err(|e| failure(UNKNOWN, UNKNOWN, format!("undecodable descriptor: {}", e)))?;

        self.reconstruct(replacement)
    }

    /// Rebuild a mock of `S` from an already decoded descriptor
    pub fn reconstruct<S: Surrogate>(&self, replacement: MockReplacement) -> Result<S> {
        let source = replacement.source_mock.to_string();
        let kind = replacement.handler.kind.clone();

        if replacement.format_version != FORMAT_VERSION {
            return Err(failure(
                &source,
                &kind,
                format!("unsupported format version {}", replacement.format_version),
            ));
        }

        if replacement.type_name != S::TYPE_NAME || replacement.settings.type_name != S::TYPE_NAME {
            return Err(failure(
                &source,
                &kind,
                format!(
                    "descriptor is for {} but {} was requested",
                    replacement.type_name,
                    S::TYPE_NAME
                ),
            ));
        }

        let handler = self
            .registry
            .restore(&replacement.handler)
            .map_err(|e| failure(&source, &kind, format!("{:#}", e)))?;

        let surrogate = MockMaker::create::<S>(replacement.settings, handler)
            .map_err(|e| failure(&source, &kind, e.to_string()))?;

        debug!("Resolved {} as {}", source, surrogate.mock());
        Ok(surrogate)
    }
}

impl Default for CrossBoundaryTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn handler_name(mock: &Mock) -> &'static str {
    mock.dispatcher()
        .map(|d| d.handler().handler_name())
        .unwrap_or("<none>")
}

fn failure(
    mock: impl std::fmt::Display,
    handler: impl Into<String>,
    reason: impl Into<String>,
) -> EngineError {
    let err = EngineError::transport(mock.to_string(), handler, reason);
    warn!("{}", err);
    metrics::counter!(names::TRANSPORT_FAILURES).increment(1);
    err
}
