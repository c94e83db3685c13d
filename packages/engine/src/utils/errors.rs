// packages/engine/src/utils/errors.rs
//! Engine error types
//!
//! Failures raised by handlers and real implementations are carried as
//! `anyhow::Error` and never pass through this type. `EngineError` only
//! covers what the engine itself originates.

use thiserror::Error;

/// Convenience alias for `Result<T, EngineError>`.
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A mock could not be carried across an isolation boundary.
    #[error("Transport failed for mock {mock} (handler {handler}): {reason}")]
    Transport {
        mock: String,
        handler: String,
        reason: String,
    },

    #[error("Mock creation failed: {0}")]
    MockCreation(String),

    /// A serializable method descriptor could not be resolved on this side.
    #[error("Method resolution failed: {0}")]
    MethodResolution(String),

    #[error("Cannot call real method on abstract method {0}")]
    AbstractRealCall(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Observability setup failed: {0}")]
    Observability(String),
}

impl EngineError {
    pub(crate) fn transport(
        mock: impl Into<String>,
        handler: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::Transport {
            mock: mock.into(),
            handler: handler.into(),
            reason: reason.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, EngineError::Transport { .. })
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(e: config::ConfigError) -> Self {
        EngineError::Config(e.to_string())
    }
}
