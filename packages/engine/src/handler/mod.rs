// packages/engine/src/handler/mod.rs
//! Handler capability
//!
//! A handler decides the outcome of every intercepted call on the mocks it
//! is attached to. How it stubs, answers or verifies is its own business;
//! the engine only needs:
//!
//! - **handle**: produce an answer, `None` for "no answer" (the call then
//!   yields its default stub), or fail with any error
//! - **snapshot**: optionally describe itself so it can be rebuilt on the
//!   other side of a transport boundary
//!
//! Two reference handlers ship with the engine:
//!
//! - **ReturnsDefaults**: never answers, so every call yields its default stub
//! - **RecordingHandler**: keeps invocation history in front of another handler

pub mod recording;

use crate::invocation::record::InvocationRecord;
use crate::invocation::value::Value;
use serde::{Deserialize, Serialize};

pub use recording::{merge_in_order, InvocationListener, RecordingHandler};

/// Decides the outcome of intercepted calls
pub trait MockHandler: Send + Sync + 'static {
    /// Handle one invocation
    ///
    /// Errors are returned to the original caller exactly as produced here.
    fn handle(&self, invocation: InvocationRecord) -> anyhow::Result<Option<Value>>;

    /// Transportable description of this handler, `None` if it cannot travel
    fn snapshot(&self) -> Option<HandlerSnapshot> {
        None
    }

    fn handler_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Portable handler state, rebuilt through a `HandlerRegistry`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerSnapshot {
    /// Registry key of the factory that rebuilds the handler
    pub kind: String,

    pub state: serde_json::Value,
}

impl HandlerSnapshot {
    pub fn new(kind: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            state,
        }
    }

    /// JSON form of the snapshot, for nesting inside another snapshot's state
    pub fn into_json(self) -> serde_json::Value {
        let mut fields = serde_json::Map::new();
        fields.insert("kind".to_string(), serde_json::Value::String(self.kind));
        fields.insert("state".to_string(), self.state);
        serde_json::Value::Object(fields)
    }
}

/// Handler that never answers
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnsDefaults;

impl ReturnsDefaults {
    pub const KIND: &'static str = "returns_defaults";
}

impl MockHandler for ReturnsDefaults {
    fn handle(&self, _invocation: InvocationRecord) -> anyhow::Result<Option<Value>> {
        Ok(None)
    }

    fn snapshot(&self) -> Option<HandlerSnapshot> {
        Some(HandlerSnapshot::new(Self::KIND, serde_json::Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Opaque;

    impl MockHandler for Opaque {
        fn handle(&self, _invocation: InvocationRecord) -> anyhow::Result<Option<Value>> {
            Ok(Some(Value::Unit))
        }
    }

    #[test]
    fn test_default_snapshot_is_none() {
        assert!(Opaque.snapshot().is_none());
        assert!(Opaque.handler_name().ends_with("Opaque"));
    }

    #[test]
    fn test_returns_defaults_snapshot() {
        let snapshot = ReturnsDefaults.snapshot().unwrap();
        assert_eq!(snapshot.kind, ReturnsDefaults::KIND);
        assert!(ReturnsDefaults.handler_name().ends_with("ReturnsDefaults"));
    }

    #[test]
    fn test_into_json_matches_serde_layout() {
        let snapshot = HandlerSnapshot::new("scripted", serde_json::json!({ "answer": 3 }));
        let json = snapshot.clone().into_json();
        assert_eq!(json, serde_json::to_value(&snapshot).unwrap());
        assert_eq!(serde_json::from_value::<HandlerSnapshot>(json).unwrap(), snapshot);
    }

    #[test]
    fn test_handler_name_through_trait_object() {
        let handler: std::sync::Arc<dyn MockHandler> = std::sync::Arc::new(ReturnsDefaults);
        assert!(handler.handler_name().ends_with("ReturnsDefaults"));
    }
}
