// packages/engine/src/transport/registry.rs
//! Handler factories keyed by snapshot kind

use crate::handler::{HandlerSnapshot, MockHandler, RecordingHandler, ReturnsDefaults};
use anyhow::{anyhow, Context};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::trace;

/// Rebuilds a handler from its snapshot state
///
/// The registry is passed along so wrapping handlers can restore the
/// handlers they wrap.
pub type HandlerFactory = Arc<
    dyn Fn(&serde_json::Value, &HandlerRegistry) -> anyhow::Result<Arc<dyn MockHandler>>
        + Send
        + Sync,
>;

/// Registry of handler factories
pub struct HandlerRegistry {
    factories: DashMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }

    /// Registry that can rebuild the engine's own handlers
    pub fn with_builtin() -> Self {
        let registry = Self::new();

        registry.register(ReturnsDefaults::KIND, |_, _| Ok(Arc::new(ReturnsDefaults)));

        registry.register(RecordingHandler::KIND, |state, registry| {
            let inner: HandlerSnapshot = serde_json::from_value(state["inner"].clone())
                .context("recording snapshot has no inner handler")?;
            let inner = registry.restore(&inner)?;
            Ok(Arc::new(RecordingHandler::new(inner)))
        });

        registry
    }

    /// Register the factory for `kind`, replacing any previous one
    pub fn register<F>(&self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&serde_json::Value, &HandlerRegistry) -> anyhow::Result<Arc<dyn MockHandler>>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Rebuild a handler from its snapshot
    pub fn restore(&self, snapshot: &HandlerSnapshot) -> anyhow::Result<Arc<dyn MockHandler>> {
        // Factories may call back into the registry; no map guard is held while they run.
        let factory = self
            .factories
            .get(&snapshot.kind)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| anyhow!("no handler factory registered for kind {}", snapshot.kind))?;

        trace!("Restoring handler of kind {}", snapshot.kind);
        factory(&snapshot.state, self)
            .with_context(|| format!("handler factory for kind {} failed", snapshot.kind))
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds() {
        let registry = HandlerRegistry::with_builtin();
        assert!(registry.contains(ReturnsDefaults::KIND));
        assert!(registry.contains(RecordingHandler::KIND));
        assert!(!HandlerRegistry::new().contains(ReturnsDefaults::KIND));
    }

    #[test]
    fn test_restore_nested_snapshot() {
        let registry = HandlerRegistry::with_builtin();
        let snapshot = RecordingHandler::new(Arc::new(ReturnsDefaults))
            .snapshot()
            .unwrap();

        let restored = registry.restore(&snapshot).unwrap();
        assert!(restored.handler_name().ends_with("RecordingHandler"));
        assert_eq!(restored.snapshot(), Some(snapshot));
    }

    #[test]
    fn test_unknown_kind() {
        let registry = HandlerRegistry::with_builtin();
        let err = registry
            .restore(&HandlerSnapshot::new("scripted", serde_json::Value::Null))
            .err().unwrap();
        assert!(err.to_string().contains("scripted"));
    }

    #[test]
    fn test_factory_failure_is_reported() {
        let registry = HandlerRegistry::with_builtin();
        let broken = HandlerSnapshot::new(RecordingHandler::KIND, serde_json::json!({}));
        assert!(registry.restore(&broken).is_err());
    }

    #[test]
    fn test_register_replaces() {
        let registry = HandlerRegistry::new();
        registry.register("custom", |_, _| Err(anyhow!("first")));
        registry.register("custom", |_, _| Ok(Arc::new(ReturnsDefaults)));

        let restored = registry
            .restore(&HandlerSnapshot::new("custom", serde_json::Value::Null))
            .unwrap();
        assert!(restored.handler_name().ends_with("ReturnsDefaults"));
    }
}
