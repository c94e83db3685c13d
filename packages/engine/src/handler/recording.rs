// packages/engine/src/handler/recording.rs
//! Recording handler
//!
//! Keeps every invocation it sees, in sequence order, before passing it on
//! to an inner handler. Histories from several recorders can be merged into
//! one total order for "in order" checks across mocks.

use crate::handler::{HandlerSnapshot, MockHandler};
use crate::invocation::record::InvocationRecord;
use crate::invocation::value::Value;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::trace;

/// Callback notified after each handled invocation with its outcome
pub type InvocationListener =
    Arc<dyn Fn(&InvocationRecord, &anyhow::Result<Option<Value>>) + Send + Sync>;

pub struct RecordingHandler {
    inner: Arc<dyn MockHandler>,
    history: Mutex<Vec<InvocationRecord>>,
    listeners: Vec<InvocationListener>,
}

impl RecordingHandler {
    pub const KIND: &'static str = "recording";

    pub fn new(inner: Arc<dyn MockHandler>) -> Self {
        Self {
            inner,
            history: Mutex::new(Vec::new()),
            listeners: Vec::new(),
        }
    }

    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&InvocationRecord, &anyhow::Result<Option<Value>>) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub fn inner(&self) -> &Arc<dyn MockHandler> {
        &self.inner
    }

    /// Recorded invocations in sequence order
    pub fn invocations(&self) -> Vec<InvocationRecord> {
        let mut invocations = self.history.lock().clone();
        invocations.sort_by_key(InvocationRecord::sequence_number);
        invocations
    }

    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }

    /// Forget all history, releasing the mocks it kept alive
    pub fn clear(&self) {
        self.history.lock().clear();
    }
}

impl MockHandler for RecordingHandler {
    fn handle(&self, invocation: InvocationRecord) -> anyhow::Result<Option<Value>> {
        trace!("Recording invocation #{}", invocation.sequence_number());
        self.history.lock().push(invocation.clone());

        if self.listeners.is_empty() {
            return self.inner.handle(invocation);
        }

        let outcome = self.inner.handle(invocation.clone());
        for listener in &self.listeners {
            listener(&invocation, &outcome);
        }
        outcome
    }

    fn snapshot(&self) -> Option<HandlerSnapshot> {
        let inner = self.inner.snapshot()?;
        let mut state = serde_json::Map::new();
        state.insert("inner".to_string(), inner.into_json());
        Some(HandlerSnapshot::new(Self::KIND, serde_json::Value::Object(state)))
    }
}

/// Merge the histories of several recorders into one sequence order
pub fn merge_in_order(recorders: &[&RecordingHandler]) -> Vec<InvocationRecord> {
    let mut merged: Vec<InvocationRecord> = recorders
        .iter()
        .flat_map(|recorder| recorder.history.lock().clone())
        .collect();
    merged.sort_by_key(InvocationRecord::sequence_number);
    merged
}
