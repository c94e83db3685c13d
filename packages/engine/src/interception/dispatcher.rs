// packages/engine/src/interception/dispatcher.rs
//! Interception dispatcher
//!
//! One dispatcher is attached to every mock. It turns a raw interception
//! (mock, method, arguments, real-call capability) into an
//! [`InvocationRecord`] and hands it to the mock's handler, returning
//! whatever the handler returns. Handler failures pass through untouched;
//! nothing is retried, buffered or reordered.

use crate::creation::settings::MockSettings;
use crate::handler::MockHandler;
use crate::interception::mock::Mock;
use crate::invocation::location::CallSiteLocator;
use crate::invocation::method::{MethodSignature, MethodStrategy};
use crate::invocation::record::{InvocationRecord, RealCall};
use crate::invocation::sequence;
use crate::invocation::value::Value;
use crate::observability::names;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Routes a mock's intercepted calls to its handler
pub struct InterceptionDispatcher {
    /// Fixed for the lifetime of the mock
    handler: Arc<dyn MockHandler>,

    settings: Arc<MockSettings>,

    /// Descriptor form, decided once from the settings
    strategy: MethodStrategy,
}

impl InterceptionDispatcher {
    pub fn new(handler: Arc<dyn MockHandler>, settings: Arc<MockSettings>) -> Self {
        let strategy = MethodStrategy::for_settings(&settings);

        debug!(
            "Dispatcher for {} using {:?} method descriptors (handler {})",
            settings.type_name,
            strategy,
            handler.handler_name()
        );

        Self {
            handler,
            settings,
            strategy,
        }
    }

    pub fn handler(&self) -> &Arc<dyn MockHandler> {
        &self.handler
    }

    pub fn settings(&self) -> &Arc<MockSettings> {
        &self.settings
    }

    pub fn strategy(&self) -> MethodStrategy {
        self.strategy
    }

    /// Record the call and hand it to the handler, capturing the call site
    #[track_caller]
    pub fn intercept(
        &self,
        mock: &Mock,
        method: &'static MethodSignature,
        arguments: impl Into<Arc<[Value]>>,
        real_call: RealCall,
    ) -> anyhow::Result<Option<Value>> {
        let location = CallSiteLocator::capture();
        self.intercept_at(mock, method, arguments, real_call, location)
    }

    /// Same as [`intercept`](Self::intercept) with an already captured call site
    pub fn intercept_at(
        &self,
        mock: &Mock,
        method: &'static MethodSignature,
        arguments: impl Into<Arc<[Value]>>,
        real_call: RealCall,
        location: CallSiteLocator,
    ) -> anyhow::Result<Option<Value>> {
        let invocation = self.create_invocation(mock, method, arguments, real_call, location);

        trace!(
            sequence = invocation.sequence_number(),
            "Dispatching {}",
            invocation
        );
        metrics::counter!(names::INVOCATIONS).increment(1);

        self.handler.handle(invocation)
    }

    /// Build the record for one interception, taking a fresh sequence number
    pub fn create_invocation(
        &self,
        mock: &Mock,
        method: &'static MethodSignature,
        arguments: impl Into<Arc<[Value]>>,
        real_call: RealCall,
        location: CallSiteLocator,
    ) -> InvocationRecord {
        InvocationRecord::new(
            mock.clone(),
            self.strategy.describe(method),
            arguments.into(),
            real_call,
            location,
            sequence::next(),
        )
    }
}

impl fmt::Debug for InterceptionDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptionDispatcher")
            .field("handler", &self.handler.handler_name())
            .field("settings", &self.settings)
            .field("strategy", &self.strategy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::method::MockMethod;
    use crate::invocation::value::ValueKind;
    use parking_lot::Mutex;

    static SIZE: MethodSignature = MethodSignature::new("Inventory", "size", &[], ValueKind::Int);
    static CONTAINS: MethodSignature =
        MethodSignature::new("Inventory", "contains", &["String"], ValueKind::Bool);

    #[derive(Default)]
    struct Capture {
        seen: Mutex<Vec<InvocationRecord>>,
    }

    impl MockHandler for Capture {
        fn handle(&self, invocation: InvocationRecord) -> anyhow::Result<Option<Value>> {
            self.seen.lock().push(invocation);
            Ok(Some(Value::Int(5)))
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("handler refused {0}")]
    struct Refused(String);

    struct Refusing;

    impl MockHandler for Refusing {
        fn handle(&self, invocation: InvocationRecord) -> anyhow::Result<Option<Value>> {
            Err(Refused(invocation.method().name().to_string()).into())
        }
    }

    fn attached(handler: Arc<dyn MockHandler>, settings: MockSettings) -> Mock {
        let settings = Arc::new(settings);
        let mock = Mock::new(Arc::clone(&settings));
        mock.attach(InterceptionDispatcher::new(handler, settings)).unwrap();
        mock
    }

    #[test]
    fn test_intercept_returns_handler_answer() {
        let capture = Arc::new(Capture::default());
        let mock = attached(capture.clone(), MockSettings::new("Inventory"));
        let dispatcher = mock.dispatcher().unwrap();

        let answer = dispatcher
            .intercept(&mock, &SIZE, Vec::<Value>::new(), RealCall::NotApplicable)
            .unwrap();
        assert_eq!(answer, Some(Value::Int(5)));

        let seen = capture.seen.lock();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_on(&mock));
        assert_eq!(seen[0].method().name(), "size");
    }

    #[test]
    fn test_identical_calls_get_distinct_sequence_numbers() {
        let capture = Arc::new(Capture::default());
        let mock = attached(capture.clone(), MockSettings::new("Inventory"));
        let dispatcher = mock.dispatcher().unwrap();

        for _ in 0..2 {
            dispatcher
                .intercept(&mock, &CONTAINS, vec![Value::from("apple")], RealCall::NotApplicable)
                .unwrap();
        }

        let seen = capture.seen.lock();
        assert_ne!(seen[0].sequence_number(), seen[1].sequence_number());
        assert!(seen[0].sequence_number() < seen[1].sequence_number());
        assert_eq!(seen[0].method(), seen[1].method());
        assert_eq!(seen[0].mock_id(), seen[1].mock_id());
        assert_eq!(seen[0].arguments(), seen[1].arguments());
    }

    #[test]
    fn test_explicit_location_is_kept() {
        let capture = Arc::new(Capture::default());
        let mock = attached(capture.clone(), MockSettings::new("Inventory"));
        let dispatcher = mock.dispatcher().unwrap();

        let expected_line = line!() + 1;
        let location = CallSiteLocator::capture();
        dispatcher
            .intercept_at(&mock, &SIZE, Vec::<Value>::new(), RealCall::NotApplicable, location)
            .unwrap();

        assert_eq!(capture.seen.lock()[0].location().line(), expected_line);
    }

    #[test]
    fn test_implicit_location_points_at_caller() {
        let capture = Arc::new(Capture::default());
        let mock = attached(capture.clone(), MockSettings::new("Inventory"));
        let dispatcher = mock.dispatcher().unwrap();

        let expected_line = line!() + 1;
        dispatcher.intercept(&mock, &SIZE, Vec::<Value>::new(), RealCall::NotApplicable).unwrap();

        let seen = capture.seen.lock();
        assert!(seen[0].location().file().ends_with("dispatcher.rs"));
        assert_eq!(seen[0].location().line(), expected_line);
    }

    #[test]
    fn test_handler_failure_passes_through_unchanged() {
        let mock = attached(Arc::new(Refusing), MockSettings::new("Inventory"));
        let dispatcher = mock.dispatcher().unwrap();

        let err = dispatcher
            .intercept(&mock, &SIZE, Vec::<Value>::new(), RealCall::NotApplicable)
            .unwrap_err();
        let refused = err.downcast_ref::<Refused>().unwrap();
        assert_eq!(refused.0, "size");
    }

    #[test]
    fn test_strategy_follows_settings() {
        let capture = Arc::new(Capture::default());
        let plain = attached(capture.clone(), MockSettings::new("Inventory"));
        let portable = attached(capture.clone(), MockSettings::new("Inventory").serializable());

        let plain_dispatcher = plain.dispatcher().unwrap();
        let portable_dispatcher = portable.dispatcher().unwrap();
        assert_eq!(plain_dispatcher.strategy(), MethodStrategy::Delegating);
        assert_eq!(portable_dispatcher.strategy(), MethodStrategy::Serializable);

        plain_dispatcher
            .intercept(&plain, &SIZE, Vec::<Value>::new(), RealCall::NotApplicable)
            .unwrap();
        portable_dispatcher
            .intercept(&portable, &SIZE, Vec::<Value>::new(), RealCall::NotApplicable)
            .unwrap();

        let seen = capture.seen.lock();
        assert!(!seen[0].method().is_serializable());
        assert!(seen[1].method().is_serializable());
        assert_eq!(seen[0].method(), seen[1].method());
    }
}
