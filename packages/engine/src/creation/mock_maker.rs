// packages/engine/src/creation/mock_maker.rs
//! Surrogate construction

use crate::creation::settings::MockSettings;
use crate::handler::MockHandler;
use crate::interception::dispatcher::InterceptionDispatcher;
use crate::interception::mock::{Mock, MockAccess, Surrogate};
use crate::invocation::method_registry::MethodRegistry;
use crate::observability::names;
use crate::utils::errors::{EngineError, Result};
use std::sync::Arc;
use tracing::debug;

/// Creates surrogate instances
pub struct MockMaker;

impl MockMaker {
    /// Settings for `S` with everything else at its default
    pub fn settings_for<S: Surrogate>() -> MockSettings {
        MockSettings::new(S::TYPE_NAME)
    }

    /// Create a mock of `S` whose calls go to `handler`
    ///
    /// Serializable mocks register the methods of `S` so their descriptors
    /// can be resolved again after transport.
    pub fn create<S: Surrogate>(settings: MockSettings, handler: Arc<dyn MockHandler>) -> Result<S> {
        let surrogate = Self::create_unattached::<S>(settings)?;
        let mock = surrogate.mock();

        if mock.settings().is_serializable() {
            MethodRegistry::global().register_all(S::methods());
        }

        let handler_name = handler.handler_name();
        mock.attach(InterceptionDispatcher::new(handler, Arc::clone(mock.settings())))?;

        metrics::counter!(names::MOCKS_CREATED).increment(1);
        debug!("Created mock {} of {} (handler {})", mock, S::TYPE_NAME, handler_name);

        Ok(surrogate)
    }

    /// Create a mock of `S` with no dispatcher attached
    ///
    /// Every call on it bypasses interception until a dispatcher is attached
    /// through its [`Mock`] handle.
    pub fn create_unattached<S: Surrogate>(settings: MockSettings) -> Result<S> {
        if settings.type_name != S::TYPE_NAME {
            return Err(EngineError::MockCreation(format!(
                "Settings describe {} but the surrogate mocks {}",
                settings.type_name,
                S::TYPE_NAME
            )));
        }

        Ok(S::from_mock(Mock::new(Arc::new(settings))))
    }
}
