// packages/engine/src/interception/mock.rs
//! Mock instance handle
//!
//! Every surrogate embeds a [`Mock`]: the shared identity of one mock
//! instance plus the slot its dispatcher is attached to. The slot starts
//! empty, which is the state a surrogate is in while it is still being
//! constructed; calls made then bypass recording entirely.

use crate::creation::settings::MockSettings;
use crate::interception::dispatcher::InterceptionDispatcher;
use crate::interception::identity;
use crate::invocation::method::MethodSignature;
use crate::utils::errors::{EngineError, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};
use ulid::Ulid;

/// Unique id of a mock instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MockId(Ulid);

impl MockId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for MockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) struct MockInner {
    id: MockId,
    settings: Arc<MockSettings>,
    dispatcher: OnceCell<Arc<InterceptionDispatcher>>,
}

/// Shared handle to one mock instance
///
/// Clones refer to the same instance. Equality and hashing are by instance
/// identity, never by the mocked type's state.
#[derive(Clone)]
pub struct Mock {
    inner: Arc<MockInner>,
}

impl Mock {
    /// A mock with no dispatcher attached yet
    pub fn new(settings: Arc<MockSettings>) -> Self {
        Self {
            inner: Arc::new(MockInner {
                id: MockId::new(),
                settings,
                dispatcher: OnceCell::new(),
            }),
        }
    }

    pub fn id(&self) -> MockId {
        self.inner.id
    }

    pub fn settings(&self) -> &Arc<MockSettings> {
        &self.inner.settings
    }

    pub fn name(&self) -> String {
        self.inner.settings.mock_name()
    }

    /// Attach the dispatcher; a mock's dispatcher is set exactly once
    pub fn attach(&self, dispatcher: InterceptionDispatcher) -> Result<()> {
        self.inner
            .dispatcher
            .set(Arc::new(dispatcher))
            .map_err(|_| {
                EngineError::MockCreation(format!(
                    "Mock {} already has a dispatcher attached",
                    self
                ))
            })
    }

    pub fn dispatcher(&self) -> Option<&Arc<InterceptionDispatcher>> {
        self.inner.dispatcher.get()
    }

    pub fn is_attached(&self) -> bool {
        self.inner.dispatcher.get().is_some()
    }

    /// Non-owning handle to this instance
    pub fn downgrade(&self) -> WeakMock {
        WeakMock {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn instance_ptr(&self) -> *const () {
        Arc::as_ptr(&self.inner) as *const ()
    }
}

/// Non-owning reference to a mock instance
///
/// Invocation records keep one of these so that a handler retaining history
/// does not keep the mock (and through it, itself) alive.
#[derive(Clone)]
pub struct WeakMock {
    inner: Weak<MockInner>,
}

impl WeakMock {
    /// The mock, if it is still alive
    pub fn upgrade(&self) -> Option<Mock> {
        self.inner.upgrade().map(|inner| Mock { inner })
    }

    /// True iff this refers to the same instance as `mock`
    pub fn refers_to(&self, mock: &Mock) -> bool {
        std::ptr::eq(self.inner.as_ptr() as *const (), mock.instance_ptr())
    }
}

impl PartialEq for Mock {
    fn eq(&self, other: &Self) -> bool {
        identity::identity_equals(self, other)
    }
}

impl Eq for Mock {}

impl Hash for Mock {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(identity::identity_hash(self));
    }
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mock")
            .field("id", &self.inner.id)
            .field("type_name", &self.inner.settings.type_name)
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl fmt::Display for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name(), self.inner.id)
    }
}

/// Implemented by every surrogate type to expose its mock handle
pub trait MockAccess {
    fn mock(&self) -> &Mock;
}

impl MockAccess for Mock {
    fn mock(&self) -> &Mock {
        self
    }
}

/// A surrogate type that can be built around a mock handle
///
/// This is the surface a surrogate generator emits alongside the
/// overridden methods; creation and transport both go through it.
pub trait Surrogate: MockAccess + Sized + 'static {
    /// Name of the mocked type
    const TYPE_NAME: &'static str;

    /// Signatures of every overridable method
    fn methods() -> &'static [&'static MethodSignature];

    /// Wrap a mock handle in the surrogate
    fn from_mock(mock: Mock) -> Self;
}
