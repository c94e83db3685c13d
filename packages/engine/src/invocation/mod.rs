// packages/engine/src/invocation/mod.rs
//! Invocation capture
//!
//! The value types an intercepted call is turned into:
//!
//! - **Sequence**: process-wide total order over all invocations
//! - **Location**: call-site locator for diagnostics
//! - **Value**: dynamic arguments, results and default stubs
//! - **Method**: delegating and serializable method descriptors
//! - **Method Registry**: name-based lookup for serializable descriptors
//! - **Record**: the immutable invocation record and its real-call capability
//!
//! # Architecture
//!
//! ```text
//! surrogate method body
//!     │  (mock, &'static MethodSignature, [Value], RealCall)
//!     ▼
//! InvocationRecord ◄── sequence::next()
//!     │            ◄── CallSiteLocator::capture()
//!     │            ◄── MethodStrategy::describe()
//!     ▼
//! MockHandler::handle()
//! ```

pub mod location;
pub mod method;
pub mod method_registry;
pub mod record;
pub mod sequence;
pub mod value;

// Re-export commonly used types
pub use location::CallSiteLocator;
pub use method::{
    DelegatingMethod, MethodDescriptor, MethodKey, MethodSignature, MethodStrategy, MockMethod,
    RealDispatch, SerializableMethod,
};
pub use method_registry::MethodRegistry;
pub use record::{InvocationRecord, RealCall, RealFn};
pub use sequence::Sequencer;
pub use value::{ObjectRef, Value, ValueKind};
