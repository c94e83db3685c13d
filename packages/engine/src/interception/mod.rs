// packages/engine/src/interception/mod.rs
//! Method interception layer
//!
//! Every call on a mock passes through here:
//!
//! - **Mock**: instance handle and the dispatcher slot surrogates embed
//! - **Dispatch Policy**: entry points surrogate method bodies call
//! - **Dispatcher**: builds the invocation record and calls the handler
//! - **Identity**: equality and hashing by mock instance
//!
//! # Architecture
//!
//! ```text
//! Surrogate method body
//!     │
//!     ├─ concrete method → intercept_concrete ─┐
//!     └─ abstract method → intercept_abstract ─┤
//!                                              │
//!         no dispatcher? → real result / default stub
//!                                              │
//!                     InterceptionDispatcher ──┴→ InvocationRecord → MockHandler
//! ```

pub mod dispatch_policy;
pub mod dispatcher;
pub mod identity;
pub mod mock;

// Re-export commonly used types
pub use dispatch_policy::{intercept_abstract, intercept_concrete, Binding};
pub use dispatcher::InterceptionDispatcher;
pub use identity::{identity_equals, identity_hash};
pub use mock::{Mock, MockAccess, MockId, Surrogate, WeakMock};
