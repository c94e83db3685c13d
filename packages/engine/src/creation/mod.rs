// packages/engine/src/creation/mod.rs
//! Mock creation
//!
//! Builds surrogate instances around a fresh [`Mock`](crate::interception::mock::Mock)
//! handle and wires their dispatcher. Transport goes through the same path,
//! so a transported mock is indistinguishable from a newly created one.

pub mod mock_maker;
pub mod settings;

pub use mock_maker::MockMaker;
pub use settings::MockSettings;
