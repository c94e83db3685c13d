// packages/engine/src/utils/mod.rs
//! Common utilities
//!
//! - **errors**: Engine error type and result alias
//! - **config**: Layered engine configuration

pub mod config;
pub mod errors;

pub use config::EngineConfig;
pub use errors::{EngineError, Result};
