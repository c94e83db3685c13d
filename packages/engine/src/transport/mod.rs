// packages/engine/src/transport/mod.rs
//! Cross-boundary transport
//!
//! A mock cannot travel as-is: its dispatcher holds process-local state.
//! Instead it is written as a [`MockReplacement`] descriptor naming the
//! mocked type, the settings and a handler snapshot, and the receiving side
//! builds a brand new mock from it.
//!
//! - **Descriptor**: the versioned wire form (JSON)
//! - **Registry**: rebuilds handlers from their snapshots
//! - **Cross Boundary**: `write_replace` / `read_resolve`

pub mod cross_boundary;
pub mod descriptor;
pub mod registry;

// Re-export commonly used types
pub use cross_boundary::CrossBoundaryTransport;
pub use descriptor::{MockReplacement, FORMAT_VERSION};
pub use registry::{HandlerFactory, HandlerRegistry};
