//! Layout and viewport engine for the schema atlas
//!
//! Pure geometry over `atlas-types` models: no rendering, no I/O besides
//! optional config loading. See [`graph`] for the module map.

pub mod error;
pub mod graph;

pub use error::{GraphError, Result};
pub use graph::*;
