//! Parse errors for the string forms of model enums.

use thiserror::Error;

/// Error raised when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    #[error("Unknown relationship kind: {0}")]
    UnknownRelationshipKind(String),

    #[error("Unknown layout mode: {0}")]
    UnknownLayoutMode(String),

    #[error("Unknown table size: {0}")]
    UnknownTableSize(String),

    #[error("Unknown view mode: {0}")]
    UnknownViewMode(String),
}
