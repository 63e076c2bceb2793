//! Shared Model Types for the Schema Atlas
//!
//! This crate is the single source of truth for the data dictionary model that the
//! layout engine consumes and for the view settings the UI can change.
//!
//! ## Boundaries
//!
//! ```text
//! ┌──────────────────┐  Model   ┌──────────────────┐  positions  ┌──────────┐
//! │  Model Builder   │ ───────► │  atlas-graph     │ ──────────► │ Renderer │
//! │  (spreadsheet)   │          │  (layout/camera) │             │          │
//! └──────────────────┘          └──────────────────┘             └──────────┘
//! ```
//!
//! ## Rules
//!
//! 1. Tables are keyed by `"{layer}.{name}"`
//! 2. The engine never mutates a `Model`
//! 3. Enums serialize as kebab-case strings

pub mod error;
pub mod filter;
pub mod model;
pub mod settings;

pub use error::TypeError;
pub use filter::{LayerFilter, ModelFilter};
pub use model::{table_key, Field, Layer, Model, Relationship, RelationshipKind, Table};
pub use settings::{LayoutMode, TableSize, ViewMode};
