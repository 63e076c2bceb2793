//! Schema Atlas Graph Engine
//!
//! Positions table cards for a three-layer data dictionary and drives the
//! camera that looks at them.
//!
//! # Architecture
//!
//! ```text
//! Model + ModelFilter + LayoutSettings
//!        │
//!        ▼
//! LayoutEngine (grid / hierarchical / domain / overview / force)
//!        │
//!        ▼
//! PositionMap (key -> top-left)
//!        │
//!        ├──► grouping (domain container rects)
//!        ├──► spatial (R-tree hit testing)
//!        ├──► Compactor (focus / search temporary layouts)
//!        │
//!        └──► viewport_fit ──► Camera2D (zoom + pan)
//!
//! GraphSession owns all of the above and queues GraphEvents
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut session = GraphSession::new(EngineConfig::default());
//! session.set_viewport_size(Vec2::new(1600.0, 900.0));
//! session.set_model(model, now_ms);
//! session.tick(now_ms);
//! for event in session.drain_events() { /* ... */ }
//! ```

pub mod camera;
pub mod compact;
pub mod config;
pub mod events;
pub mod force_sim;
pub mod grouping;
pub mod layout;
pub mod session;
pub mod sizing;
pub mod spatial;
pub mod timer;
pub mod viewport_fit;

pub use camera::{Camera2D, CameraTick};
pub use compact::{CompactKind, CompactLayout, Compactor};
pub use config::{
    CompactConfig, EngineConfig, GroupingConfig, LayoutConfig, SizingConfig, ViewportConfig,
};
pub use events::GraphEvent;
pub use force_sim::{ForceConfig, ForceSimulation};
pub use grouping::{compute_domain_boxes, DomainBox};
pub use layout::{LayoutEngine, LayoutSettings, PositionMap};
pub use session::{GraphSession, HitTarget};
pub use sizing::{node_size, AnchorSide, NodeGeometry};
pub use spatial::SpatialIndex;
pub use timer::ScheduledTask;
pub use viewport_fit::{compute_fit_view, FitView, ZoomBand};
