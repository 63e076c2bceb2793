//! Notifications emitted by `GraphSession`
//!
//! Polled with `drain_events()` once per frame, no callbacks.

use super::compact::CompactKind;
use atlas_types::LayoutMode;
use egui::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    /// Positions were recomputed
    LayoutChanged { mode: LayoutMode, nodes: usize },
    /// Zoom or pan was committed by the engine
    ViewportChanged { zoom: f32, pan: Vec2 },
    /// The animating window after a programmatic move ended
    ViewportSettled,
    /// A fit request had nothing usable to frame
    FitSkipped,
    CompactionEntered(CompactKind),
    CompactionExited(CompactKind),
    /// The debounced search query took effect
    SearchApplied { query: String },
    ExpansionToggled { key: String, expanded: bool },
}

/// FIFO of pending events
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GraphEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: GraphEvent) {
        tracing::trace!(?event, "graph event");
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
