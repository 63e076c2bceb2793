//! Focus and search compaction - temporary layouts with exact restore
//!
//! Both modes overwrite part of the position map and must put every position
//! back verbatim on exit. At most one snapshot exists: the active mode and its
//! snapshot live together in a single `Option`, so the two modes cannot be
//! active at once and restore clears the snapshot in the same step that applies
//! it.
//!
//! ```text
//!   incoming                 outgoing
//!   ┌─────┐                  ┌─────┐
//!   │  a  │──┐    ┌─────┐ ┌─►│  c  │
//!   └─────┘  ├───►│ AN  │─┘  └─────┘
//!   ┌─────┐  │    └─────┘
//!   │  b  │──┘    (0, 0)
//!   └─────┘
//! ```

use super::config::CompactConfig;
use super::layout::PositionMap;
use super::sizing::NodeGeometry;
use atlas_types::{Model, Table};
use egui::Pos2;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactKind {
    Focus,
    Search,
}

#[derive(Debug, Clone)]
struct ActiveCompact {
    kind: CompactKind,
    snapshot: PositionMap,
    /// Anchor table of a focus compaction
    focus_key: Option<String>,
}

/// Result of arranging a compacted set
#[derive(Debug, Clone, PartialEq)]
pub struct CompactLayout {
    /// Keys that were moved, for fitting the viewport
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Compactor {
    active: Option<ActiveCompact>,
}

impl Compactor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_kind(&self) -> Option<CompactKind> {
        self.active.as_ref().map(|a| a.kind)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_focus_active(&self) -> bool {
        self.active_kind() == Some(CompactKind::Focus)
    }

    pub fn is_search_active(&self) -> bool {
        self.active_kind() == Some(CompactKind::Search)
    }

    pub fn focus_key(&self) -> Option<&str> {
        self.active.as_ref().and_then(|a| a.focus_key.as_deref())
    }

    /// Snapshot taken on entry, if a mode is active
    pub fn snapshot(&self) -> Option<&PositionMap> {
        self.active.as_ref().map(|a| &a.snapshot)
    }

    /// Enter focus compaction around `anchor`, or re-arrange in place if focus
    /// is already active. Ignored while search compaction is active or when the
    /// anchor is not visible.
    ///
    /// With `field`, only relationships attached to that field of the anchor
    /// count as neighbors.
    #[allow(clippy::too_many_arguments)]
    pub fn focus(
        &mut self,
        positions: &mut PositionMap,
        model: &Model,
        visible: &HashSet<String>,
        anchor: &str,
        field: Option<&str>,
        geometry: &NodeGeometry,
        config: &CompactConfig,
    ) -> Option<CompactLayout> {
        if self.is_search_active() {
            tracing::debug!(anchor, "focus compaction ignored: search compaction active");
            return None;
        }
        if !visible.contains(anchor) {
            return None;
        }

        let (incoming, outgoing) = neighbors(model, visible, anchor, field);
        let arranged = arrange_focus(anchor, &incoming, &outgoing, geometry, config);
        self.apply(CompactKind::Focus, Some(anchor.to_string()), positions, arranged)
    }

    /// Enter search compaction over `matches`, or re-arrange in place if search
    /// is already active. Ignored while focus compaction is active.
    pub fn search(
        &mut self,
        positions: &mut PositionMap,
        matches: &[&Table],
        geometry: &NodeGeometry,
        config: &CompactConfig,
    ) -> Option<CompactLayout> {
        if self.is_focus_active() {
            tracing::debug!("search compaction ignored: focus compaction active");
            return None;
        }
        if matches.is_empty() {
            return None;
        }
        let arranged = arrange_search(matches, geometry, config);
        self.apply(CompactKind::Search, None, positions, arranged)
    }

    fn apply(
        &mut self,
        kind: CompactKind,
        focus_key: Option<String>,
        positions: &mut PositionMap,
        arranged: Vec<(String, Pos2)>,
    ) -> Option<CompactLayout> {
        match self.active.as_mut() {
            Some(active) if active.kind == kind => {
                // update in place: start again from the entry snapshot
                *positions = active.snapshot.clone();
                active.focus_key = focus_key;
            }
            Some(_) => return None,
            None => {
                self.active = Some(ActiveCompact {
                    kind,
                    snapshot: positions.clone(),
                    focus_key,
                });
                tracing::debug!(?kind, nodes = arranged.len(), "compaction entered");
            }
        }

        let keys = arranged.iter().map(|(key, _)| key.clone()).collect();
        positions.extend(arranged);
        Some(CompactLayout { keys })
    }

    /// Restore the snapshot and leave the active mode. Returns false if nothing
    /// was active, which makes a second restore a no-op.
    pub fn restore(&mut self, positions: &mut PositionMap) -> bool {
        match self.active.take() {
            Some(active) => {
                tracing::debug!(kind = ?active.kind, "compaction exited");
                *positions = active.snapshot;
                true
            }
            None => false,
        }
    }

    /// Restore only if `kind` is the active mode
    pub fn restore_kind(&mut self, kind: CompactKind, positions: &mut PositionMap) -> bool {
        if self.active_kind() == Some(kind) {
            self.restore(positions)
        } else {
            false
        }
    }

    /// Drop the snapshot without restoring (the model it described is gone)
    pub fn discard(&mut self) {
        self.active = None;
    }
}

// =============================================================================
// ARRANGEMENTS
// =============================================================================

/// Sources of edges into the anchor and targets of edges out of it, in
/// relationship order. A table that is both counts as incoming.
fn neighbors(
    model: &Model,
    visible: &HashSet<String>,
    anchor: &str,
    field: Option<&str>,
) -> (Vec<String>, Vec<String>) {
    let mut seen: HashSet<&str> = HashSet::from([anchor]);
    let mut incoming = Vec::new();
    let mut outgoing = Vec::new();

    let field_matches = |candidate: &Option<String>| match field {
        Some(f) => candidate.as_deref() == Some(f),
        None => true,
    };

    for rel in &model.relationships {
        if rel.is_self_loop() {
            continue;
        }
        if rel.target == anchor
            && field_matches(&rel.target_field)
            && visible.contains(&rel.source)
            && seen.insert(rel.source.as_str())
        {
            incoming.push(rel.source.clone());
        }
    }
    for rel in &model.relationships {
        if rel.is_self_loop() {
            continue;
        }
        if rel.source == anchor
            && field_matches(&rel.source_field)
            && visible.contains(&rel.target)
            && seen.insert(rel.target.as_str())
        {
            outgoing.push(rel.target.clone());
        }
    }

    (incoming, outgoing)
}

fn arrange_focus(
    anchor: &str,
    incoming: &[String],
    outgoing: &[String],
    geometry: &NodeGeometry,
    config: &CompactConfig,
) -> Vec<(String, Pos2)> {
    let column_x = geometry.width() + config.focus_h_gap;
    let mut arranged = vec![(anchor.to_string(), Pos2::ZERO)];
    arranged.extend(stack_column(incoming, -column_x, geometry, config.focus_v_gap));
    arranged.extend(stack_column(outgoing, column_x, geometry, config.focus_v_gap));
    arranged
}

/// Vertical stack at `x`, centered on the anchor's vertical midpoint
fn stack_column(keys: &[String], x: f32, geometry: &NodeGeometry, gap: f32) -> Vec<(String, Pos2)> {
    let h = geometry.height();
    let n = keys.len() as f32;
    let total = n * h + (n - 1.0).max(0.0) * gap;
    let top = h / 2.0 - total / 2.0;
    keys.iter()
        .enumerate()
        .map(|(i, key)| (key.clone(), Pos2::new(x, top + i as f32 * (h + gap))))
        .collect()
}

/// Column count of the search grid
pub fn search_columns(n: usize) -> usize {
    if n <= 4 {
        n
    } else {
        ((n as f64).sqrt().ceil() as usize).max(2)
    }
}

fn arrange_search(matches: &[&Table], geometry: &NodeGeometry, config: &CompactConfig) -> Vec<(String, Pos2)> {
    let mut sorted: Vec<&Table> = matches.to_vec();
    sorted.sort_by_cached_key(|t| (t.name.to_lowercase(), t.name.clone(), t.key.clone()));

    let n = sorted.len();
    let cols = search_columns(n).max(1);
    let rows = n.div_ceil(cols);
    let size = geometry.size;
    let gap = config.search_gap;
    let total_w = cols as f32 * size.x + (cols - 1) as f32 * gap;
    let total_h = rows as f32 * size.y + rows.saturating_sub(1) as f32 * gap;
    let origin = Pos2::new(-total_w / 2.0, -total_h / 2.0);

    sorted
        .into_iter()
        .enumerate()
        .map(|(i, table)| {
            let col = (i % cols) as f32;
            let row = (i / cols) as f32;
            (
                table.key.clone(),
                Pos2::new(origin.x + col * (size.x + gap), origin.y + row * (size.y + gap)),
            )
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
