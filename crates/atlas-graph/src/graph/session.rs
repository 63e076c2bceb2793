//! GraphSession - the single owner of engine state
//!
//! Holds the model, filters, layout settings, the position map, manual
//! positions, the camera, the compactor and the timers. All mutation goes
//! through the methods below; results the UI needs to react to are queued as
//! `GraphEvent`s and polled with `drain_events()`.
//!
//! # Frame loop
//! ```ignore
//! session.tick(now_ms);
//! for event in session.drain_events() { /* react */ }
//! for (key, pos) in session.positions() { /* draw card */ }
//! ```
//!
//! Search is the one filter that does not re-run the layout: after the
//! debounce it compacts the matching tables into a grid, and clearing the
//! query restores the previous positions.

use super::camera::Camera2D;
use super::compact::{CompactKind, Compactor};
use super::config::EngineConfig;
use super::events::{EventQueue, GraphEvent};
use super::grouping::{compute_domain_boxes, member_rects, DomainBox};
use super::layout::{LayoutEngine, LayoutSettings, PositionMap};
use super::sizing::{AnchorSide, NodeGeometry};
use super::spatial::{SpatialHit, SpatialIndex};
use super::timer::ScheduledTask;
use atlas_types::{
    LayerFilter, LayoutMode, Model, ModelFilter, Relationship, Table, TableSize, ViewMode,
};
use egui::{Pos2, Rect, Vec2};
use std::collections::{BTreeSet, HashSet};

/// What a world point lands on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Table(String),
    Field { table: String, field: String },
    DomainHeader(String),
}

impl HitTarget {
    /// Table key for table and field hits
    pub fn table_key(&self) -> Option<&str> {
        match self {
            HitTarget::Table(key) | HitTarget::Field { table: key, .. } => Some(key),
            HitTarget::DomainHeader(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphSession {
    config: EngineConfig,
    model: Model,
    /// Layer and category filter plus the applied (debounced) search
    filter: ModelFilter,
    pending_search: ScheduledTask<String>,
    settings: LayoutSettings,
    positions: PositionMap,
    /// Positions set by dragging; survive re-layout
    manual: PositionMap,
    camera: Camera2D,
    compactor: Compactor,
    focus_mode: bool,
    expanded: BTreeSet<String>,
    last_fit_token: Option<u64>,
    events: EventQueue,
}

impl Default for GraphSession {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl GraphSession {
    pub fn new(config: EngineConfig) -> Self {
        let camera = Camera2D::new(config.viewport.clone());
        let settings = LayoutSettings {
            viewport_size: camera.screen_size(),
            ..LayoutSettings::default()
        };
        Self {
            config,
            model: Model::default(),
            filter: ModelFilter::default(),
            pending_search: ScheduledTask::new(),
            settings,
            positions: PositionMap::new(),
            manual: PositionMap::new(),
            camera,
            compactor: Compactor::new(),
            focus_mode: false,
            expanded: BTreeSet::new(),
            last_fit_token: None,
            events: EventQueue::default(),
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn filter(&self) -> &ModelFilter {
        &self.filter
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    pub fn position(&self, key: &str) -> Option<Pos2> {
        self.positions.get(key).copied()
    }

    pub fn manual_positions(&self) -> &PositionMap {
        &self.manual
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn compactor(&self) -> &Compactor {
        &self.compactor
    }

    pub fn focus_mode(&self) -> bool {
        self.focus_mode
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }

    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        self.events.drain()
    }

    pub fn geometry(&self) -> NodeGeometry {
        NodeGeometry::new(
            &self.config.sizing,
            self.settings.table_size,
            self.settings.view_mode,
            self.settings.mode,
            self.settings.compact_overview,
        )
    }

    /// Layer and category filter without the search query
    fn layout_filter(&self) -> ModelFilter {
        ModelFilter {
            search: String::new(),
            ..self.filter.clone()
        }
    }

    /// Tables currently shown (layer, category and applied search)
    pub fn visible_tables(&self) -> Vec<&Table> {
        self.filter.visible_tables(&self.model)
    }

    pub fn visible_keys(&self) -> Vec<String> {
        self.filter.visible_keys(&self.model)
    }

    // =========================================================================
    // INPUTS THAT RE-RUN THE LAYOUT
    // =========================================================================

    /// Replace the model. Manual positions, expansion and any compaction
    /// snapshot describe the old model and are dropped.
    pub fn set_model(&mut self, model: Model, now_ms: u64) {
        self.model = model;
        self.manual.clear();
        self.expanded.clear();
        self.compactor.discard();
        self.relayout(now_ms);
    }

    pub fn set_layout_mode(&mut self, mode: LayoutMode, now_ms: u64) {
        if self.settings.mode != mode {
            self.settings.mode = mode;
            self.relayout(now_ms);
        }
    }

    pub fn set_table_size(&mut self, size: TableSize, now_ms: u64) {
        if self.settings.table_size != size {
            self.settings.table_size = size;
            self.relayout(now_ms);
        }
    }

    pub fn set_view_mode(&mut self, view: ViewMode, now_ms: u64) {
        if self.settings.view_mode != view {
            self.settings.view_mode = view;
            self.relayout(now_ms);
        }
    }

    pub fn set_compact_overview(&mut self, compact: bool, now_ms: u64) {
        if self.settings.compact_overview != compact {
            self.settings.compact_overview = compact;
            if self.settings.mode.is_overview() {
                self.relayout(now_ms);
            }
        }
    }

    pub fn set_layer_filter(&mut self, layers: LayerFilter, now_ms: u64) {
        if self.filter.layers != layers {
            self.filter.layers = layers;
            self.on_filter_changed(now_ms);
        }
    }

    pub fn set_category_filter(&mut self, categories: BTreeSet<String>, now_ms: u64) {
        if self.filter.categories != categories {
            self.filter.categories = categories;
            self.on_filter_changed(now_ms);
        }
    }

    /// Explicit domain order for domain-overview
    pub fn set_category_order(&mut self, order: Vec<String>, now_ms: u64) {
        self.settings.category_order = order;
        if self.settings.mode.is_overview() {
            self.relayout(now_ms);
        }
    }

    pub fn set_zoom_hint(&mut self, zoom_hint: Option<f32>) {
        self.settings.zoom_hint = zoom_hint;
    }

    /// Container resized. Does not re-run the layout.
    pub fn set_viewport_size(&mut self, size: Vec2) {
        self.camera.set_screen_size(size);
        self.settings.viewport_size = self.camera.screen_size();
    }

    fn on_filter_changed(&mut self, now_ms: u64) {
        let layout_filter = self.layout_filter();
        let model = &self.model;
        self.manual.retain(|key, _| {
            model
                .table(key)
                .is_some_and(|table| layout_filter.is_visible(table))
        });
        self.relayout(now_ms);
    }

    /// Recompute positions and frame the result. Any compaction is restored
    /// first so its snapshot never outlives the layout it was taken from; an
    /// applied search query compacts again over the new positions.
    pub fn relayout(&mut self, now_ms: u64) {
        self.restore_compaction();
        let filter = self.layout_filter();
        let engine = LayoutEngine::new(&self.config, &self.settings);
        self.positions = engine.compute_layout(&self.model, &filter, &self.manual);
        self.events.push(GraphEvent::LayoutChanged {
            mode: self.settings.mode,
            nodes: self.positions.len(),
        });
        self.fit_to_view(now_ms);
        if self.filter.is_search_active() {
            self.apply_search(self.filter.search.clone(), now_ms);
        }
    }

    // =========================================================================
    // FITTING
    // =========================================================================

    /// Fit-to-view over every visible table
    pub fn fit_to_view(&mut self, now_ms: u64) -> bool {
        let keys = self.visible_keys();
        let mut boxes = self.boxes_for(&keys);
        let count = boxes.len();
        if self.settings.mode.shows_domain_containers() && !self.compactor.is_active() {
            boxes.extend(self.domain_boxes().into_iter().map(|d| d.rect));
        }
        self.commit_fit(&boxes, count, now_ms)
    }

    /// Fit to the visible members of one domain
    pub fn fit_to_domain(&mut self, category: &str, now_ms: u64) -> bool {
        let boxes = member_rects(&self.model, &self.filter, &self.positions, &self.geometry(), category);
        let count = boxes.len();
        self.commit_fit(&boxes, count, now_ms)
    }

    /// Fit to a specific set of tables
    pub fn fit_to_keys(&mut self, keys: &[String], now_ms: u64) -> bool {
        let boxes = self.boxes_for(keys);
        let count = boxes.len();
        self.commit_fit(&boxes, count, now_ms)
    }

    /// External fit request. Acts only when `token` is newer than the last one.
    pub fn request_fit(&mut self, token: u64, now_ms: u64) -> bool {
        if !self.accept_token(token) {
            return false;
        }
        self.fit_to_view(now_ms)
    }

    pub fn request_fit_to_domain(&mut self, token: u64, category: &str, now_ms: u64) -> bool {
        if !self.accept_token(token) {
            return false;
        }
        self.fit_to_domain(category, now_ms)
    }

    fn accept_token(&mut self, token: u64) -> bool {
        if self.last_fit_token.is_some_and(|last| token <= last) {
            tracing::debug!(token, "stale fit request ignored");
            return false;
        }
        self.last_fit_token = Some(token);
        true
    }

    fn boxes_for(&self, keys: &[String]) -> Vec<Rect> {
        let geometry = self.geometry();
        keys.iter()
            .filter_map(|key| self.positions.get(key))
            .map(|pos| geometry.rect_at(*pos))
            .collect()
    }

    fn commit_fit(&mut self, boxes: &[Rect], count: usize, now_ms: u64) -> bool {
        let overview = self.settings.mode.is_overview();
        if self.camera.fit_to_boxes(boxes, count, overview, now_ms) {
            self.push_viewport_changed();
            true
        } else {
            self.events.push(GraphEvent::FitSkipped);
            false
        }
    }

    fn push_viewport_changed(&mut self) {
        self.events.push(GraphEvent::ViewportChanged {
            zoom: self.camera.zoom(),
            pan: self.camera.pan(),
        });
    }

    // =========================================================================
    // DOMAINS
    // =========================================================================

    /// Container rectangles, only in the modes that draw containers
    pub fn domain_boxes(&self) -> Vec<DomainBox> {
        if !self.settings.mode.shows_domain_containers() {
            return Vec::new();
        }
        compute_domain_boxes(
            &self.model,
            &self.filter,
            &self.positions,
            &self.geometry(),
            &self.config.grouping,
        )
    }

    // =========================================================================
    // DRAGGING
    // =========================================================================

    /// Move a table by a world-space delta. Outside compaction the result is
    /// remembered as a manual position.
    pub fn move_node(&mut self, key: &str, world_delta: Vec2) -> bool {
        if !world_delta.x.is_finite() || !world_delta.y.is_finite() {
            return false;
        }
        match self.positions.get(key).copied() {
            Some(pos) => self.set_manual_position(key, pos + world_delta),
            None => false,
        }
    }

    /// Pin a visible table at `position`
    pub fn set_manual_position(&mut self, key: &str, position: Pos2) -> bool {
        if !position.x.is_finite() || !position.y.is_finite() || !self.positions.contains_key(key) {
            return false;
        }
        self.positions.insert(key.to_string(), position);
        if !self.compactor.is_active() {
            self.manual.insert(key.to_string(), position);
        }
        true
    }

    /// Forget every manual position and lay out again
    pub fn reset_manual_positions(&mut self, now_ms: u64) {
        self.manual.clear();
        self.relayout(now_ms);
    }

    // =========================================================================
    // SEARCH
    // =========================================================================

    /// Query typed into the search box. Non-empty queries take effect after
    /// the debounce; clearing the query applies at once.
    pub fn set_search(&mut self, query: &str, now_ms: u64) {
        if query.trim().is_empty() {
            self.pending_search.cancel();
            if self.filter.is_search_active() {
                self.apply_search(String::new(), now_ms);
            }
            return;
        }
        self.pending_search
            .schedule(now_ms, self.config.compact.search_debounce_ms, query.to_string());
    }

    fn apply_search(&mut self, query: String, now_ms: u64) {
        self.filter.search = query.clone();
        self.events.push(GraphEvent::SearchApplied { query });

        // Focus keeps the camera; the stored query compacts once focus exits.
        if self.compactor.is_focus_active() {
            tracing::debug!("search stored while focus compaction is active");
            return;
        }

        if !self.filter.is_search_active() {
            if self.compactor.restore_kind(CompactKind::Search, &mut self.positions) {
                self.events.push(GraphEvent::CompactionExited(CompactKind::Search));
            }
            self.fit_to_view(now_ms);
            return;
        }

        let geometry = self.geometry();
        let matches: Vec<&Table> = self
            .filter
            .visible_tables(&self.model)
            .into_iter()
            .filter(|t| self.positions.contains_key(&t.key))
            .collect();
        if matches.is_empty() {
            if self.compactor.restore_kind(CompactKind::Search, &mut self.positions) {
                self.events.push(GraphEvent::CompactionExited(CompactKind::Search));
            }
            self.events.push(GraphEvent::FitSkipped);
            return;
        }

        let was_active = self.compactor.is_search_active();
        let layout = self
            .compactor
            .search(&mut self.positions, &matches, &geometry, &self.config.compact);
        match layout {
            Some(layout) => {
                if !was_active {
                    self.events.push(GraphEvent::CompactionEntered(CompactKind::Search));
                }
                self.fit_to_keys(&layout.keys, now_ms);
            }
            None => {
                self.fit_to_view(now_ms);
            }
        }
    }

    // =========================================================================
    // FOCUS
    // =========================================================================

    pub fn set_focus_mode(&mut self, enabled: bool, now_ms: u64) {
        self.focus_mode = enabled;
        if !enabled {
            self.exit_focus(now_ms);
        }
    }

    /// A table (or one of its fields) was selected. Compacts around it when
    /// focus mode is on and no search compaction is active.
    pub fn focus_select(&mut self, table: &str, field: Option<&str>, now_ms: u64) -> bool {
        if !self.focus_mode {
            return false;
        }
        let visible: HashSet<String> = self.visible_keys().into_iter().collect();
        let geometry = self.geometry();
        let was_active = self.compactor.is_focus_active();
        let layout = self.compactor.focus(
            &mut self.positions,
            &self.model,
            &visible,
            table,
            field,
            &geometry,
            &self.config.compact,
        );
        match layout {
            Some(layout) => {
                if !was_active {
                    self.events.push(GraphEvent::CompactionEntered(CompactKind::Focus));
                }
                self.fit_to_keys(&layout.keys, now_ms);
                true
            }
            None => false,
        }
    }

    /// Leave focus compaction and restore positions. A search query stored
    /// during focus compacts now; otherwise everything is framed.
    pub fn exit_focus(&mut self, now_ms: u64) -> bool {
        if self.compactor.restore_kind(CompactKind::Focus, &mut self.positions) {
            self.events.push(GraphEvent::CompactionExited(CompactKind::Focus));
            if self.filter.is_search_active() {
                self.apply_search(self.filter.search.clone(), now_ms);
            } else {
                self.fit_to_view(now_ms);
            }
            true
        } else {
            false
        }
    }

    fn restore_compaction(&mut self) {
        if let Some(kind) = self.compactor.active_kind() {
            self.compactor.restore(&mut self.positions);
            self.events.push(GraphEvent::CompactionExited(kind));
        }
    }

    // =========================================================================
    // EXPANSION
    // =========================================================================

    /// Toggle a table's expanded state. Returns the new state.
    pub fn toggle_expanded(&mut self, key: &str) -> bool {
        let expanded = if self.expanded.remove(key) {
            false
        } else {
            self.expanded.insert(key.to_string());
            true
        };
        self.events.push(GraphEvent::ExpansionToggled {
            key: key.to_string(),
            expanded,
        });
        expanded
    }

    // =========================================================================
    // GEOMETRY QUERIES
    // =========================================================================

    /// What the world point lands on: a field row, a table card or a domain
    /// header
    pub fn hit_test(&self, world: Pos2) -> Option<HitTarget> {
        let geometry = self.geometry();
        let visible: HashSet<String> = self.visible_keys().into_iter().collect();
        let shown: PositionMap = self
            .positions
            .iter()
            .filter(|(key, _)| visible.contains(*key))
            .map(|(key, pos)| (key.clone(), *pos))
            .collect();
        let domains = self.domain_boxes();
        let index = SpatialIndex::build(&shown, &geometry, &domains, self.config.grouping.header_offset);

        match index.hit_test(world, &geometry)? {
            SpatialHit::Table { key, row } => {
                let field = row.and_then(|row| {
                    self.model
                        .table(&key)
                        .and_then(|table| table.fields.get(row))
                        .map(|f| f.name.clone())
                });
                Some(match field {
                    Some(field) => HitTarget::Field { table: key, field },
                    None => HitTarget::Table(key),
                })
            }
            SpatialHit::DomainHeader(category) => Some(HitTarget::DomainHeader(category)),
        }
    }

    /// Screen-space hit test
    pub fn hit_test_screen(&self, screen: Pos2) -> Option<HitTarget> {
        self.hit_test(self.camera.screen_to_world(screen))
    }

    /// World endpoints of a relationship, or `None` if either side has no
    /// position (the renderer skips the edge)
    pub fn edge_endpoints(&self, rel: &Relationship) -> Option<(Pos2, Pos2)> {
        let source = self.positions.get(&rel.source)?;
        let target = self.positions.get(&rel.target)?;
        let geometry = self.geometry();
        let field_index = |key: &str, field: &Option<String>| {
            let name = field.as_deref()?;
            self.model.table(key)?.field_index(name)
        };
        let (source_side, target_side) = if target.x >= source.x {
            (AnchorSide::Right, AnchorSide::Left)
        } else {
            (AnchorSide::Left, AnchorSide::Right)
        };
        Some((
            geometry.field_anchor(*source, field_index(&rel.source, &rel.source_field), source_side),
            geometry.field_anchor(*target, field_index(&rel.target, &rel.target_field), target_side),
        ))
    }

    // =========================================================================
    // TIMERS
    // =========================================================================

    /// Fire due timers: the search debounce and the camera's timers
    pub fn tick(&mut self, now_ms: u64) {
        if let Some(query) = self.pending_search.poll(now_ms) {
            self.apply_search(query, now_ms);
        }
        let tick = self.camera.tick(now_ms);
        if tick.zoomed {
            self.push_viewport_changed();
        }
        if tick.settled {
            self.events.push(GraphEvent::ViewportSettled);
        }
    }

    /// Cancel every pending timer
    pub fn teardown(&mut self) {
        self.pending_search.cancel();
        self.camera.cancel_timers();
        tracing::debug!("graph session torn down");
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_types::{Field, Layer};
    use pretty_assertions::assert_eq;

    fn model() -> Model {
        Model::new(
            vec![
                Table::new(Layer::L1, "customers", "sales")
                    .with_fields([Field::new("id").primary_key(), Field::new("name")]),
                Table::new(Layer::L1, "orders", "sales")
                    .with_fields([Field::new("id").primary_key(), Field::new("customer_id").foreign_key()]),
                Table::new(Layer::L2, "revenue", "finance"),
                Table::new(Layer::L3, "kpi", "finance"),
            ],
            vec![
                Relationship::new("L1.customers", "L1.orders").with_fields("id", "customer_id"),
                Relationship::new("L1.orders", "L2.revenue"),
                Relationship::new("L2.revenue", "L3.kpi"),
            ],
        )
    }

    fn session() -> GraphSession {
        let mut s = GraphSession::default();
        s.set_viewport_size(Vec2::new(1200.0, 800.0));
        s.set_model(model(), 0);
        s.drain_events();
        s
    }

    #[test]
    fn test_set_model_lays_out_and_fits() {
        let mut s = GraphSession::default();
        s.set_model(model(), 0);
        assert_eq!(s.positions().len(), 4);
        let events = s.drain_events();
        assert!(matches!(events[0], GraphEvent::LayoutChanged { nodes: 4, .. }));
        assert!(matches!(events[1], GraphEvent::ViewportChanged { .. }));
        assert!(s.camera().is_animating());
    }

    #[test]
    fn test_layer_filter_drops_positions_and_manual() {
        let mut s = session();
        assert!(s.set_manual_position("L2.revenue", Pos2::new(5000.0, 5000.0)));
        s.set_layer_filter(LayerFilter::only(Layer::L1), 10);
        assert_eq!(s.positions().len(), 2);
        assert!(s.position("L2.revenue").is_none());
        assert!(s.manual_positions().is_empty());
    }

    #[test]
    fn test_manual_position_survives_mode_change() {
        let mut s = session();
        s.move_node("L1.orders", Vec2::new(1000.0, 0.0));
        let moved = s.position("L1.orders").unwrap();
        s.set_layout_mode(LayoutMode::Hierarchical, 10);
        assert_eq!(s.position("L1.orders"), Some(moved));
        s.set_layout_mode(LayoutMode::DomainOverview, 20);
        assert_ne!(s.position("L1.orders"), Some(moved));
    }

    #[test]
    fn test_fit_tokens_must_increase() {
        let mut s = session();
        assert!(s.request_fit(5, 0));
        assert!(!s.request_fit(5, 0));
        assert!(!s.request_fit(3, 0));
        assert!(s.request_fit_to_domain(6, "finance", 0));
        assert!(!s.request_fit_to_domain(6, "finance", 0));
    }

    #[test]
    fn test_search_is_debounced_and_restores() {
        let mut s = session();
        let before = s.positions().clone();

        s.set_search("ord", 1_000);
        s.tick(1_200);
        assert!(!s.compactor().is_search_active());
        s.set_search("orde", 1_200);
        s.tick(1_400);
        assert!(!s.compactor().is_search_active());
        s.tick(1_500);
        assert!(s.compactor().is_search_active());
        assert_eq!(s.visible_keys(), vec!["L1.orders".to_string()]);

        s.set_search("", 2_000);
        assert!(!s.compactor().is_search_active());
        assert_eq!(s.positions(), &before);
    }

    #[test]
    fn test_focus_select_requires_focus_mode() {
        let mut s = session();
        assert!(!s.focus_select("L1.orders", None, 0));
        s.set_focus_mode(true, 0);
        assert!(s.focus_select("L1.orders", None, 0));
        assert_eq!(s.position("L1.orders"), Some(Pos2::ZERO));
        assert!(s.compactor().is_focus_active());

        s.set_focus_mode(false, 10);
        assert!(!s.compactor().is_active());
    }

    #[test]
    fn test_search_blocks_focus() {
        let mut s = session();
        s.set_focus_mode(true, 0);
        s.set_search("orders", 0);
        s.tick(300);
        assert!(s.compactor().is_search_active());
        assert!(!s.focus_select("L1.orders", None, 400));
        assert!(s.compactor().is_search_active());
    }

    fn focused(mode: LayoutMode) -> GraphSession {
        let mut s = session();
        s.set_layout_mode(mode, 0);
        s.set_focus_mode(true, 0);
        assert!(s.focus_select("L1.orders", None, 0));
        s
    }

    #[test]
    fn test_compact_overview_toggle_drops_focus() {
        let mut s = focused(LayoutMode::DomainOverview);
        s.set_compact_overview(true, 10);
        assert!(!s.compactor().is_active());

        let mut fresh = session();
        fresh.set_compact_overview(true, 0);
        fresh.set_layout_mode(LayoutMode::DomainOverview, 0);
        assert_eq!(s.positions(), fresh.positions());

        let after = s.positions().clone();
        assert!(!s.exit_focus(20));
        assert_eq!(s.positions(), &after);
    }

    #[test]
    fn test_category_order_change_drops_focus() {
        let mut s = focused(LayoutMode::DomainOverview);
        s.set_category_order(vec!["finance".into(), "sales".into()], 10);
        assert!(!s.compactor().is_active());

        let after = s.positions().clone();
        assert!(!s.exit_focus(20));
        assert_eq!(s.positions(), &after);
    }

    #[test]
    fn test_reset_manual_positions_drops_focus() {
        let mut s = focused(LayoutMode::Grid);
        s.reset_manual_positions(10);
        assert!(!s.compactor().is_active());
        assert!(s.manual_positions().is_empty());

        let after = s.positions().clone();
        assert!(!s.exit_focus(20));
        assert_eq!(s.positions(), &after);
    }

    #[test]
    fn test_relayout_compacts_applied_search_again() {
        let mut s = session();
        s.set_search("orders", 0);
        s.tick(300);
        assert!(s.compactor().is_search_active());

        s.set_layout_mode(LayoutMode::Hierarchical, 400);
        assert!(s.compactor().is_search_active());
        assert_eq!(s.visible_keys(), vec!["L1.orders".to_string()]);

        s.set_search("", 500);
        let mut fresh = session();
        fresh.set_layout_mode(LayoutMode::Hierarchical, 0);
        assert_eq!(s.positions(), fresh.positions());
    }

    #[test]
    fn test_search_during_focus_keeps_camera() {
        let mut s = focused(LayoutMode::Grid);
        let zoom = s.camera().zoom();
        let pan = s.camera().pan();

        s.set_search("customers", 100);
        s.tick(400);
        assert_eq!(s.filter().search, "customers");
        assert!(s.compactor().is_focus_active());
        assert_eq!(s.camera().zoom(), zoom);
        assert_eq!(s.camera().pan(), pan);
    }

    #[test]
    fn test_exit_focus_applies_stored_search() {
        let mut s = focused(LayoutMode::Grid);
        s.set_search("customers", 100);
        s.tick(400);
        s.drain_events();

        assert!(s.exit_focus(500));
        assert!(s.compactor().is_search_active());
        assert_eq!(s.visible_keys(), vec!["L1.customers".to_string()]);
        let events = s.drain_events();
        assert!(events.contains(&GraphEvent::CompactionExited(CompactKind::Focus)));
        assert!(events.contains(&GraphEvent::CompactionEntered(CompactKind::Search)));
    }

    #[test]
    fn test_hit_test_resolves_field() {
        let s = session();
        let geo = s.geometry();
        let pos = s.position("L1.orders").unwrap();
        let row_y = pos.y + geo.header_height + geo.row_height() * 1.5;
        assert_eq!(
            s.hit_test(Pos2::new(pos.x + 5.0, row_y)),
            Some(HitTarget::Field {
                table: "L1.orders".into(),
                field: "customer_id".into()
            })
        );
        // row past the table's fields resolves to the table
        let empty_row = pos.y + geo.header_height + geo.row_height() * 4.5;
        assert_eq!(
            s.hit_test(Pos2::new(pos.x + 5.0, empty_row)),
            Some(HitTarget::Table("L1.orders".into()))
        );
    }

    #[test]
    fn test_domain_boxes_only_in_domain_modes() {
        let mut s = session();
        assert!(s.domain_boxes().is_empty());
        s.set_layout_mode(LayoutMode::Domain, 0);
        let boxes = s.domain_boxes();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].category, "sales");
    }

    #[test]
    fn test_edge_endpoints_use_field_rows() {
        let s = session();
        let rel = &s.model().relationships[0];
        let (from, to) = s.edge_endpoints(rel).unwrap();
        let geo = s.geometry();
        let source = s.position("L1.customers").unwrap();
        let target = s.position("L1.orders").unwrap();
        assert_eq!(from, geo.field_anchor(source, Some(0), AnchorSide::Right));
        assert_eq!(to, geo.field_anchor(target, Some(1), AnchorSide::Left));

        let dangling = Relationship::new("L1.customers", "L9.ghost");
        assert!(s.edge_endpoints(&dangling).is_none());
    }

    #[test]
    fn test_toggle_expanded() {
        let mut s = session();
        assert!(s.toggle_expanded("L1.orders"));
        assert!(s.is_expanded("L1.orders"));
        assert!(!s.toggle_expanded("L1.orders"));
        assert_eq!(s.drain_events().len(), 2);
    }

    #[test]
    fn test_teardown_cancels_timers() {
        let mut s = session();
        s.set_search("kpi", 0);
        s.teardown();
        s.tick(10_000);
        assert!(!s.compactor().is_active());
        assert!(!s.camera().is_animating());
    }
}
