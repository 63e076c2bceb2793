//! End-to-end layout and viewport scenarios
//!
//! Concrete scenarios for each layout family plus property tests for the
//! engine-wide guarantees: deterministic layouts, manual positions surviving
//! re-layout, fit framing, zoom clamping, exact compaction restore and the
//! marquee click threshold.

use atlas_graph::{
    compute_fit_view, Camera2D, EngineConfig, GraphEvent, GraphSession, LayoutEngine,
    LayoutSettings, PositionMap, ViewportConfig,
};
use atlas_types::{Layer, LayoutMode, Model, ModelFilter, Relationship, Table};
use egui::{Pos2, Rect, Vec2};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn layout(model: &Model, settings: &LayoutSettings, manual: &PositionMap) -> PositionMap {
    let config = EngineConfig::default();
    LayoutEngine::new(&config, settings).compute_layout(model, &ModelFilter::default(), manual)
}

fn wide(mode: LayoutMode) -> LayoutSettings {
    LayoutSettings::default()
        .with_mode(mode)
        .with_viewport(Vec2::new(3600.0, 1200.0))
}

// =============================================================================
// LAYOUT SCENARIOS
// =============================================================================

#[test]
fn grid_wraps_fifteen_tables_into_twelve_and_three() {
    init_tracing();
    let tables = (0..15)
        .map(|i| Table::new(Layer::L1, format!("t{i:02}"), "core"))
        .collect();
    let model = Model::new(tables, vec![]);
    let positions = layout(&model, &wide(LayoutMode::Grid), &PositionMap::new());

    let rows: BTreeSet<i64> = positions.values().map(|p| p.y as i64).collect();
    assert_eq!(rows.len(), 2);

    let first_row = positions.values().filter(|p| p.y == 0.0).count();
    let second_row = positions.values().filter(|p| p.y > 0.0).count();
    assert_eq!((first_row, second_row), (12, 3));
    assert_eq!(positions["L1.t12"], Pos2::new(0.0, 260.0));
    assert_eq!(positions["L1.t14"], Pos2::new(600.0, 260.0));
}

#[test]
fn hierarchical_orders_components_by_size_and_orphans_last() {
    init_tracing();
    let model = Model::new(
        vec![
            // three-node cluster first in model order
            Table::new(Layer::L1, "d1", "x"),
            Table::new(Layer::L2, "e1", "x"),
            Table::new(Layer::L3, "f1", "x"),
            // five-node cluster
            Table::new(Layer::L1, "a1", "x"),
            Table::new(Layer::L1, "a2", "x"),
            Table::new(Layer::L2, "b1", "x"),
            Table::new(Layer::L2, "b2", "x"),
            Table::new(Layer::L3, "c1", "x"),
            // orphans
            Table::new(Layer::L1, "lonely", "x"),
            Table::new(Layer::L3, "alone", "x"),
        ],
        vec![
            Relationship::new("L1.d1", "L2.e1"),
            Relationship::new("L2.e1", "L3.f1"),
            Relationship::new("L1.a1", "L2.b1"),
            Relationship::new("L1.a2", "L2.b1"),
            Relationship::new("L2.b1", "L3.c1"),
            Relationship::new("L2.b2", "L3.c1"),
        ],
    );
    let positions = layout(&model, &wide(LayoutMode::Hierarchical), &PositionMap::new());
    assert_eq!(positions.len(), 10);

    // five-node cluster occupies the origin; its widest layer has two columns
    assert_eq!(positions["L1.a1"], Pos2::new(0.0, 0.0));
    assert_eq!(positions["L2.b1"], Pos2::new(0.0, 260.0));
    assert_eq!(positions["L2.b2"], Pos2::new(300.0, 260.0));
    assert_eq!(positions["L3.c1"], Pos2::new(0.0, 520.0));

    // three-node cluster follows: 540 wide + 120 gap
    assert_eq!(positions["L1.d1"], Pos2::new(660.0, 0.0));
    assert_eq!(positions["L3.f1"], Pos2::new(660.0, 520.0));

    // orphans below the last band, L1 first
    let band_bottom = 3.0 * 180.0 + 2.0 * 80.0;
    assert_eq!(positions["L1.lonely"], Pos2::new(0.0, band_bottom + 160.0));
    assert_eq!(positions["L3.alone"], Pos2::new(300.0, band_bottom + 160.0));
}

// =============================================================================
// COMPACTION SCENARIOS
// =============================================================================

fn focus_model() -> Model {
    Model::new(
        vec![
            Table::new(Layer::L1, "left_a", "c"),
            Table::new(Layer::L1, "left_b", "c"),
            Table::new(Layer::L2, "anchor", "c"),
            Table::new(Layer::L3, "right", "c"),
            Table::new(Layer::L3, "unrelated", "c"),
        ],
        vec![
            Relationship::new("L1.left_a", "L2.anchor"),
            Relationship::new("L1.left_b", "L2.anchor"),
            Relationship::new("L2.anchor", "L3.right"),
        ],
    )
}

#[test]
fn focus_compaction_places_neighbors_in_columns() {
    init_tracing();
    let mut session = GraphSession::default();
    session.set_viewport_size(Vec2::new(1200.0, 800.0));
    session.set_model(focus_model(), 0);
    session.set_focus_mode(true, 0);
    session.drain_events();

    assert!(session.focus_select("L2.anchor", None, 10));
    let geo = session.geometry();
    let column = geo.width() + session.config().compact.focus_h_gap;

    assert_eq!(session.position("L2.anchor"), Some(Pos2::ZERO));
    assert_eq!(session.position("L3.right"), Some(Pos2::new(column, 0.0)));

    let a = session.position("L1.left_a").unwrap();
    let b = session.position("L1.left_b").unwrap();
    assert_eq!((a.x, b.x), (-column, -column));
    assert_ne!(a.y, b.y);
    let mid = geo.height() / 2.0;
    assert!((((a.y + mid) + (b.y + mid)) / 2.0 - mid).abs() < 1e-3);

    let events = session.drain_events();
    assert!(events.contains(&GraphEvent::CompactionEntered(atlas_graph::CompactKind::Focus)));
}

#[test]
fn focus_round_trip_restores_positions() {
    let mut session = GraphSession::default();
    session.set_model(focus_model(), 0);
    session.set_focus_mode(true, 0);
    let before = session.positions().clone();

    session.focus_select("L2.anchor", None, 10);
    session.focus_select("L3.right", None, 20);
    assert_ne!(session.positions(), &before);

    assert!(session.exit_focus(30));
    assert_eq!(session.positions(), &before);
    assert!(!session.exit_focus(40));
    assert_eq!(session.positions(), &before);
}

#[test]
fn search_compaction_grids_nine_matches_alphabetically() {
    init_tracing();
    let names = [
        "stock_iota", "stock_beta", "stock_gamma", "stock_alpha", "stock_eta", "stock_theta",
        "stock_delta", "stock_zeta", "stock_epsilon",
    ];
    let mut tables: Vec<Table> = names.iter().map(|n| Table::new(Layer::L2, *n, "inv")).collect();
    tables.push(Table::new(Layer::L1, "orders", "sales"));
    let mut session = GraphSession::default();
    session.set_model(Model::new(tables, vec![]), 0);

    session.set_search("stock", 100);
    session.tick(400);
    assert!(session.compactor().is_search_active());

    let mut sorted = names.to_vec();
    sorted.sort_unstable();
    let geo = session.geometry();
    let gap = session.config().compact.search_gap;
    let origin = session.position(&format!("L2.{}", sorted[0])).unwrap();
    for (i, name) in sorted.iter().enumerate() {
        let expected = Pos2::new(
            origin.x + (i % 3) as f32 * (geo.width() + gap),
            origin.y + (i / 3) as f32 * (geo.height() + gap),
        );
        assert_eq!(session.position(&format!("L2.{name}")), Some(expected), "{name}");
    }
    // centered on the origin
    let total_w = 3.0 * geo.width() + 2.0 * gap;
    assert_eq!(origin.x, -total_w / 2.0);
}

// =============================================================================
// PROPERTIES
// =============================================================================

fn arb_model() -> impl Strategy<Value = Model> {
    (
        prop::collection::vec((0usize..3, 0usize..3), 1..24),
        prop::collection::vec((0usize..24, 0usize..24), 0..30),
    )
        .prop_map(|(nodes, edges)| {
            let layers = [Layer::L1, Layer::L2, Layer::L3];
            let tables: Vec<Table> = nodes
                .iter()
                .enumerate()
                .map(|(i, (layer, cat))| Table::new(layers[*layer], format!("t{i}"), format!("cat{cat}")))
                .collect();
            let relationships = edges
                .into_iter()
                .filter(|(s, t)| *s < tables.len() && *t < tables.len())
                .map(|(s, t)| Relationship::new(tables[s].key.clone(), tables[t].key.clone()))
                .collect();
            Model::new(tables, relationships)
        })
}

fn arb_mode() -> impl Strategy<Value = LayoutMode> {
    prop_oneof![
        Just(LayoutMode::Grid),
        Just(LayoutMode::Hierarchical),
        Just(LayoutMode::Domain),
        Just(LayoutMode::DomainOverview),
        Just(LayoutMode::Force),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn layouts_are_deterministic(model in arb_model(), mode in arb_mode()) {
        let settings = wide(mode);
        let first = layout(&model, &settings, &PositionMap::new());
        let second = layout(&model, &settings, &PositionMap::new());
        prop_assert_eq!(first.len(), model.tables.len());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn manual_positions_survive_every_mode_but_overview(
        model in arb_model(),
        mode in arb_mode(),
        pick in 0usize..24,
        x in 0.0f32..5000.0,
        y in 0.0f32..5000.0,
    ) {
        let key = model.tables[pick % model.tables.len()].key.clone();
        let mut manual = PositionMap::new();
        manual.insert(key.clone(), Pos2::new(x, y));
        let positions = layout(&model, &wide(mode), &manual);
        if mode == LayoutMode::DomainOverview {
            prop_assert!(positions.contains_key(&key));
        } else {
            prop_assert_eq!(positions.get(&key).copied(), Some(Pos2::new(x, y)));
        }
    }

    #[test]
    fn fit_frames_the_box_within_padding(
        x in -5000.0f32..5000.0,
        y in -5000.0f32..5000.0,
        // up to the sizes whose raw fit still lies above the global minimum zoom
        w in 1.0f32..23_000.0,
        h in 1.0f32..15_000.0,
        count in 1usize..80,
        overview in any::<bool>(),
    ) {
        let config = ViewportConfig::default();
        let viewport = Vec2::new(1200.0, 800.0);
        let bounds = Rect::from_min_size(Pos2::new(x, y), Vec2::new(w, h));
        let fit = compute_fit_view(&[bounds], count, overview, viewport, &config).unwrap();

        prop_assert!(fit.zoom >= config.min_zoom && fit.zoom <= config.max_zoom);
        let pad = config.fit_padding;
        let min = bounds.min.to_vec2() * fit.zoom + fit.pan;
        let max = bounds.max.to_vec2() * fit.zoom + fit.pan;
        let eps = 0.05;
        prop_assert!(min.x >= -pad - eps && min.y >= -pad - eps, "min {:?}", min);
        prop_assert!(max.x <= viewport.x + pad + eps && max.y <= viewport.y + pad + eps, "max {:?}", max);
    }

    #[test]
    fn wheel_zoom_stays_clamped(
        deltas in prop::collection::vec((-2000.0f32..2000.0, any::<bool>()), 1..300),
        cx in 0.0f32..1200.0,
        cy in 0.0f32..800.0,
    ) {
        let mut camera = Camera2D::default();
        camera.set_screen_size(Vec2::new(1200.0, 800.0));
        for (delta, modifier) in deltas {
            camera.zoom_to_point(Pos2::new(cx, cy), delta, modifier);
            prop_assert!(camera.zoom() >= 0.05 && camera.zoom() <= 4.0);
        }
    }

    #[test]
    fn small_marquee_changes_nothing(
        sx in 0.0f32..1200.0,
        sy in 0.0f32..800.0,
        angle in 0.0f32..std::f32::consts::TAU,
        length in 0.0f32..7.9,
    ) {
        let mut camera = Camera2D::default();
        camera.set_screen_size(Vec2::new(1200.0, 800.0));
        camera.pan_by(Vec2::new(13.0, -21.0));
        let (zoom, pan) = (camera.zoom(), camera.pan());
        let end = Pos2::new(sx + angle.cos() * length, sy + angle.sin() * length);
        prop_assert!(!camera.marquee_zoom(Pos2::new(sx, sy), end, 0));
        prop_assert_eq!(camera.zoom(), zoom);
        prop_assert_eq!(camera.pan(), pan);
    }

    #[test]
    fn focus_round_trip_is_exact(model in arb_model(), pick in 0usize..24) {
        let anchor = model.tables[pick % model.tables.len()].key.clone();
        let mut session = GraphSession::default();
        session.set_model(model, 0);
        session.set_focus_mode(true, 0);
        let before = session.positions().clone();

        prop_assert!(session.focus_select(&anchor, None, 10));
        session.exit_focus(20);
        prop_assert_eq!(session.positions(), &before);
    }
}
