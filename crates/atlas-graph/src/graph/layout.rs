//! Layout Engine - deterministic positioning of table nodes
//!
//! One dispatch function with an arm per `LayoutMode`:
//!
//! | mode             | algorithm                                              |
//! |------------------|--------------------------------------------------------|
//! | grid             | category blocks, layer-sorted, wrapped rows            |
//! | hierarchical     | BFS components in three layer rows, degree-sorted      |
//! | domain           | one content-sized container per category, tiled        |
//! | domain-overview  | dense containers with the overview card preset         |
//! | force            | grid seed refined by `ForceSimulation`                 |
//!
//! Only visible tables (per `ModelFilter`) get a position. Manually dragged
//! positions pass through unchanged in every mode except domain-overview.
//! Positions are the top-left corner of each card.

use super::config::{EngineConfig, LayoutConfig};
use super::force_sim::ForceSimulation;
use super::sizing::NodeGeometry;
use atlas_types::{Layer, LayoutMode, Model, ModelFilter, Table, TableSize, ViewMode};
use egui::{Pos2, Vec2};
use std::collections::{HashMap, VecDeque};

/// Node key -> top-left world position. A missing key means "not laid out".
pub type PositionMap = HashMap<String, Pos2>;

/// Fallback when the caller has not measured the container yet
const DEFAULT_VIEWPORT_WIDTH: f32 = 1600.0;

/// Lowest zoom hint honored when widening the available row width
const MIN_ZOOM_HINT: f32 = 0.05;

// =============================================================================
// SETTINGS
// =============================================================================

/// Inputs that select and parameterize a layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSettings {
    pub mode: LayoutMode,
    pub table_size: TableSize,
    pub view_mode: ViewMode,
    pub compact_overview: bool,
    /// Physical size of the rendering container
    pub viewport_size: Vec2,
    /// Zoom the layout will probably be viewed at; widens rows when zoomed out
    pub zoom_hint: Option<f32>,
    /// Explicit domain order for domain-overview (empty = by member count)
    pub category_order: Vec<String>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            mode: LayoutMode::Grid,
            table_size: TableSize::Medium,
            view_mode: ViewMode::Standard,
            compact_overview: false,
            viewport_size: Vec2::new(DEFAULT_VIEWPORT_WIDTH, 900.0),
            zoom_hint: None,
            category_order: Vec::new(),
        }
    }
}

impl LayoutSettings {
    pub fn with_mode(mut self, mode: LayoutMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_viewport(mut self, viewport_size: Vec2) -> Self {
        self.viewport_size = viewport_size;
        self
    }

    /// Row width available to wrapping layouts, in world units
    pub fn available_width(&self) -> f32 {
        let width = if self.viewport_size.x.is_finite() && self.viewport_size.x > 0.0 {
            self.viewport_size.x
        } else {
            DEFAULT_VIEWPORT_WIDTH
        };
        match self.zoom_hint {
            Some(zoom) if zoom.is_finite() && zoom > 0.0 => width / zoom.max(MIN_ZOOM_HINT),
            _ => width,
        }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

pub struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
    settings: &'a LayoutSettings,
    geometry: NodeGeometry,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a EngineConfig, settings: &'a LayoutSettings) -> Self {
        let geometry = NodeGeometry::new(
            &config.sizing,
            settings.table_size,
            settings.view_mode,
            settings.mode,
            settings.compact_overview,
        );
        Self {
            config: &config.layout,
            settings,
            geometry,
        }
    }

    pub fn geometry(&self) -> &NodeGeometry {
        &self.geometry
    }

    /// Compute positions for every visible table.
    ///
    /// `manual` holds positions the user set by dragging; they are returned
    /// verbatim (for visible nodes) unless the mode is domain-overview.
    pub fn compute_layout(
        &self,
        model: &Model,
        filter: &ModelFilter,
        manual: &PositionMap,
    ) -> PositionMap {
        let tables = filter.visible_tables(model);
        if tables.is_empty() {
            return PositionMap::new();
        }

        let mut positions = match self.settings.mode {
            LayoutMode::Grid => self.grid(model, &tables),
            LayoutMode::Hierarchical => self.hierarchical(model, &tables),
            LayoutMode::Domain => self.domain(model, &tables),
            LayoutMode::DomainOverview => self.domain_overview(model, &tables),
            LayoutMode::Force => self.force(model, &tables, manual),
        };

        if self.settings.mode.preserves_manual_positions() {
            for table in &tables {
                if let Some(pos) = manual.get(&table.key) {
                    positions.insert(table.key.clone(), *pos);
                }
            }
        }

        tracing::debug!(
            mode = self.settings.mode.as_str(),
            nodes = positions.len(),
            "layout computed"
        );
        positions
    }

    fn step(&self) -> Vec2 {
        Vec2::new(
            self.geometry.width() + self.config.h_spacing,
            self.geometry.height() + self.config.v_spacing,
        )
    }

    // =========================================================================
    // GRID
    // =========================================================================

    /// Tables per grid row: available width over card pitch, floored, at least
    /// the configured minimum
    pub fn tables_per_row(&self) -> usize {
        let pitch = self.step().x;
        let fit = if pitch > 0.0 {
            (self.settings.available_width() / pitch).floor() as usize
        } else {
            0
        };
        fit.max(self.config.min_tables_per_row).max(1)
    }

    fn grid(&self, model: &Model, tables: &[&Table]) -> PositionMap {
        let step = self.step();
        let per_row = self.tables_per_row();
        let mut positions = PositionMap::new();
        let mut y = 0.0;

        for (_, members) in group_by_category(model, tables) {
            let members = sorted_by_layer(members);
            for (i, table) in members.iter().enumerate() {
                let col = i % per_row;
                let row = i / per_row;
                positions.insert(
                    table.key.clone(),
                    Pos2::new(col as f32 * step.x, y + row as f32 * step.y),
                );
            }
            let rows = members.len().div_ceil(per_row);
            y += rows as f32 * step.y + self.config.category_gap;
        }

        positions
    }

    // =========================================================================
    // HIERARCHICAL
    // =========================================================================

    fn hierarchical(&self, model: &Model, tables: &[&Table]) -> PositionMap {
        let graph = Connectivity::build(model, tables);
        let step = self.step();
        let node_w = self.geometry.width();
        let node_h = self.geometry.height();
        let available = self.settings.available_width();
        let band_height = 3.0 * node_h + 2.0 * self.config.v_spacing;

        let mut positions = PositionMap::new();
        let mut x = 0.0;
        let mut band_y = 0.0;
        let mut placed_any = false;

        for component in graph.components() {
            let mut buckets: [Vec<usize>; 3] = Default::default();
            for &idx in &component {
                buckets[tables[idx].layer.index()].push(idx);
            }
            for bucket in buckets.iter_mut() {
                bucket.sort_unstable();
                // stable: equal degree keeps model order
                bucket.sort_by(|a, b| graph.degree[*b].cmp(&graph.degree[*a]));
            }

            let cols = buckets.iter().map(Vec::len).max().unwrap_or(1).max(1);
            let width = cols as f32 * node_w + (cols - 1) as f32 * self.config.h_spacing;
            if x > 0.0 && x + width > available {
                x = 0.0;
                band_y += band_height + self.config.band_gap;
            }

            for (layer_idx, bucket) in buckets.iter().enumerate() {
                for (j, &idx) in bucket.iter().enumerate() {
                    positions.insert(
                        tables[idx].key.clone(),
                        Pos2::new(x + j as f32 * step.x, band_y + layer_idx as f32 * step.y),
                    );
                }
            }
            x += width + self.config.component_gap;
            placed_any = true;
        }

        let mut orphans = graph.orphans();
        if !orphans.is_empty() {
            orphans.sort_by_key(|&idx| (tables[idx].layer, idx));
            let mut x = 0.0;
            let mut y = if placed_any {
                band_y + band_height + self.config.band_gap
            } else {
                0.0
            };
            for idx in orphans {
                if x > 0.0 && x + node_w > available {
                    x = 0.0;
                    y += step.y;
                }
                positions.insert(tables[idx].key.clone(), Pos2::new(x, y));
                x += step.x;
            }
        }

        positions
    }

    // =========================================================================
    // DOMAIN
    // =========================================================================

    fn domain(&self, model: &Model, tables: &[&Table]) -> PositionMap {
        let cfg = &self.config.domain;
        let spacing = Vec2::new(self.config.h_spacing, self.config.v_spacing);
        let blocks: Vec<DomainBlock> = group_by_category(model, tables)
            .into_iter()
            .map(|(category, members)| {
                DomainBlock::measure(
                    category,
                    &members,
                    self.geometry.size,
                    spacing,
                    cfg.max_columns,
                    cfg.padding,
                    cfg.header,
                    cfg.layer_gap,
                )
            })
            .collect();

        let origins = tile_blocks(&blocks, self.settings.available_width(), cfg.gap, true);

        let mut positions = PositionMap::new();
        for (block, origin) in blocks.iter().zip(origins) {
            block.place(
                origin,
                self.geometry.size,
                spacing,
                cfg.padding,
                cfg.header,
                cfg.layer_gap,
                false,
                &mut positions,
            );
        }
        positions
    }

    // =========================================================================
    // DOMAIN OVERVIEW
    // =========================================================================

    fn domain_overview(&self, model: &Model, tables: &[&Table]) -> PositionMap {
        let cfg = &self.config.overview;
        let size = self.geometry.size;
        let spacing = Vec2::splat(cfg.gap);
        let usable = cfg.max_domain_width - 2.0 * cfg.padding + cfg.gap;
        let max_cols = ((usable / (size.x + cfg.gap)).floor() as usize).max(1);

        let mut groups = group_by_category(model, tables);
        order_overview_groups(&mut groups, &self.settings.category_order);

        let blocks: Vec<DomainBlock> = groups
            .into_iter()
            .map(|(category, members)| {
                DomainBlock::measure(
                    category,
                    &members,
                    size,
                    spacing,
                    max_cols,
                    cfg.padding,
                    cfg.header,
                    cfg.layer_gap,
                )
            })
            .collect();

        let origins = tile_blocks(&blocks, self.settings.available_width(), cfg.domain_gap, false);

        let mut positions = PositionMap::new();
        for (block, origin) in blocks.iter().zip(origins) {
            block.place(
                origin,
                size,
                spacing,
                cfg.padding,
                cfg.header,
                cfg.layer_gap,
                true,
                &mut positions,
            );
        }
        positions
    }

    // =========================================================================
    // FORCE
    // =========================================================================

    fn force(&self, model: &Model, tables: &[&Table], manual: &PositionMap) -> PositionMap {
        let seed = self.grid(model, tables);
        let mut sim = ForceSimulation::new(self.config.force.clone());
        for table in tables {
            let (position, pinned) = match manual.get(&table.key) {
                Some(pos) => (*pos, true),
                None => (seed.get(&table.key).copied().unwrap_or(Pos2::ZERO), false),
            };
            sim.add_node(table.key.clone(), position, pinned);
        }
        for rel in &model.relationships {
            sim.add_edge(&rel.source, &rel.target);
        }
        sim.run();
        sim.into_positions()
    }
}

// =============================================================================
// CONNECTIVITY
// =============================================================================

/// Undirected adjacency over the visible tables (indices into the table slice)
struct Connectivity {
    adjacency: Vec<Vec<usize>>,
    degree: Vec<usize>,
}

impl Connectivity {
    fn build(model: &Model, tables: &[&Table]) -> Self {
        let index: HashMap<&str, usize> = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.key.as_str(), i))
            .collect();
        let mut adjacency = vec![Vec::new(); tables.len()];
        let mut degree = vec![0; tables.len()];

        for rel in &model.relationships {
            if rel.is_self_loop() {
                continue;
            }
            let (Some(&s), Some(&t)) = (index.get(rel.source.as_str()), index.get(rel.target.as_str()))
            else {
                continue;
            };
            adjacency[s].push(t);
            adjacency[t].push(s);
            degree[s] += 1;
            degree[t] += 1;
        }

        Self { adjacency, degree }
    }

    /// Connected components of nodes with edges, largest first (ties keep
    /// discovery order)
    fn components(&self) -> Vec<Vec<usize>> {
        let n = self.adjacency.len();
        let mut visited = vec![false; n];
        let mut components = Vec::new();

        for start in 0..n {
            if visited[start] || self.degree[start] == 0 {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = VecDeque::from([start]);
            visited[start] = true;
            while let Some(node) = queue.pop_front() {
                component.push(node);
                for &next in &self.adjacency[node] {
                    if !visited[next] {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }
            components.push(component);
        }

        components.sort_by(|a, b| b.len().cmp(&a.len()));
        components
    }

    fn orphans(&self) -> Vec<usize> {
        (0..self.degree.len())
            .filter(|&i| self.degree[i] == 0)
            .collect()
    }
}

// =============================================================================
// DOMAIN BLOCKS
// =============================================================================

/// A measured domain container: its size and its members split by layer
#[derive(Debug, Clone)]
struct DomainBlock<'t> {
    category: String,
    layers: Vec<Vec<&'t Table>>,
    columns: usize,
    size: Vec2,
}

impl<'t> DomainBlock<'t> {
    #[allow(clippy::too_many_arguments)]
    fn measure(
        category: String,
        members: &[&'t Table],
        node: Vec2,
        spacing: Vec2,
        max_columns: usize,
        padding: f32,
        header: f32,
        layer_gap: f32,
    ) -> Self {
        let layers: Vec<Vec<&Table>> = Layer::all()
            .iter()
            .map(|layer| {
                members
                    .iter()
                    .copied()
                    .filter(|t| t.layer == *layer)
                    .collect::<Vec<_>>()
            })
            .filter(|group| !group.is_empty())
            .collect();

        let widest = layers.iter().map(Vec::len).max().unwrap_or(1);
        let columns = widest.min(max_columns.max(1)).max(1);
        let content_width = columns as f32 * node.x + (columns - 1) as f32 * spacing.x;

        let rows_height: f32 = layers
            .iter()
            .map(|group| {
                let rows = group.len().div_ceil(columns);
                rows as f32 * node.y + (rows - 1) as f32 * spacing.y
            })
            .sum();
        let gaps = layers.len().saturating_sub(1) as f32 * layer_gap;

        Self {
            category,
            layers,
            columns,
            size: Vec2::new(
                content_width + 2.0 * padding,
                header + 2.0 * padding + rows_height + gaps,
            ),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn place(
        &self,
        origin: Pos2,
        node: Vec2,
        spacing: Vec2,
        padding: f32,
        header: f32,
        layer_gap: f32,
        center_single: bool,
        positions: &mut PositionMap,
    ) {
        let pitch = node + spacing;
        let mut y = origin.y + padding + header;
        for group in &self.layers {
            let single_x = origin.x + (self.size.x - node.x) / 2.0;
            for (i, table) in group.iter().enumerate() {
                let col = i % self.columns;
                let row = i / self.columns;
                let x = if center_single && group.len() == 1 {
                    single_x
                } else {
                    origin.x + padding + col as f32 * pitch.x
                };
                positions.insert(table.key.clone(), Pos2::new(x, y + row as f32 * pitch.y));
            }
            let rows = group.len().div_ceil(self.columns);
            y += rows as f32 * pitch.y - spacing.y + layer_gap;
        }
        tracing::trace!(category = %self.category, x = origin.x, y = origin.y, "domain block placed");
    }
}

/// Tile blocks left-to-right, wrapping when the next block would overflow.
///
/// With `center_last_row`, the last row is shifted right by half the slack
/// between it and the widest row.
fn tile_blocks(blocks: &[DomainBlock], available: f32, gap: f32, center_last_row: bool) -> Vec<Pos2> {
    let mut origins = Vec::with_capacity(blocks.len());
    let mut rows: Vec<(usize, usize, f32)> = Vec::new(); // (first, end, width)
    let mut x = 0.0;
    let mut y = 0.0;
    let mut row_height: f32 = 0.0;
    let mut row_start = 0;

    for (i, block) in blocks.iter().enumerate() {
        if x > 0.0 && x + block.size.x > available {
            rows.push((row_start, i, x - gap));
            row_start = i;
            x = 0.0;
            y += row_height + gap;
            row_height = 0.0;
        }
        origins.push(Pos2::new(x, y));
        x += block.size.x + gap;
        row_height = row_height.max(block.size.y);
    }
    if !blocks.is_empty() {
        rows.push((row_start, blocks.len(), x - gap));
    }

    if center_last_row && rows.len() > 1 {
        let widest = rows.iter().map(|r| r.2).fold(0.0_f32, f32::max);
        if let Some(&(first, end, width)) = rows.last() {
            let shift = (widest - width) / 2.0;
            if shift > 0.0 {
                for origin in &mut origins[first..end] {
                    origin.x += shift;
                }
            }
        }
    }

    origins
}

// =============================================================================
// HELPERS
// =============================================================================

/// Visible tables grouped by category, in the model's category order
fn group_by_category<'t>(model: &Model, tables: &[&'t Table]) -> Vec<(String, Vec<&'t Table>)> {
    let mut groups: Vec<(String, Vec<&Table>)> = Vec::new();
    for category in model.category_order() {
        let members: Vec<&Table> = tables
            .iter()
            .copied()
            .filter(|t| t.category == category)
            .collect();
        if !members.is_empty() {
            groups.push((category.to_string(), members));
        }
    }
    groups
}

/// Stable sort by layer: L1 first, insertion order within a layer
fn sorted_by_layer<'t>(mut tables: Vec<&'t Table>) -> Vec<&'t Table> {
    tables.sort_by_key(|t| t.layer);
    tables
}

/// Explicit order first (unknown categories after), otherwise by descending
/// member count; ties keep model category order.
fn order_overview_groups(groups: &mut [(String, Vec<&Table>)], explicit: &[String]) {
    let rank: HashMap<&str, usize> = explicit
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();
    groups.sort_by(|a, b| {
        let ra = rank.get(a.0.as_str()).copied().unwrap_or(usize::MAX);
        let rb = rank.get(b.0.as_str()).copied().unwrap_or(usize::MAX);
        ra.cmp(&rb).then_with(|| b.1.len().cmp(&a.1.len()))
    });
}

// =============================================================================
// TESTS
// =============================================================================
