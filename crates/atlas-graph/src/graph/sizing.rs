//! Node sizing and card geometry
//!
//! Pure lookups from (TableSize, ViewMode, LayoutMode) to card dimensions, plus
//! the header/content/footer split used to place edge anchors on field rows.
//! Every component that needs an anchor re-derives it from here so the renderer
//! and the engine agree on where a field row sits.

use super::config::SizingConfig;
use atlas_types::{LayoutMode, TableSize, ViewMode};
use egui::{Pos2, Rect, Vec2};

/// Card dimensions for the given settings.
///
/// Domain-overview ignores the size preset and view mode and returns one of the
/// two fixed overview presets.
pub fn node_size(
    config: &SizingConfig,
    table_size: TableSize,
    view_mode: ViewMode,
    layout_mode: LayoutMode,
    compact_overview: bool,
) -> Vec2 {
    if layout_mode.is_overview() {
        let preset = if compact_overview {
            config.overview_compact
        } else {
            config.overview_standard
        };
        return preset.to_vec2();
    }

    let base_height = match view_mode {
        ViewMode::Compact => config.compact_height,
        ViewMode::Standard => config.standard_height,
        ViewMode::Detailed => config.detailed_height,
    };
    let scale = match table_size {
        TableSize::Small => config.small_scale,
        TableSize::Medium => config.medium_scale,
        TableSize::Large => config.large_scale,
    };
    Vec2::new(config.base_width * scale.width, base_height * scale.height)
}

/// Which side of the card an edge attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSide {
    Left,
    Right,
}

/// Card geometry derived from the sizing config
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeGeometry {
    pub size: Vec2,
    pub header_height: f32,
    pub footer_height: f32,
    pub visible_rows: usize,
    /// Whether edges attach to field rows rather than the card midpoint
    pub field_level: bool,
}

impl NodeGeometry {
    pub fn new(
        config: &SizingConfig,
        table_size: TableSize,
        view_mode: ViewMode,
        layout_mode: LayoutMode,
        compact_overview: bool,
    ) -> Self {
        let size = node_size(config, table_size, view_mode, layout_mode, compact_overview);
        let visible_rows = match view_mode {
            ViewMode::Compact => config.compact_rows,
            ViewMode::Standard => config.standard_rows,
            ViewMode::Detailed => config.detailed_rows,
        }
        .max(1);
        Self {
            size,
            header_height: size.y * config.header_fraction,
            footer_height: size.y * config.footer_fraction,
            visible_rows,
            field_level: view_mode.field_level_edges() && !layout_mode.is_overview(),
        }
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn content_height(&self) -> f32 {
        (self.size.y - self.header_height - self.footer_height).max(0.0)
    }

    pub fn row_height(&self) -> f32 {
        self.content_height() / self.visible_rows as f32
    }

    /// World rect of a card whose top-left corner is `position`
    pub fn rect_at(&self, position: Pos2) -> Rect {
        Rect::from_min_size(position, self.size)
    }

    /// Edge endpoint for a field row (or the card midpoint).
    ///
    /// Fields past the last visible row attach to the last row.
    pub fn field_anchor(&self, position: Pos2, field_index: Option<usize>, side: AnchorSide) -> Pos2 {
        let x = match side {
            AnchorSide::Left => position.x,
            AnchorSide::Right => position.x + self.size.x,
        };
        let y = match field_index {
            Some(index) if self.field_level => {
                let row = index.min(self.visible_rows - 1) as f32;
                position.y + self.header_height + self.row_height() * (row + 0.5)
            }
            _ => position.y + self.size.y / 2.0,
        };
        Pos2::new(x, y)
    }

    /// Field row under a world point, if the point is inside the content area
    pub fn field_row_at(&self, position: Pos2, point: Pos2) -> Option<usize> {
        if !self.field_level || !self.rect_at(position).contains(point) {
            return None;
        }
        let offset = point.y - position.y - self.header_height;
        if offset < 0.0 || offset >= self.content_height() {
            return None;
        }
        let row_height = self.row_height();
        if row_height <= 0.0 {
            return None;
        }
        Some(((offset / row_height) as usize).min(self.visible_rows - 1))
    }
}
