//! Engine configuration
//!
//! Every tuned constant of the engine lives here so behavior can be adjusted
//! without touching the algorithms. All sections deserialize with defaults, so a
//! config file only needs the values it overrides:
//!
//! ```yaml
//! layout:
//!   min_tables_per_row: 10
//!   force:
//!     iterations: 80
//! viewport:
//!   fit_padding: 60
//! ```

use super::force_sim::ForceConfig;
use super::viewport_fit::{default_overview_bands, default_standard_bands, ZoomBand};
use crate::error::{GraphError, Result};
use egui::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// ROOT
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sizing: SizingConfig,
    pub layout: LayoutConfig,
    pub grouping: GroupingConfig,
    pub viewport: ViewportConfig,
    pub compact: CompactConfig,
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            Some("json") => Self::from_json_str(&text),
            other => Err(GraphError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

// =============================================================================
// SIZING
// =============================================================================

/// Width/height pair as it appears in config files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    pub base_width: f32,
    pub compact_height: f32,
    pub standard_height: f32,
    pub detailed_height: f32,
    /// Width/height multipliers for the small preset
    pub small_scale: Dimensions,
    pub medium_scale: Dimensions,
    pub large_scale: Dimensions,
    /// Fixed card size for domain-overview
    pub overview_standard: Dimensions,
    /// Fixed card size for compact domain-overview
    pub overview_compact: Dimensions,
    /// Share of card height taken by the title bar
    pub header_fraction: f32,
    /// Share of card height taken by the footer
    pub footer_fraction: f32,
    pub compact_rows: usize,
    pub standard_rows: usize,
    pub detailed_rows: usize,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            base_width: 240.0,
            compact_height: 96.0,
            standard_height: 180.0,
            detailed_height: 280.0,
            small_scale: Dimensions::new(0.8, 0.9),
            medium_scale: Dimensions::new(1.0, 1.0),
            large_scale: Dimensions::new(1.35, 1.25),
            overview_standard: Dimensions::new(150.0, 64.0),
            overview_compact: Dimensions::new(96.0, 32.0),
            header_fraction: 0.16,
            footer_fraction: 0.08,
            compact_rows: 3,
            standard_rows: 6,
            detailed_rows: 10,
        }
    }
}

// =============================================================================
// LAYOUT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub h_spacing: f32,
    pub v_spacing: f32,
    /// Extra vertical gap between category blocks (grid)
    pub category_gap: f32,
    pub min_tables_per_row: usize,
    /// Horizontal gap between connected components (hierarchical)
    pub component_gap: f32,
    /// Vertical gap between row bands (hierarchical)
    pub band_gap: f32,
    pub domain: DomainLayoutConfig,
    pub overview: OverviewLayoutConfig,
    pub force: ForceConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            h_spacing: 60.0,
            v_spacing: 80.0,
            category_gap: 40.0,
            min_tables_per_row: 12,
            component_gap: 120.0,
            band_gap: 160.0,
            domain: DomainLayoutConfig::default(),
            overview: OverviewLayoutConfig::default(),
            force: ForceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainLayoutConfig {
    pub padding: f32,
    pub header: f32,
    pub gap: f32,
    pub max_columns: usize,
    pub layer_gap: f32,
}

impl Default for DomainLayoutConfig {
    fn default() -> Self {
        Self {
            padding: 24.0,
            header: 44.0,
            gap: 60.0,
            max_columns: 4,
            layer_gap: 24.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverviewLayoutConfig {
    /// Gap between cards inside a domain
    pub gap: f32,
    pub padding: f32,
    pub header: f32,
    pub layer_gap: f32,
    pub max_domain_width: f32,
    /// Gap between domains
    pub domain_gap: f32,
}

impl Default for OverviewLayoutConfig {
    fn default() -> Self {
        Self {
            gap: 16.0,
            padding: 16.0,
            header: 36.0,
            layer_gap: 12.0,
            max_domain_width: 900.0,
            domain_gap: 40.0,
        }
    }
}

// =============================================================================
// GROUPING
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub padding: f32,
    /// Room for the title bar above the member tables
    pub header_offset: f32,
    pub footer_offset: f32,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            padding: 24.0,
            header_offset: 40.0,
            footer_offset: 12.0,
        }
    }
}

// =============================================================================
// VIEWPORT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub fit_padding: f32,
    pub standard_bands: Vec<ZoomBand>,
    pub overview_bands: Vec<ZoomBand>,
    /// Wheel speed with a modifier held
    pub wheel_fine_speed: f32,
    pub wheel_speed: f32,
    pub wheel_fast_speed: f32,
    /// Deltas above this use the fast speed
    pub wheel_large_delta: f32,
    pub double_click_factor: f32,
    pub double_click_delay_ms: u64,
    /// Zoom level applied by a double-click that lands on a pending one
    pub overview_zoom: f32,
    pub marquee_min_diagonal: f32,
    pub marquee_padding: f32,
    pub settle_ms: u64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.05,
            max_zoom: 4.0,
            fit_padding: 40.0,
            standard_bands: default_standard_bands(),
            overview_bands: default_overview_bands(),
            wheel_fine_speed: 0.01,
            wheel_speed: 0.04,
            wheel_fast_speed: 0.08,
            wheel_large_delta: 50.0,
            double_click_factor: 1.5,
            double_click_delay_ms: 300,
            overview_zoom: 0.15,
            marquee_min_diagonal: 8.0,
            marquee_padding: 40.0,
            settle_ms: 300,
        }
    }
}

// =============================================================================
// COMPACTION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactConfig {
    pub focus_h_gap: f32,
    pub focus_v_gap: f32,
    pub search_gap: f32,
    pub search_debounce_ms: u64,
}

impl Default for CompactConfig {
    fn default() -> Self {
        Self {
            focus_h_gap: 120.0,
            focus_v_gap: 40.0,
            search_gap: 48.0,
            search_debounce_ms: 300,
        }
    }
}
