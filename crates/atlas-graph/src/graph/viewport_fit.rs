//! Viewport fit - the zoom/pan that frames a set of node boxes
//!
//! The raw fit zoom is the largest zoom at which the padded union box fits the
//! viewport. It is then clamped by a zoom band picked from the number of visible
//! nodes (so a single table is not blown up to fill the screen), and finally by
//! the global zoom range. A band minimum never lifts the zoom past the raw fit,
//! so the framed box stays inside the padded viewport whenever the raw fit is
//! within the global range.
//!
//! Screen transform used throughout: `screen = world * zoom + pan`.

use super::config::ViewportConfig;
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

// =============================================================================
// ZOOM BANDS
// =============================================================================

/// Zoom clamp applied when the visible count is at most `max_count`
/// (`None` = any count).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBand {
    pub max_count: Option<usize>,
    pub min: Option<f32>,
    pub max: f32,
}

impl ZoomBand {
    pub const fn new(max_count: Option<usize>, min: Option<f32>, max: f32) -> Self {
        Self {
            max_count,
            min,
            max,
        }
    }

    pub fn covers(&self, count: usize) -> bool {
        self.max_count.map_or(true, |limit| count <= limit)
    }

    /// Clamp a raw fit zoom into the band. The minimum only applies where it
    /// does not exceed `fit_zoom`.
    pub fn apply(&self, fit_zoom: f32) -> f32 {
        let capped = fit_zoom.min(self.max);
        match self.min {
            Some(min) if min <= fit_zoom => capped.max(min),
            _ => capped,
        }
    }
}

pub fn default_standard_bands() -> Vec<ZoomBand> {
    vec![
        ZoomBand::new(Some(1), None, 1.05),
        ZoomBand::new(Some(6), Some(0.1), 1.0),
        ZoomBand::new(Some(15), Some(0.08), 0.9),
        ZoomBand::new(Some(30), Some(0.06), 0.8),
        ZoomBand::new(None, None, 0.75),
    ]
}

pub fn default_overview_bands() -> Vec<ZoomBand> {
    vec![
        ZoomBand::new(Some(1), None, 1.25),
        ZoomBand::new(Some(6), None, 0.78),
        ZoomBand::new(Some(15), Some(0.08), 0.7),
        ZoomBand::new(Some(30), Some(0.06), 0.6),
        ZoomBand::new(None, None, 0.5),
    ]
}

/// First band covering `count`
pub fn band_for(bands: &[ZoomBand], count: usize) -> Option<&ZoomBand> {
    bands.iter().find(|band| band.covers(count))
}

// =============================================================================
// FIT
// =============================================================================

/// Result of a fit computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitView {
    pub zoom: f32,
    pub pan: Vec2,
    /// World-space center of the framed box
    pub center: Pos2,
}

/// Union of all boxes, or `None` when the union is degenerate
pub fn union_bounds(boxes: &[Rect]) -> Option<Rect> {
    let union = boxes
        .iter()
        .filter(|r| is_usable(r))
        .fold(Rect::NOTHING, |acc, r| acc.union(*r));
    is_usable(&union).then_some(union)
}

fn is_usable(rect: &Rect) -> bool {
    rect.min.x.is_finite()
        && rect.min.y.is_finite()
        && rect.max.x.is_finite()
        && rect.max.y.is_finite()
        && rect.width() > 0.0
        && rect.height() > 0.0
}

fn usable_viewport(size: Vec2) -> bool {
    size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0
}

/// Frame `boxes` in a viewport of `viewport_size`.
///
/// Returns `None` for an empty or degenerate input; callers keep their current
/// zoom and pan in that case.
pub fn compute_fit_view(
    boxes: &[Rect],
    visible_count: usize,
    overview: bool,
    viewport_size: Vec2,
    config: &ViewportConfig,
) -> Option<FitView> {
    let bounds = union_bounds(boxes)?;
    let bands = if overview {
        &config.overview_bands
    } else {
        &config.standard_bands
    };
    let zoom = raw_fit_zoom(bounds, viewport_size, config.fit_padding)?;
    let zoom = band_for(bands, visible_count)
        .map_or(zoom, |band| band.apply(zoom))
        .clamp(config.min_zoom, config.max_zoom);

    let fit = FitView {
        zoom,
        pan: centered_pan(bounds, zoom, viewport_size, config.fit_padding),
        center: bounds.center(),
    };
    tracing::trace!(zoom = fit.zoom, count = visible_count, overview, "fit view computed");
    Some(fit)
}

/// Frame exactly `bounds` with `padding`, without zoom bands (marquee zoom)
pub fn fit_rect(bounds: Rect, viewport_size: Vec2, padding: f32, config: &ViewportConfig) -> Option<FitView> {
    if !is_usable(&bounds) {
        return None;
    }
    let zoom = raw_fit_zoom(bounds, viewport_size, padding)?.clamp(config.min_zoom, config.max_zoom);
    Some(FitView {
        zoom,
        pan: centered_pan(bounds, zoom, viewport_size, padding),
        center: bounds.center(),
    })
}

fn raw_fit_zoom(bounds: Rect, viewport_size: Vec2, padding: f32) -> Option<f32> {
    if !usable_viewport(viewport_size) {
        return None;
    }
    let zoom_x = viewport_size.x / (bounds.width() + 2.0 * padding);
    let zoom_y = viewport_size.y / (bounds.height() + 2.0 * padding);
    let zoom = zoom_x.min(zoom_y);
    (zoom.is_finite() && zoom > 0.0).then_some(zoom)
}

/// Pan that centers `bounds`, pulled back so its top-left corner stays at
/// least `padding` pixels from the viewport edge.
fn centered_pan(bounds: Rect, zoom: f32, viewport_size: Vec2, padding: f32) -> Vec2 {
    let center = bounds.center();
    let pan = viewport_size / 2.0 - center.to_vec2() * zoom;
    Vec2::new(
        pan.x.max(padding - bounds.min.x * zoom),
        pan.y.max(padding - bounds.min.y * zoom),
    )
}

// =============================================================================
// TESTS
// =============================================================================
