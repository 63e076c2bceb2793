//! Camera2D - the viewport controller (zoom + pan)
//!
//! Provides world-to-screen and screen-to-world transforms and every operation
//! that moves the view.
//!
//! # Rules
//! - `screen = world * zoom + pan`
//! - Every mutating call clamps zoom to `[min_zoom, max_zoom]`
//! - Pan is only written through the formulas below; non-finite input is dropped
//! - No callbacks: timers are polled through `tick(now_ms)`
//!
//! # Operations
//! - `fit_to_boxes` - frame a set of node boxes (fit-to-view)
//! - `zoom_to_point` - wheel zoom keeping the cursor's world point fixed
//! - `double_click_zoom` - deferred ×1.5, or jump to overview on a second double-click
//! - `marquee_zoom` - frame a dragged screen rectangle
//! - `zoom_by` - keyboard zoom around the viewport center

use super::config::ViewportConfig;
use super::timer::ScheduledTask;
use super::viewport_fit::{compute_fit_view, fit_rect, FitView};
use egui::{Pos2, Rect, Vec2};

/// What a `tick` changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraTick {
    /// A deferred double-click zoom was applied
    pub zoomed: bool,
    /// The animating flag dropped back to false
    pub settled: bool,
}

#[derive(Debug, Clone)]
pub struct Camera2D {
    zoom: f32,
    pan: Vec2,
    screen_size: Vec2,
    config: ViewportConfig,
    /// Deferred double-click zoom-in, anchored at the click position
    pending_zoom_in: ScheduledTask<Pos2>,
    settle: ScheduledTask,
    animating: bool,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl Camera2D {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            zoom: 1.0_f32.clamp(config.min_zoom, config.max_zoom),
            pan: Vec2::ZERO,
            screen_size: Vec2::new(1600.0, 900.0),
            config,
            pending_zoom_in: ScheduledTask::new(),
            settle: ScheduledTask::new(),
            animating: false,
        }
    }

    // =========================================================================
    // CURRENT VALUES
    // =========================================================================

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// True while a programmatic move has not settled
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn has_pending_zoom(&self) -> bool {
        self.pending_zoom_in.is_pending()
    }

    /// Resize the rendering container. Ignored unless both sides are positive.
    pub fn set_screen_size(&mut self, size: Vec2) {
        if size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0 {
            self.screen_size = size;
        }
    }

    // =========================================================================
    // COORDINATE TRANSFORMS
    // =========================================================================

    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        Pos2::new(
            world.x * self.zoom + self.pan.x,
            world.y * self.zoom + self.pan.y,
        )
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    pub fn screen_rect_to_world(&self, rect: Rect) -> Rect {
        Rect::from_two_pos(self.screen_to_world(rect.min), self.screen_to_world(rect.max))
    }

    /// World area currently on screen
    pub fn visible_bounds(&self) -> Rect {
        self.screen_rect_to_world(Rect::from_min_size(Pos2::ZERO, self.screen_size))
    }

    pub fn is_visible(&self, world_rect: Rect) -> bool {
        self.visible_bounds().intersects(world_rect)
    }

    // =========================================================================
    // FIT
    // =========================================================================

    /// Commit a computed fit and start the settle window
    pub fn apply_fit(&mut self, fit: FitView, now_ms: u64) {
        if !fit.zoom.is_finite() || !fit.pan.x.is_finite() || !fit.pan.y.is_finite() {
            return;
        }
        self.zoom = fit.zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        self.pan = fit.pan;
        self.begin_settle(now_ms);
    }

    /// Fit-to-view over `boxes`. Returns false (and changes nothing) when the
    /// input is empty or degenerate.
    pub fn fit_to_boxes(&mut self, boxes: &[Rect], visible_count: usize, overview: bool, now_ms: u64) -> bool {
        match compute_fit_view(boxes, visible_count, overview, self.screen_size, &self.config) {
            Some(fit) => {
                self.apply_fit(fit, now_ms);
                true
            }
            None => {
                tracing::debug!(boxes = boxes.len(), "fit skipped: degenerate bounds");
                false
            }
        }
    }

    // =========================================================================
    // ZOOM
    // =========================================================================

    /// Wheel zoom. Negative deltas zoom in; the world point under `cursor`
    /// stays under `cursor`.
    pub fn zoom_to_point(&mut self, cursor: Pos2, delta: f32, modifier_held: bool) {
        if !delta.is_finite() || delta == 0.0 {
            return;
        }
        let speed = if modifier_held {
            self.config.wheel_fine_speed
        } else if delta.abs() > self.config.wheel_large_delta {
            self.config.wheel_fast_speed
        } else {
            self.config.wheel_speed
        };
        let factor = if delta < 0.0 { 1.0 + speed } else { 1.0 - speed };
        self.zoom_at(self.zoom * factor, cursor);
    }

    /// Multiply zoom by `factor` around the viewport center
    pub fn zoom_by(&mut self, factor: f32) {
        let center = (self.screen_size / 2.0).to_pos2();
        self.zoom_at(self.zoom * factor, center);
    }

    /// Set zoom, keeping the world point under the screen `anchor` fixed
    pub fn zoom_at(&mut self, new_zoom: f32, anchor: Pos2) {
        if !new_zoom.is_finite() || !anchor.x.is_finite() || !anchor.y.is_finite() {
            return;
        }
        let old = self.zoom;
        let new = new_zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        let ratio = new / old;
        let anchor = anchor.to_vec2();
        self.pan = anchor - (anchor - self.pan) * ratio;
        self.zoom = new;
    }

    /// Double-click on empty canvas.
    ///
    /// The first one schedules a ×1.5 zoom at `screen_pos`; a second arriving
    /// before it fires cancels it and jumps to the overview zoom instead.
    pub fn double_click_zoom(&mut self, screen_pos: Pos2, now_ms: u64) {
        if self.pending_zoom_in.cancel() {
            self.zoom_at(self.config.overview_zoom, screen_pos);
            self.begin_settle(now_ms);
            return;
        }
        self.pending_zoom_in
            .schedule(now_ms, self.config.double_click_delay_ms, screen_pos);
    }

    /// Zoom to a screen-space rectangle dragged by the user. Rectangles with a
    /// diagonal below the threshold are treated as clicks and ignored.
    pub fn marquee_zoom(&mut self, start: Pos2, end: Pos2, now_ms: u64) -> bool {
        let diagonal = (end - start).length();
        if !diagonal.is_finite() || diagonal < self.config.marquee_min_diagonal {
            return false;
        }
        let world = self.screen_rect_to_world(Rect::from_two_pos(start, end));
        match fit_rect(world, self.screen_size, self.config.marquee_padding, &self.config) {
            Some(fit) => {
                self.apply_fit(fit, now_ms);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // PAN
    // =========================================================================

    /// Shift pan by a screen delta
    pub fn pan_by(&mut self, delta: Vec2) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.pan += delta;
        }
    }

    /// Pan during a drag: the pan at button-down plus the total screen delta
    pub fn pan_from_drag(&mut self, start_pan: Vec2, total_delta: Vec2) {
        if total_delta.x.is_finite() && total_delta.y.is_finite() && start_pan.x.is_finite() && start_pan.y.is_finite() {
            self.pan = start_pan + total_delta;
        }
    }

    // =========================================================================
    // TIMERS
    // =========================================================================

    fn begin_settle(&mut self, now_ms: u64) {
        self.animating = true;
        self.settle.schedule(now_ms, self.config.settle_ms, ());
    }

    /// Fire due timers
    pub fn tick(&mut self, now_ms: u64) -> CameraTick {
        let mut result = CameraTick::default();
        if let Some(anchor) = self.pending_zoom_in.poll(now_ms) {
            self.zoom_at(self.zoom * self.config.double_click_factor, anchor);
            self.begin_settle(now_ms);
            result.zoomed = true;
        }
        if self.settle.poll(now_ms).is_some() {
            self.animating = false;
            result.settled = true;
        }
        result
    }

    /// Cancel every pending timer and clear the animating flag
    pub fn cancel_timers(&mut self) {
        self.pending_zoom_in.cancel();
        self.settle.cancel();
        self.animating = false;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera2D {
        let mut cam = Camera2D::default();
        cam.set_screen_size(Vec2::new(1000.0, 800.0));
        cam
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_transforms_roundtrip() {
        let mut cam = camera();
        cam.zoom_at(2.0, Pos2::ZERO);
        cam.pan_by(Vec2::new(10.0, 20.0));
        let world = Pos2::new(33.0, -7.0);
        let screen = cam.world_to_screen(world);
        assert_eq!(screen, Pos2::new(76.0, 6.0));
        let back = cam.screen_to_world(screen);
        assert!(approx(back.x, world.x) && approx(back.y, world.y));
    }

    #[test]
    fn test_zoom_to_point_keeps_cursor_world_point() {
        let mut cam = camera();
        cam.pan_by(Vec2::new(37.0, -12.0));
        let cursor = Pos2::new(400.0, 300.0);
        let before = cam.screen_to_world(cursor);

        cam.zoom_to_point(cursor, -10.0, false);
        assert!(approx(cam.zoom(), 1.04));
        let after = cam.screen_to_world(cursor);
        assert!(approx(before.x, after.x) && approx(before.y, after.y));
    }

    #[test]
    fn test_wheel_speeds() {
        let mut cam = camera();
        cam.zoom_to_point(Pos2::ZERO, 120.0, false);
        assert!(approx(cam.zoom(), 0.92));

        let mut cam = camera();
        cam.zoom_to_point(Pos2::ZERO, 120.0, true);
        assert!(approx(cam.zoom(), 0.99));

        let mut cam = camera();
        cam.zoom_to_point(Pos2::ZERO, 0.0, false);
        assert_eq!(cam.zoom(), 1.0);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut cam = camera();
        for _ in 0..500 {
            cam.zoom_to_point(Pos2::new(10.0, 10.0), -500.0, false);
        }
        assert_eq!(cam.zoom(), 4.0);
        for _ in 0..1000 {
            cam.zoom_to_point(Pos2::new(10.0, 10.0), 500.0, false);
        }
        assert_eq!(cam.zoom(), 0.05);
    }

    #[test]
    fn test_double_click_deferred_zoom() {
        let mut cam = camera();
        cam.double_click_zoom(Pos2::new(500.0, 400.0), 1_000);
        assert_eq!(cam.zoom(), 1.0);
        assert!(cam.has_pending_zoom());

        assert_eq!(cam.tick(1_200), CameraTick::default());
        let tick = cam.tick(1_300);
        assert!(tick.zoomed);
        assert!(approx(cam.zoom(), 1.5));
        assert!(cam.is_animating());
    }

    #[test]
    fn test_second_double_click_jumps_to_overview() {
        let mut cam = camera();
        cam.double_click_zoom(Pos2::new(500.0, 400.0), 1_000);
        cam.double_click_zoom(Pos2::new(500.0, 400.0), 1_150);
        assert!(approx(cam.zoom(), 0.15));
        assert!(!cam.has_pending_zoom());
        // the cancelled zoom-in never fires
        assert!(!cam.tick(5_000).zoomed);
        assert!(approx(cam.zoom(), 0.15));
    }

    #[test]
    fn test_small_marquee_ignored() {
        let mut cam = camera();
        let (zoom, pan) = (cam.zoom(), cam.pan());
        assert!(!cam.marquee_zoom(Pos2::new(100.0, 100.0), Pos2::new(105.0, 105.0), 0));
        assert_eq!((cam.zoom(), cam.pan()), (zoom, pan));
    }

    #[test]
    fn test_marquee_frames_world_rect() {
        let mut cam = camera();
        assert!(cam.marquee_zoom(Pos2::new(100.0, 100.0), Pos2::new(300.0, 260.0), 0));
        // 200x160 world rect plus 40 padding each side: min(1000/280, 800/240)
        assert!(approx(cam.zoom(), 800.0 / 240.0));
        let center = cam.world_to_screen(Pos2::new(200.0, 180.0));
        assert!(approx(center.x, 500.0) && approx(center.y, 400.0));
    }

    #[test]
    fn test_settle_clears_animating() {
        let mut cam = camera();
        let boxes = [Rect::from_min_size(Pos2::ZERO, Vec2::new(240.0, 180.0))];
        assert!(cam.fit_to_boxes(&boxes, 1, false, 0));
        assert!(cam.is_animating());
        assert!(cam.tick(300).settled);
        assert!(!cam.is_animating());
    }

    #[test]
    fn test_degenerate_fit_keeps_state() {
        let mut cam = camera();
        cam.pan_by(Vec2::new(5.0, 5.0));
        assert!(!cam.fit_to_boxes(&[], 0, false, 0));
        assert_eq!(cam.pan(), Vec2::new(5.0, 5.0));
        assert!(!cam.is_animating());
    }

    #[test]
    fn test_non_finite_pan_dropped() {
        let mut cam = camera();
        cam.pan_by(Vec2::new(f32::NAN, 1.0));
        cam.pan_from_drag(Vec2::ZERO, Vec2::new(f32::INFINITY, 0.0));
        assert_eq!(cam.pan(), Vec2::ZERO);
    }

    #[test]
    fn test_cancel_timers() {
        let mut cam = camera();
        cam.double_click_zoom(Pos2::ZERO, 0);
        cam.cancel_timers();
        assert_eq!(cam.tick(10_000), CameraTick::default());
        assert_eq!(cam.zoom(), 1.0);
    }
}
