//! Interaction state machine for the canvas.
//!
//! ```text
//!                 primary down on table          moved > drag threshold
//!   ┌──────┐  ──────────────────────────►  PendingDrag ─────────────────► DraggingNode
//!   │ Idle │  primary down + modifier
//!   │      │  ──────────────────────────►  Marqueeing
//!   │      │  primary down on canvas / header, or middle down anywhere
//!   └──────┘  ──────────────────────────►  Panning
//!      ▲
//!      └──────────── pointer up / leave from any state
//! ```
//!
//! Fixed precedence: middle button beats everything, a held modifier beats a
//! node drag, and a field hit beats the table hit of the same click.

use crate::config::InputConfig;
use crate::raw::{Key, Modifiers, PointerButton, RawInput};
use crate::selection::{EscapeStage, FetchTicket, SampleCell, SampleFetchTracker, Selection};
use atlas_graph::{GraphSession, HitTarget};
use egui::{Pos2, Rect, Vec2};

/// Where a pan gesture started; decides what a click without movement means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressOrigin {
    Canvas,
    DomainHeader(String),
    /// Middle button: never a click
    Middle,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning {
        button: PointerButton,
        start: Pos2,
        start_pan: Vec2,
        origin: PressOrigin,
        moved: bool,
    },
    /// Pressed on a table; not yet a drag
    PendingDrag { target: HitTarget, start: Pos2 },
    DraggingNode { key: String, last: Pos2 },
    Marqueeing { start: Pos2, current: Pos2 },
}

/// What handling one input did.
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    Ignored,
    PanStarted,
    Panned,
    PanEnded,
    DragPending,
    NodeDragged { key: String },
    NodeDropped { key: String },
    MarqueeStarted,
    MarqueeUpdated(Rect),
    MarqueeZoomed,
    /// Marquee released below the threshold
    MarqueeDiscarded,
    Selected(HitTarget),
    SelectionCleared,
    DomainFitted(String),
    ExpansionToggled { key: String, expanded: bool },
    DoubleClickZoom,
    Zoomed,
    FitToView,
    SampleCellCleared,
    Resized,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionMachine {
    state: InteractionState,
    selection: Selection,
    fetches: SampleFetchTracker,
    config: InputConfig,
}

impl InteractionMachine {
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Live marquee rectangle in screen space
    pub fn marquee_rect(&self) -> Option<Rect> {
        match self.state {
            InteractionState::Marqueeing { start, current } => Some(Rect::from_two_pos(start, current)),
            _ => None,
        }
    }

    // =========================================================================
    // SAMPLE DATA
    // =========================================================================

    /// Ticket for fetching sample rows of the selected table
    pub fn begin_sample_fetch(&mut self) -> Option<FetchTicket> {
        let table = self.selection.table.clone()?;
        Some(self.fetches.begin(table))
    }

    /// Whether a fetched result may be shown
    pub fn accept_sample_result(&mut self, ticket: &FetchTicket) -> bool {
        self.selection.table.as_deref() == Some(ticket.table.as_str()) && self.fetches.accept(ticket)
    }

    pub fn select_sample_cell(&mut self, cell: SampleCell) {
        if self.selection.table.is_some() {
            self.selection.select_sample_cell(cell);
        }
    }

    /// Select a relationship (from an edge hit in the renderer)
    pub fn select_relationship(&mut self, index: usize) {
        self.selection.select_relationship(index);
        self.fetches.cancel();
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    pub fn handle(&mut self, input: &RawInput, session: &mut GraphSession, now_ms: u64) -> InputOutcome {
        match input {
            RawInput::PointerDown {
                button,
                pos,
                modifiers,
            } => self.pointer_down(*button, *pos, *modifiers, session),
            RawInput::PointerMove { pos } => self.pointer_move(*pos, session),
            RawInput::PointerUp { button, pos } => self.pointer_up(*button, *pos, session, now_ms),
            RawInput::PointerLeave => self.pointer_leave(),
            RawInput::DoubleClick { pos } => self.double_click(*pos, session, now_ms),
            RawInput::Wheel {
                pos,
                delta,
                modifiers,
            } => {
                session.camera_mut().zoom_to_point(*pos, *delta, modifiers.any());
                InputOutcome::Zoomed
            }
            RawInput::KeyDown {
                key,
                in_text_input,
                ..
            } => {
                if *in_text_input {
                    InputOutcome::Ignored
                } else {
                    self.key_down(*key, session, now_ms)
                }
            }
            RawInput::Resized { size } => {
                session.set_viewport_size(*size);
                InputOutcome::Resized
            }
        }
    }

    // =========================================================================
    // POINTER
    // =========================================================================

    fn pointer_down(
        &mut self,
        button: PointerButton,
        pos: Pos2,
        modifiers: Modifiers,
        session: &GraphSession,
    ) -> InputOutcome {
        let start_pan = session.camera().pan();
        match button {
            PointerButton::Middle => {
                self.state = InteractionState::Panning {
                    button,
                    start: pos,
                    start_pan,
                    origin: PressOrigin::Middle,
                    moved: false,
                };
                InputOutcome::PanStarted
            }
            PointerButton::Secondary => InputOutcome::Ignored,
            PointerButton::Primary if modifiers.any() => {
                self.state = InteractionState::Marqueeing {
                    start: pos,
                    current: pos,
                };
                InputOutcome::MarqueeStarted
            }
            PointerButton::Primary => match session.hit_test_screen(pos) {
                Some(HitTarget::DomainHeader(category)) => {
                    self.state = InteractionState::Panning {
                        button,
                        start: pos,
                        start_pan,
                        origin: PressOrigin::DomainHeader(category),
                        moved: false,
                    };
                    InputOutcome::PanStarted
                }
                Some(target) => {
                    self.state = InteractionState::PendingDrag { target, start: pos };
                    InputOutcome::DragPending
                }
                None => {
                    self.state = InteractionState::Panning {
                        button,
                        start: pos,
                        start_pan,
                        origin: PressOrigin::Canvas,
                        moved: false,
                    };
                    InputOutcome::PanStarted
                }
            },
        }
    }

    fn pointer_move(&mut self, pos: Pos2, session: &mut GraphSession) -> InputOutcome {
        let threshold = self.config.drag_threshold;
        match &mut self.state {
            InteractionState::Idle => InputOutcome::Ignored,
            InteractionState::Panning {
                start,
                start_pan,
                moved,
                ..
            } => {
                let delta = pos - *start;
                if delta.length() > threshold {
                    *moved = true;
                }
                session.camera_mut().pan_from_drag(*start_pan, delta);
                InputOutcome::Panned
            }
            InteractionState::PendingDrag { target, start } => {
                if (pos - *start).length() <= threshold {
                    return InputOutcome::Ignored;
                }
                let Some(key) = target.table_key().map(str::to_string) else {
                    return InputOutcome::Ignored;
                };
                let start = *start;
                self.state = InteractionState::DraggingNode {
                    key: key.clone(),
                    last: pos,
                };
                drag_by(session, &key, pos - start);
                InputOutcome::NodeDragged { key }
            }
            InteractionState::DraggingNode { key, last } => {
                let delta = pos - *last;
                *last = pos;
                let key = key.clone();
                drag_by(session, &key, delta);
                InputOutcome::NodeDragged { key }
            }
            InteractionState::Marqueeing { start, current } => {
                *current = pos;
                InputOutcome::MarqueeUpdated(Rect::from_two_pos(*start, pos))
            }
        }
    }

    fn pointer_up(
        &mut self,
        button: PointerButton,
        pos: Pos2,
        session: &mut GraphSession,
        now_ms: u64,
    ) -> InputOutcome {
        match std::mem::take(&mut self.state) {
            InteractionState::Idle => InputOutcome::Ignored,
            InteractionState::Panning {
                button: pressed,
                origin,
                moved,
                ..
            } => {
                if pressed != button {
                    // other button released mid-pan; keep panning
                    self.state = InteractionState::Panning {
                        button: pressed,
                        start: pos,
                        start_pan: session.camera().pan(),
                        origin,
                        moved,
                    };
                    return InputOutcome::Ignored;
                }
                if moved {
                    return InputOutcome::PanEnded;
                }
                match origin {
                    PressOrigin::Canvas => self.clear_all(session, now_ms),
                    PressOrigin::DomainHeader(category) => {
                        session.fit_to_domain(&category, now_ms);
                        InputOutcome::DomainFitted(category)
                    }
                    PressOrigin::Middle => InputOutcome::PanEnded,
                }
            }
            InteractionState::PendingDrag { target, .. } => self.click_target(target, session, now_ms),
            InteractionState::DraggingNode { key, .. } => InputOutcome::NodeDropped { key },
            InteractionState::Marqueeing { start, .. } => {
                if (pos - start).length() < self.config.marquee_threshold {
                    return InputOutcome::MarqueeDiscarded;
                }
                if session.camera_mut().marquee_zoom(start, pos, now_ms) {
                    InputOutcome::MarqueeZoomed
                } else {
                    InputOutcome::MarqueeDiscarded
                }
            }
        }
    }

    fn pointer_leave(&mut self) -> InputOutcome {
        match std::mem::take(&mut self.state) {
            InteractionState::Idle => InputOutcome::Ignored,
            InteractionState::DraggingNode { key, .. } => InputOutcome::NodeDropped { key },
            InteractionState::Marqueeing { .. } => InputOutcome::MarqueeDiscarded,
            InteractionState::Panning { .. } | InteractionState::PendingDrag { .. } => InputOutcome::PanEnded,
        }
    }

    fn double_click(&mut self, pos: Pos2, session: &mut GraphSession, now_ms: u64) -> InputOutcome {
        match session.hit_test_screen(pos) {
            Some(HitTarget::DomainHeader(_)) => InputOutcome::Ignored,
            Some(target) => match target.table_key() {
                Some(key) => {
                    let key = key.to_string();
                    let expanded = session.toggle_expanded(&key);
                    InputOutcome::ExpansionToggled { key, expanded }
                }
                None => InputOutcome::Ignored,
            },
            None => {
                session.camera_mut().double_click_zoom(pos, now_ms);
                InputOutcome::DoubleClickZoom
            }
        }
    }

    // =========================================================================
    // CLICKS
    // =========================================================================

    fn click_target(&mut self, target: HitTarget, session: &mut GraphSession, now_ms: u64) -> InputOutcome {
        match &target {
            HitTarget::Field { table, field } => {
                self.selection.select_field(table.clone(), field.clone());
                session.focus_select(table, Some(field), now_ms);
            }
            HitTarget::Table(key) => {
                self.selection.select_table(key.clone());
                session.focus_select(key, None, now_ms);
            }
            HitTarget::DomainHeader(category) => {
                session.fit_to_domain(category, now_ms);
                return InputOutcome::DomainFitted(category.clone());
            }
        }
        self.fetches.cancel();
        InputOutcome::Selected(target)
    }

    /// Empty-canvas click and second Escape: drop every selection and leave
    /// focus mode
    fn clear_all(&mut self, session: &mut GraphSession, now_ms: u64) -> InputOutcome {
        self.selection.clear();
        self.fetches.cancel();
        session.set_focus_mode(false, now_ms);
        InputOutcome::SelectionCleared
    }

    // =========================================================================
    // KEYBOARD
    // =========================================================================

    fn key_down(&mut self, key: Key, session: &mut GraphSession, now_ms: u64) -> InputOutcome {
        let step = self.config.keyboard_zoom_step;
        match key {
            Key::Plus => {
                session.camera_mut().zoom_by(1.0 + step);
                InputOutcome::Zoomed
            }
            Key::Minus => {
                session.camera_mut().zoom_by(1.0 - step);
                InputOutcome::Zoomed
            }
            Key::Zero => {
                session.fit_to_view(now_ms);
                InputOutcome::FitToView
            }
            Key::Escape => match self.selection.escape() {
                EscapeStage::SampleCell => InputOutcome::SampleCellCleared,
                EscapeStage::Selection | EscapeStage::Nothing => self.clear_all(session, now_ms),
            },
            Key::Other(_) => InputOutcome::Ignored,
        }
    }
}

/// Move a table by a screen delta at the current zoom
fn drag_by(session: &mut GraphSession, key: &str, screen_delta: Vec2) {
    let zoom = session.camera().zoom();
    session.move_node(key, screen_delta / zoom);
}
