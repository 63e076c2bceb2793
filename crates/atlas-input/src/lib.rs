//! Canvas input handling for the model atlas.
//!
//! Translates pointer, wheel and keyboard events into operations on a
//! `GraphSession`. The design ensures:
//!
//! 1. **Input source agnostic** - egui, winit or DOM events become `RawInput`
//! 2. **Testable** - input sequences replay against a session without a UI
//! 3. **Explicit precedence** - one gesture at a time, resolved on press
//!
//! # Architecture
//!
//! ```text
//! Mouse    ─┐
//! Wheel    ─┼──► RawInput ──► InteractionMachine ──► GraphSession
//! Keyboard ─┘                      │                   (camera, layout,
//!                                  │                    compaction)
//!                                  ▼
//!                        Selection + SampleFetchTracker
//! ```
//!
//! # Example
//!
//! ```ignore
//! use atlas_input::{InteractionMachine, RawInput, PointerButton};
//!
//! let mut machine = InteractionMachine::default();
//! machine.handle(&RawInput::pointer_down(PointerButton::Primary, 120.0, 80.0), &mut session, now);
//! machine.handle(&RawInput::pointer_up(PointerButton::Primary, 120.0, 80.0), &mut session, now);
//! ```

mod config;
mod error;
mod machine;
mod raw;
mod selection;

pub use config::InputConfig;
pub use error::InputError;
pub use machine::{InputOutcome, InteractionMachine, InteractionState, PressOrigin};
pub use raw::{Key, Modifiers, PointerButton, RawInput};
pub use selection::{EscapeStage, FetchTicket, SampleCell, SampleFetchTracker, Selection};

/// Default drag threshold (pixels).
pub const DEFAULT_DRAG_THRESHOLD: f32 = 4.0;

/// Default minimum marquee diagonal (pixels).
pub const DEFAULT_MARQUEE_THRESHOLD: f32 = 8.0;

/// Default relative zoom step for `+` / `-`.
pub const DEFAULT_KEYBOARD_ZOOM_STEP: f32 = 0.15;
