//! Raw input events in screen coordinates.
//!
//! Platform events (egui, winit, DOM) are converted to `RawInput` before they
//! reach the interaction machine.

use bitflags::bitflags;
use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const NONE = 0;
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        /// Cmd on macOS, Windows key elsewhere.
        const META = 1 << 3;
    }
}

impl Modifiers {
    /// True if any modifier is held.
    pub fn any(&self) -> bool {
        !self.is_empty()
    }
}

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Keys the canvas reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Plus,
    Minus,
    Zero,
    Escape,
    Other(char),
}

impl Key {
    /// Map a typed character (`=` shares the `+` key on most layouts).
    pub fn from_char(c: char) -> Self {
        match c {
            '+' | '=' => Key::Plus,
            '-' | '_' => Key::Minus,
            '0' => Key::Zero,
            other => Key::Other(other),
        }
    }
}

/// Raw input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawInput {
    // =========================================================================
    // POINTER
    // =========================================================================
    PointerDown {
        button: PointerButton,
        pos: Pos2,
        modifiers: Modifiers,
    },
    PointerMove {
        pos: Pos2,
    },
    PointerUp {
        button: PointerButton,
        pos: Pos2,
    },
    /// Pointer left the canvas; ends any gesture without a click.
    PointerLeave,
    /// Delivered after the click of the same gesture.
    DoubleClick {
        pos: Pos2,
    },
    /// Wheel delta; negative zooms in.
    Wheel {
        pos: Pos2,
        delta: f32,
        modifiers: Modifiers,
    },

    // =========================================================================
    // KEYBOARD
    // =========================================================================
    KeyDown {
        key: Key,
        modifiers: Modifiers,
        /// Keyboard focus is inside a text field
        in_text_input: bool,
    },

    // =========================================================================
    // SPECIAL
    // =========================================================================
    Resized {
        size: Vec2,
    },
}

impl RawInput {
    pub fn pointer_down(button: PointerButton, x: f32, y: f32) -> Self {
        RawInput::PointerDown {
            button,
            pos: Pos2::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_down_with(button: PointerButton, x: f32, y: f32, modifiers: Modifiers) -> Self {
        RawInput::PointerDown {
            button,
            pos: Pos2::new(x, y),
            modifiers,
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        RawInput::PointerMove { pos: Pos2::new(x, y) }
    }

    pub fn pointer_up(button: PointerButton, x: f32, y: f32) -> Self {
        RawInput::PointerUp {
            button,
            pos: Pos2::new(x, y),
        }
    }

    pub fn double_click(x: f32, y: f32) -> Self {
        RawInput::DoubleClick { pos: Pos2::new(x, y) }
    }

    pub fn wheel(delta: f32, x: f32, y: f32) -> Self {
        RawInput::Wheel {
            pos: Pos2::new(x, y),
            delta,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: Key) -> Self {
        RawInput::KeyDown {
            key,
            modifiers: Modifiers::NONE,
            in_text_input: false,
        }
    }

    /// Key typed while a text field has focus
    pub fn key_in_text(key: Key) -> Self {
        RawInput::KeyDown {
            key,
            modifiers: Modifiers::NONE,
            in_text_input: true,
        }
    }

    pub fn is_keyboard(&self) -> bool {
        matches!(self, RawInput::KeyDown { .. })
    }

    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            RawInput::PointerDown { .. }
                | RawInput::PointerMove { .. }
                | RawInput::PointerUp { .. }
                | RawInput::PointerLeave
                | RawInput::DoubleClick { .. }
                | RawInput::Wheel { .. }
        )
    }
}
