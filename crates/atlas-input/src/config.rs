//! Input configuration.

use crate::error::InputError;
use crate::{DEFAULT_DRAG_THRESHOLD, DEFAULT_KEYBOARD_ZOOM_STEP, DEFAULT_MARQUEE_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Thresholds and steps used by the interaction machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Pointer travel (pixels) before a press on a table becomes a drag.
    pub drag_threshold: f32,
    /// Minimum marquee diagonal (pixels); shorter drags count as clicks.
    pub marquee_threshold: f32,
    /// Relative zoom change for `+` / `-`.
    pub keyboard_zoom_step: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            marquee_threshold: DEFAULT_MARQUEE_THRESHOLD,
            keyboard_zoom_step: DEFAULT_KEYBOARD_ZOOM_STEP,
        }
    }
}

impl InputConfig {
    pub fn from_json_str(json: &str) -> Result<Self, InputError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the machine cannot work with.
    pub fn validate(&self) -> Result<(), InputError> {
        let checks = [
            ("drag_threshold", self.drag_threshold),
            ("marquee_threshold", self.marquee_threshold),
            ("keyboard_zoom_step", self.keyboard_zoom_step),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(InputError::InvalidConfig {
                    field: name,
                    value,
                });
            }
        }
        if self.keyboard_zoom_step >= 1.0 {
            return Err(InputError::InvalidConfig {
                field: "keyboard_zoom_step",
                value: self.keyboard_zoom_step,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InputConfig::default();
        assert_eq!(config.drag_threshold, 4.0);
        assert_eq!(config.marquee_threshold, 8.0);
        assert_eq!(config.keyboard_zoom_step, 0.15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = InputConfig::from_json_str(r#"{"drag_threshold": 6}"#).unwrap();
        assert_eq!(config.drag_threshold, 6.0);
        assert_eq!(config.marquee_threshold, 8.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = InputConfig::from_json_str(r#"{"keyboard_zoom_step": 1.5}"#).unwrap_err();
        assert!(matches!(err, InputError::InvalidConfig { field: "keyboard_zoom_step", .. }));
        assert!(InputConfig::from_json_str("[1, 2]").is_err());
    }
}
