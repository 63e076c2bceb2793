//! Input errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid input config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {value}")]
    InvalidConfig { field: &'static str, value: f32 },
}
