//! Errors at the fallible boundaries of the engine (configuration loading).
//!
//! Geometry and layout operations never return errors: degenerate input is a
//! no-op that keeps the last good state.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// Extension other than .yaml/.yml/.json
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::config::EngineConfig;

    /// Every variant maps to a config-loading failure; a new variant must
    /// name the boundary that raises it.
    fn raised_by(err: &GraphError) -> &'static str {
        match err {
            GraphError::Io { .. } => "read",
            GraphError::Yaml(_) => "yaml",
            GraphError::Json(_) => "json",
            GraphError::UnsupportedFormat(_) => "extension",
        }
    }

    #[test]
    fn test_each_variant_is_raised_by_config_loading() {
        let dir = std::env::temp_dir().join(format!("atlas-graph-error-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let toml = dir.join("engine.toml");
        std::fs::write(&toml, "layout = {}").unwrap();

        let errors = [
            EngineConfig::load(dir.join("missing.yaml")).unwrap_err(),
            EngineConfig::from_yaml_str("layout: [1, 2]").unwrap_err(),
            EngineConfig::from_json_str("{ nope").unwrap_err(),
            EngineConfig::load(&toml).unwrap_err(),
        ];
        let kinds: Vec<_> = errors.iter().map(raised_by).collect();
        assert_eq!(kinds, vec!["read", "yaml", "json", "extension"]);
        assert!(errors[3].to_string().contains("toml"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
