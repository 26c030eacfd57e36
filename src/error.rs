use std::path::PathBuf;

use thiserror::Error;

/// Configuration problems, caught once when settings are loaded or a world is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to spawn generation worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cave level ({cave_level}) must be below surface level ({surface_level})")]
    LevelOrdering { cave_level: f64, surface_level: f64 },
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("render distance must be at least 1, got {0}")]
    InvalidRenderDistance(i32),
}
