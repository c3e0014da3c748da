//! Crate error types

use thiserror::Error;

/// Configuration and level-data errors
///
/// Gameplay itself has no recoverable errors; these only come from
/// settings or level lookups.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Level number outside the level table
    #[error("unknown level: {0}")]
    UnknownLevel(u32),

    /// Settings failed validation
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings JSON could not be parsed
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Settings file could not be read
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),
}
