//! Error types for loading encounter configuration
//!
//! The simulation itself never fails: collaborator refusals skip a beat and
//! phase transitions are total. Only reading settings can go wrong.

use thiserror::Error;

/// Errors raised while loading or validating [`crate::EncounterSettings`]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Settings file could not be read
    #[error("Failed to read settings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Settings JSON is malformed
    #[error("Malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the encounter cannot run with
    #[error("Invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
