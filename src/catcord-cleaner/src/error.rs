//! Error types for catcord-cleaner.

use std::path::PathBuf;
use thiserror::Error;

/// Cleaner error types.
#[derive(Debug, Error)]
pub enum CleanerError {
    /// IO error outside of disk probing.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The filesystem holding the media root cannot be inspected.
    #[error("Cannot inspect filesystem at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Media discovery failed.
    #[error(transparent)]
    Media(#[from] catcord_media::MediaError),

    /// Another cycle already holds the root.
    #[error("A cleaner cycle is already running for {0}")]
    CycleInProgress(PathBuf),

    /// Retention policy violates its invariants.
    #[error("Invalid retention policy: {0}")]
    InvalidPolicy(String),

    /// Config file could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for cleaner operations.
pub type Result<T> = std::result::Result<T, CleanerError>;
