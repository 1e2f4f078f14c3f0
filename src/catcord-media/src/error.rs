//! Error types for catcord-media.

use std::path::PathBuf;
use thiserror::Error;

/// Media discovery error types.
#[derive(Debug, Error)]
pub enum MediaError {
    /// IO error while reading file metadata.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The media root itself could not be walked.
    #[error("Cannot walk media root {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Result type for media operations.
pub type Result<T> = std::result::Result<T, MediaError>;
