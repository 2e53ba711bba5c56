//! Error types for building and loading the VOEIS store

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building, writing, or loading the store
#[derive(Error, Debug)]
pub enum VoeisError {
    #[error("Corpus file not found: {}", .0.display())]
    CorpusNotFound(PathBuf),

    #[error("Store artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("Malformed corpus line {line} in {}: {reason}", .path.display())]
    MalformedCorpus {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Malformed artifact line: {0}")]
    MalformedArtifact(String),

    #[error("Invalid sequence id: {0:?}")]
    InvalidSequenceId(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VoeisError {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, VoeisError>;
