//! Error types for the file-mode write path

use std::io;
use std::path::PathBuf;

/// Result type for file sink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while persisting queued lines
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File mode was selected but no target path was configured
    #[error("no log file path configured")]
    MissingPath,

    /// Opening the target file failed
    #[error("failed to open log file at {path}: {source}")]
    Open {
        /// The path that failed to open
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// The target path is a directory
    #[error("{0} is not a file")]
    NotAFile(PathBuf),

    /// Appending a line failed
    #[error("failed to write to log file at {path}: {source}")]
    Write {
        /// The file being written
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },
}
