//! Error types for core operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors from staging, archive, and tool-invocation plumbing
#[derive(Debug, Error)]
pub enum CoreError {
    /// External tool exited with a non-zero code
    #[error("{program} failed with exit code {status}:\n{output}")]
    Tool {
        program: String,
        status: i32,
        output: String,
    },

    /// External tool could not be started at all
    #[error("Failed to launch {program}: {source}")]
    ToolLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be read or written
    #[error("Archive error in {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
