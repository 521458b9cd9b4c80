//! Error types for prism-batch.

use std::path::PathBuf;

use thiserror::Error;

use prism_core::EnvironmentError;

/// Errors that abort a batch run, plus the write error that the orchestrator
/// isolates per artifact.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Environment data could not be loaded (malformed or unreadable file).
    #[error("environment error: {0}")]
    Environment(#[from] EnvironmentError),

    /// The workspace root does not exist or is not a directory.
    #[error("workspace not found or not a directory: {path}")]
    WorkspaceNotFound { path: PathBuf },

    /// A template path is not located under the workspace root.
    #[error("template {path} is outside workspace {workspace}")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`BatchError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> BatchError {
    BatchError::Io {
        path: path.into(),
        source,
    }
}
