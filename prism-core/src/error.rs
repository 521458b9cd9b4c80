//! Error types for prism-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading environment scopes.
///
/// A missing or unreadable environment directory is not an error; the loader
/// degrades to an empty [`EnvironmentSet`](crate::EnvironmentSet) instead.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// An environment file exists but could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An environment file is not a JSON object.
    #[error("failed to parse environment file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience constructor for [`EnvironmentError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> EnvironmentError {
    EnvironmentError::Io {
        path: path.into(),
        source,
    }
}
