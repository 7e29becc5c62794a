//! Error types for the bundle invoker.

use std::path::{Path, PathBuf};

/// Result alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while preparing or running the external bundler.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required executable is not on `PATH`.
    #[error("{0} was not found in PATH; install it to bundle the project")]
    ToolNotFound(String),

    /// The bundler process could not be started.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The build finished with errors. Carries the tool's diagnostics verbatim.
    #[error("{0}")]
    BuildFailed(String),

    /// Driver script template errors.
    #[error("Template error: {0}")]
    Template(String),

    /// IO errors with the action and path that failed.
    #[error("Failed {action} {}: {source}", path.display())]
    IoError {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

/// Attaches the failed action and path to IO errors.
pub trait ErrorExt<T> {
    fn fs_context(self, action: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, action: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::IoError {
            action,
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Turns a missing value into [`Error::GenericError`].
pub trait Context<T> {
    fn context(self, message: &str) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context(self, message: &str) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(message.to_string()))
    }
}
