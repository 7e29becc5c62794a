//! Error types for pack and unpack operations.
//!
//! Configuration problems, I/O failures and bundler failures are all fatal for a
//! run and surface at the CLI boundary as a single message. Functions that cannot
//! be aggregated are not errors; discovery reports them as skipped.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for funcpack operations
pub type Result<T> = std::result::Result<T, FuncpackError>;

/// Main error type for all funcpack operations
#[derive(Error, Debug)]
pub enum FuncpackError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// The project layout or settings make the run impossible
    #[error("Configuration error: {reason}")]
    Config {
        /// Reason for the error
        reason: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO errors with the action and path that failed
    #[error("Failed {action} {}: {source}", path.display())]
    Fs {
        /// What was being done when the error occurred
        action: &'static str,
        /// Path involved in the failed operation
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A descriptor file exists but cannot be used
    #[error("Invalid descriptor {}: {reason}", path.display())]
    Descriptor {
        /// Path of the descriptor file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Errors raised with [`bail!`](crate::bail)
    #[error("{0}")]
    Generic(String),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl FuncpackError {
    /// Builds a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Returns true for errors caused by the project layout or settings rather
    /// than by the file system or the bundler.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Cli(_))
    }
}

/// Attaches the failed action and path to IO errors.
pub trait ErrorExt<T> {
    /// Converts an IO error into [`FuncpackError::Fs`].
    fn fs_context(self, action: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, action: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| FuncpackError::Fs {
            action,
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Returns early with a [`FuncpackError::Generic`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::error::FuncpackError::Generic(format!($($arg)*)))
    };
}
