//! Subcommand implementations.

pub mod pack;
pub mod unpack;

use crate::error::{CliError, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Resolves the PATH argument against the current directory.
fn project_path(path: &Path) -> Result<PathBuf> {
    let absolute = path.absolutize().map_err(|e| CliError::InvalidArguments {
        reason: format!("Could not resolve {}: {}", path.display(), e),
    })?;
    Ok(absolute.into_owned())
}
