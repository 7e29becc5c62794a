//! Detection of the `node` executable that runs the driver script.

use super::error::{Error, Result};
use std::path::PathBuf;
use std::sync::LazyLock;

/// Path of a working `node`, looked up once per process.
static NODE_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| match which::which("node") {
    Ok(path) => {
        log::debug!("Found node at: {}", path.display());

        match std::process::Command::new(&path).arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                log::info!("node available: {}", version.trim());
                Some(path)
            }
            Ok(output) => {
                log::warn!(
                    "node found at {} but --version check failed (exit code: {:?}). Stderr: {}",
                    path.display(),
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr)
                );
                None
            }
            Err(e) => {
                log::warn!(
                    "node found at {} but failed to execute: {}. Check file permissions.",
                    path.display(),
                    e
                );
                None
            }
        }
    }
    Err(e) => {
        log::debug!("node not found in PATH: {}", e);
        None
    }
});

/// Returns the `node` executable, or [`Error::ToolNotFound`].
pub fn node_path() -> Result<PathBuf> {
    NODE_PATH
        .clone()
        .ok_or_else(|| Error::ToolNotFound("node".to_string()))
}
