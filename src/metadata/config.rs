//! Project-level configuration (`funcpack.config.json`).

use crate::error::{FuncpackError, Result};
use crate::utils::fs::{is_file, read_file_utf8};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the optional config file in the project root.
pub const CONFIG_FILE_NAME: &str = "funcpack.config.json";

/// Settings read from `funcpack.config.json`.
///
/// ```json
/// {
///   "ignoredModules": ["sharp", "canvas"],
///   "editConfig": "tools/customize-webpack.js"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FuncpackConfig {
    /// Modules the bundler must leave as runtime `require`s (native addons and
    /// the like).
    pub ignored_modules: Vec<String>,

    /// Module, relative to the project root, that receives the bundler
    /// configuration and the bundler API and returns a modified configuration.
    pub edit_config: Option<PathBuf>,
}

impl FuncpackConfig {
    /// Loads the config from the project root; a missing file yields the defaults.
    pub async fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if !is_file(&path).await {
            log::debug!("No {} in {}", CONFIG_FILE_NAME, project_root.display());
            return Ok(Self::default());
        }

        let contents = read_file_utf8(&path).await?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            FuncpackError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        log::debug!(
            "Loaded {} ({} ignored modules)",
            path.display(),
            config.ignored_modules.len()
        );
        Ok(config)
    }
}
