//! The engine-owned output directory.

use crate::error::{FuncpackError, Result};
use crate::utils::fs;
use std::path::{Component, Path, PathBuf};

/// Default name of the output directory inside the project root.
pub const DEFAULT_OUTPUT_DIR: &str = ".funcpack";

/// Validated location of the output directory, relative to the project root.
///
/// Only plain relative paths are accepted: no root, no drive prefix and no
/// `..` components. Components are joined with `/` regardless of platform,
/// because the paths derived from it end up in descriptors and generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPath {
    components: Vec<String>,
}

impl OutputPath {
    /// Validates an output directory path given relative to the project root.
    pub fn new(relative: &str) -> Result<Self> {
        let mut components = Vec::new();
        for component in Path::new(&relative.replace('\\', "/")).components() {
            match component {
                Component::Normal(part) => components.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(FuncpackError::config(format!(
                        "Output directory must be a relative path inside the project root, got '{}'",
                        relative
                    )));
                }
            }
        }

        if components.is_empty() {
            return Err(FuncpackError::config(format!(
                "Output directory '{}' does not name a directory",
                relative
            )));
        }

        Ok(Self { components })
    }

    /// The path with `/` separators, e.g. `.funcpack` or `build/pack`.
    pub fn to_slash_path(&self) -> String {
        self.components.join("/")
    }

    /// The top-level directory of the project root that the output lives in.
    pub fn top_level(&self) -> &str {
        &self.components[0]
    }

    /// `../` repeated once per component: the way back to the project root from
    /// inside the output directory.
    pub fn up_prefix(&self) -> String {
        "../".repeat(self.components.len())
    }

    /// Absolute location under the project root.
    pub fn resolve(&self, project_root: &Path) -> PathBuf {
        self.components
            .iter()
            .fold(project_root.to_path_buf(), |path, part| path.join(part))
    }

    /// True if a `scriptFile` written relative to a function directory points
    /// into the output directory.
    pub fn contains_script(&self, script_file: &str) -> bool {
        let normalized = script_file.replace('\\', "/");
        normalized
            .strip_prefix("../")
            .and_then(|rest| rest.strip_prefix(self.to_slash_path().as_str()))
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl Default for OutputPath {
    fn default() -> Self {
        Self {
            components: vec![DEFAULT_OUTPUT_DIR.to_string()],
        }
    }
}

/// Handle to an acquired output directory.
///
/// Acquiring deletes any previous output directory and creates an empty one;
/// the generator, the bundler and the patcher all write through this handle.
#[derive(Debug, Clone)]
pub struct OutputDir {
    location: OutputPath,
    path: PathBuf,
}

impl OutputDir {
    /// Deletes and recreates the output directory under `project_root`.
    pub async fn acquire(project_root: &Path, location: OutputPath) -> Result<Self> {
        let path = location.resolve(project_root);
        log::debug!("Recreating output directory: {}", path.display());
        fs::create_dir_all(&path, true).await?;
        Ok(Self { location, path })
    }

    pub fn location(&self) -> &OutputPath {
        &self.location
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file directly inside the output directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}
