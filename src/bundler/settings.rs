//! Declarative bundler configuration.

use super::error::{Context, Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Rewrites the computed configuration before it is handed to the bundler.
pub type ConfigTransform = Box<dyn Fn(BundleSettings) -> Result<BundleSettings> + Send + Sync>;

/// Everything the driver script needs to run one bundler invocation.
///
/// Serialized as camelCase JSON into the driver script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSettings {
    /// Absolute path of the generated module.
    pub entry: PathBuf,
    /// Modules left as runtime `require`s, keyed by lower-cased name.
    pub externals: BTreeMap<String, String>,
    /// Directory the bundle is written to.
    pub output_path: PathBuf,
    /// File name of the bundle.
    pub output_filename: String,
    pub minify: bool,
    pub watch: bool,
    /// Absolute path of a module exporting `(config, webpack) => config`.
    pub edit_config: Option<PathBuf>,
}

impl BundleSettings {
    pub fn builder() -> BundleSettingsBuilder {
        BundleSettingsBuilder::default()
    }

    /// Absolute path of the bundle produced by a successful build.
    pub fn output_file(&self) -> PathBuf {
        self.output_path.join(&self.output_filename)
    }
}

/// Maps each excluded module to an externals entry: lower-cased name to
/// original spelling.
pub fn externals_map<S: AsRef<str>>(modules: &[S]) -> BTreeMap<String, String> {
    modules
        .iter()
        .map(|module| {
            let module = module.as_ref();
            (module.to_lowercase(), module.to_string())
        })
        .collect()
}

/// Builder for [`BundleSettings`].
#[derive(Debug, Default)]
pub struct BundleSettingsBuilder {
    entry: Option<PathBuf>,
    externals: Vec<String>,
    output_path: Option<PathBuf>,
    output_filename: Option<String>,
    minify: bool,
    watch: bool,
    edit_config: Option<PathBuf>,
}

impl BundleSettingsBuilder {
    /// Sets the module the bundler starts from. Required.
    pub fn entry(mut self, entry: impl Into<PathBuf>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    /// Modules that must not be bundled.
    pub fn externals<S: AsRef<str>>(mut self, modules: &[S]) -> Self {
        self.externals = modules.iter().map(|m| m.as_ref().to_string()).collect();
        self
    }

    /// Sets the directory the bundle is written to. Required.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Sets the bundle file name. Required.
    pub fn output_filename(mut self, filename: impl Into<String>) -> Self {
        self.output_filename = Some(filename.into());
        self
    }

    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    pub fn edit_config(mut self, module: Option<PathBuf>) -> Self {
        self.edit_config = module;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `entry`, `output_path` or `output_filename` is
    /// missing, or if the bundle would be written over the entry. A watching
    /// bundler would otherwise rebuild from its own output.
    pub fn build(self) -> Result<BundleSettings> {
        let entry = self.entry.context("entry is required")?;
        let output_path = self.output_path.context("output_path is required")?;
        let output_filename = self.output_filename.context("output_filename is required")?;
        if output_path.join(&output_filename) == entry {
            return Err(Error::GenericError(format!(
                "bundle output {} must differ from the entry",
                entry.display()
            )));
        }

        Ok(BundleSettings {
            externals: externals_map(&self.externals),
            entry,
            output_path,
            output_filename,
            minify: self.minify,
            watch: self.watch,
            edit_config: self.edit_config,
        })
    }
}

/// Resolves a path from the project config against the project root.
pub fn resolve_in(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
