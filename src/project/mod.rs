//! Pack and unpack flows over a project root.
//!
//! Packing runs discovery, writes the generated module, bundles it and only
//! then rewrites descriptors, so a failed build leaves every descriptor as it
//! was. Unpacking restores descriptors and removes the output directory.

use crate::bundler::{BundleOutcome, BundleSettings, WatchSession, WebpackRunner, resolve_in};
use crate::discovery::{self, FunctionModule, SkippedFunction};
use crate::error::Result;
use crate::metadata::FuncpackConfig;
use crate::packhost::{
    DEFAULT_INDEX_FILE_NAME, DEFAULT_OUTPUT_DIR, OutputDir, OutputPath,
    generated_entry_file_name, write_host_file,
};
use crate::patcher::{self, PatchOptions};
use std::path::{Path, PathBuf};

/// Bundler options for a pack run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BundleOptions {
    pub minify: bool,
    pub watch: bool,
}

/// Options for [`ProjectRoot::pack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOptions {
    /// Output directory relative to the project root.
    pub output_dir: String,
    /// File name of the module packed descriptors load: the bundle, or the
    /// generated module itself when bundling is off.
    pub index_file_name: String,
    /// Write packed descriptors into the output directory instead of in place.
    pub copy_to_output: bool,
    /// `None` skips bundling; descriptors then run the generated module directly.
    pub bundle: Option<BundleOptions>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            index_file_name: DEFAULT_INDEX_FILE_NAME.to_string(),
            copy_to_output: false,
            bundle: Some(BundleOptions::default()),
        }
    }
}

/// What a pack run did.
#[derive(Debug)]
pub struct PackReport {
    pub functions: Vec<FunctionModule>,
    pub skipped: Vec<SkippedFunction>,
    /// The generated module.
    pub host_file: PathBuf,
    /// Descriptor files written.
    pub patched: Vec<PathBuf>,
    /// Present when the bundler runs in watch mode.
    pub watch: Option<WatchSession>,
}

/// What an unpack run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackReport {
    /// Descriptor files restored.
    pub restored: Vec<PathBuf>,
}

/// A function app directory: one subdirectory per function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    path: PathBuf,
}

impl ProjectRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Packs the project, bundling with `node` from `PATH`.
    pub async fn pack(&self, options: &PackOptions) -> Result<PackReport> {
        self.pack_with_runner(options, &WebpackRunner::new()).await
    }

    /// Packs the project with the given bundler runner.
    pub async fn pack_with_runner(
        &self,
        options: &PackOptions,
        runner: &WebpackRunner,
    ) -> Result<PackReport> {
        log::info!("Packing project at: {}", self.path.display());
        let location = OutputPath::new(&options.output_dir)?;
        let config = FuncpackConfig::load(&self.path).await?;

        let discovered = discovery::discover(&self.path, &location).await?;

        let output = OutputDir::acquire(&self.path, location).await?;
        // The bundler reads the generated module and writes the index file, so
        // the two must not share a name.
        let host_name = match options.bundle {
            Some(_) => generated_entry_file_name(&options.index_file_name),
            None => options.index_file_name.clone(),
        };
        let host_file = write_host_file(&output, &host_name, &discovered.functions).await?;

        let watch = match options.bundle {
            Some(bundle) => {
                self.bundle(&output, &host_file, &options.index_file_name, &config, bundle, runner)
                    .await?
            }
            None => None,
        };

        let patch_options = PatchOptions {
            copy_to_output: options.copy_to_output,
            index_file_name: options.index_file_name.clone(),
        };
        let patched = match patcher::patch_functions(
            &self.path,
            &output,
            &discovered.functions,
            &discovered.skipped,
            &patch_options,
        )
        .await
        {
            Ok(patched) => patched,
            Err(e) => {
                if let Some(session) = watch {
                    session.stop().await;
                }
                return Err(e);
            }
        };

        Ok(PackReport {
            functions: discovered.functions,
            skipped: discovered.skipped,
            host_file,
            patched,
            watch,
        })
    }

    async fn bundle(
        &self,
        output: &OutputDir,
        host_file: &Path,
        bundle_file_name: &str,
        config: &FuncpackConfig,
        options: BundleOptions,
        runner: &WebpackRunner,
    ) -> Result<Option<WatchSession>> {
        let settings = BundleSettings::builder()
            .entry(host_file)
            .output_path(output.path())
            .output_filename(bundle_file_name)
            .externals(config.ignored_modules.as_slice())
            .minify(options.minify)
            .watch(options.watch)
            .edit_config(
                config
                    .edit_config
                    .as_deref()
                    .map(|module| resolve_in(&self.path, module)),
            )
            .build()?;

        match runner.invoke(settings, &self.path).await? {
            BundleOutcome::Built(_) => Ok(None),
            BundleOutcome::Watching(session) => Ok(Some(session)),
        }
    }

    /// Restores every packed descriptor and removes the output directory.
    pub async fn unpack(&self, output_dir: &str) -> Result<UnpackReport> {
        log::info!("Unpacking project at: {}", self.path.display());
        let location = OutputPath::new(output_dir)?;
        discovery::ensure_project_root(&self.path).await?;

        let restored = patcher::unpack_functions(&self.path, &location).await?;
        Ok(UnpackReport { restored })
    }
}
