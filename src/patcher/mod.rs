//! Metadata patcher.
//!
//! Pack redirects each function's descriptor at the generated module and keeps
//! the previous handler pointers in shadow fields. Unpack restores the pointers
//! from the shadows and removes them. All descriptor writes of a run go through
//! a [`PatchPlan`] so a failure never leaves a half-patched project.

mod plan;

pub use plan::PatchPlan;

use crate::discovery::{FunctionModule, SkippedFunction, function_directories};
use crate::error::Result;
use crate::metadata::{
    self, DESCRIPTOR_FILE_NAME, FunctionDescriptor, Shadow, parse_descriptor, to_canonical_json,
};
use crate::packhost::{DEFAULT_INDEX_FILE_NAME, OutputDir, OutputPath};
use crate::utils::fs;
use std::path::{Path, PathBuf};

/// Function host configuration copied next to the descriptors in copy mode.
pub const HOST_CONFIG_FILE: &str = "host.json";

/// How packed descriptors are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
    /// Write patched descriptors to `<output>/<name>/function.json` and leave
    /// the originals untouched.
    pub copy_to_output: bool,
    /// File name of the generated module inside the output directory.
    pub index_file_name: String,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            copy_to_output: false,
            index_file_name: DEFAULT_INDEX_FILE_NAME.to_string(),
        }
    }
}

/// `scriptFile` of a packed descriptor, relative to the directory the
/// descriptor is written to.
pub fn packed_script_path(output: &OutputPath, options: &PatchOptions) -> String {
    if options.copy_to_output {
        format!("../{}", options.index_file_name)
    } else {
        format!("../{}/{}", output.to_slash_path(), options.index_file_name)
    }
}

/// Points a descriptor at the generated module.
///
/// Shadows already present are authoritative and are kept; missing ones are
/// filled from the function's resolved originals.
pub fn pack_descriptor(
    descriptor: &mut FunctionDescriptor,
    function: &FunctionModule,
    script_file: &str,
) {
    if !descriptor.original_script_file().is_set() {
        descriptor.set_original_script_file(&function.original_script_file);
    }
    if !descriptor.original_entry_point().is_set() {
        descriptor.set_original_entry_point(&function.original_entry_point);
    }

    descriptor.set_script_file(script_file);
    descriptor.set_entry_point(&function.safe_name());
}

/// Restores a packed descriptor's handler pointers and drops its shadows.
///
/// Returns false, leaving the descriptor untouched, when it is not packed.
pub fn unpack_descriptor(descriptor: &mut FunctionDescriptor) -> bool {
    if !descriptor.is_packed() {
        return false;
    }

    match descriptor.original_script_file() {
        Shadow::Value(script_file) => descriptor.set_script_file(&script_file),
        Shadow::ExplicitlyNone => descriptor.remove_script_file(),
        Shadow::Unset => {}
    }
    match descriptor.original_entry_point() {
        Shadow::Value(entry_point) => descriptor.set_entry_point(&entry_point),
        Shadow::ExplicitlyNone | Shadow::Unset => descriptor.remove_entry_point(),
    }

    descriptor.set_original_script_file(&Shadow::Unset);
    descriptor.set_original_entry_point(&Shadow::Unset);
    true
}

/// Rewrites the descriptors of the discovered functions to run from the
/// generated module.
///
/// In place, skipped functions still packed from an earlier run are unpacked
/// in the same plan, since the new module no longer exports them. Returns the
/// paths of the descriptors written.
pub async fn patch_functions(
    project_root: &Path,
    output: &OutputDir,
    functions: &[FunctionModule],
    skipped: &[SkippedFunction],
    options: &PatchOptions,
) -> Result<Vec<PathBuf>> {
    log::debug!("Updating {} function descriptors", functions.len());
    let script_file = packed_script_path(output.location(), options);
    let mut plan = PatchPlan::new();

    if !options.copy_to_output {
        for stale in skipped.iter().filter(|s| s.packed) {
            let path = metadata::descriptor_path(&project_root.join(&stale.name));
            let contents = fs::read_file_utf8(&path).await?;
            let mut descriptor = parse_descriptor(&path, &contents)?;
            if unpack_descriptor(&mut descriptor) {
                log::warn!("Unpacking skipped function {}", stale.name);
                plan.write(path, Some(contents), to_canonical_json(&descriptor)?);
            }
        }
    }

    for function in functions {
        let source = metadata::descriptor_path(&project_root.join(&function.name));
        let contents = fs::read_file_utf8(&source).await?;
        let mut descriptor = parse_descriptor(&source, &contents)?;
        pack_descriptor(&mut descriptor, function, &script_file);
        let packed = to_canonical_json(&descriptor)?;

        if options.copy_to_output {
            let target = output.path().join(&function.name).join(DESCRIPTOR_FILE_NAME);
            plan.write(target, None, packed);
        } else if packed != contents {
            plan.write(source, Some(contents), packed);
        } else {
            log::debug!("Descriptor of {} is already packed", function.name);
        }
    }

    if plan.is_empty() {
        log::debug!("All descriptors are up to date");
    } else {
        log::debug!("Writing {} descriptors", plan.len());
    }
    let written = plan.apply().await?;

    if options.copy_to_output {
        let host_config = project_root.join(HOST_CONFIG_FILE);
        if fs::is_file(&host_config).await {
            fs::copy_file(&host_config, &output.file(HOST_CONFIG_FILE)).await?;
        }
    }

    log::info!("Patched {} function descriptors", written.len());
    Ok(written)
}

/// Restores every packed descriptor under the project root and deletes the
/// output directory.
///
/// Descriptors without shadow fields are not rewritten. Returns the paths of
/// the descriptors restored.
pub async fn unpack_functions(project_root: &Path, output: &OutputPath) -> Result<Vec<PathBuf>> {
    let mut plan = PatchPlan::new();

    for (name, dir) in function_directories(project_root, output).await? {
        let path = metadata::descriptor_path(&dir);
        let contents = fs::read_file_utf8(&path).await?;
        let mut descriptor = parse_descriptor(&path, &contents)?;

        if unpack_descriptor(&mut descriptor) {
            log::debug!("Restoring handler pointers of {}", name);
            let restored = to_canonical_json(&descriptor)?;
            plan.write(path, Some(contents), restored);
        }
    }

    let restored = plan.apply().await?;

    let output_path = output.resolve(project_root);
    log::debug!("Removing output directory: {}", output_path.display());
    fs::remove_dir_all(&output_path).await?;

    log::info!("Restored {} function descriptors", restored.len());
    Ok(restored)
}
