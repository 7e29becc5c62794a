//! Script file and entry point resolution for a single function.

use super::SkipReason;
use crate::error::{ErrorExt, Result};
use crate::metadata::{ENTRY_POINT, FunctionDescriptor, SCRIPT_FILE, Shadow};
use crate::packhost::OutputPath;
use serde_json::Value as Json;
use std::path::Path;

/// File preferred when a function directory holds several scripts.
const INDEX_SCRIPT: &str = "index.js";

const SCRIPT_EXTENSION: &str = ".js";

/// Outcome of script file resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ScriptFile {
    Found { path: String, original: Shadow },
    Skipped(SkipReason),
}

/// Resolves the module that provides the function's handler.
///
/// Shadows recorded by a previous pack win over the live field. A `false`
/// shadow means the original descriptor had no `scriptFile`, so the script is
/// inferred again from the directory contents.
pub(super) async fn resolve_script_file(
    function_dir: &Path,
    descriptor: &FunctionDescriptor,
    output: &OutputPath,
) -> Result<ScriptFile> {
    match descriptor.original_script_file() {
        Shadow::Value(path) => Ok(ScriptFile::Found {
            original: Shadow::Value(path.clone()),
            path,
        }),
        Shadow::ExplicitlyNone => infer_script_file(function_dir).await,
        Shadow::Unset => match descriptor.get(SCRIPT_FILE) {
            Some(Json::String(path)) if output.contains_script(path) => {
                Ok(ScriptFile::Skipped(SkipReason::PointsAtOutput))
            }
            Some(Json::String(path)) if path.ends_with(SCRIPT_EXTENSION) => Ok(ScriptFile::Found {
                original: Shadow::Value(path.clone()),
                path: path.clone(),
            }),
            Some(_) => Ok(ScriptFile::Skipped(SkipReason::NonScriptFile)),
            None => infer_script_file(function_dir).await,
        },
    }
}

/// Picks the start file from the directory: the only script if there is
/// exactly one, otherwise `index.js` if present.
async fn infer_script_file(function_dir: &Path) -> Result<ScriptFile> {
    let scripts = list_scripts(function_dir).await?;
    log::debug!(
        "Inferring start file in {} from [{}]",
        function_dir.display(),
        scripts.join(", ")
    );

    let chosen = match scripts.as_slice() {
        [only] => only.clone(),
        [] => return Ok(ScriptFile::Skipped(SkipReason::NoStartFile)),
        _ if scripts.iter().any(|s| s == INDEX_SCRIPT) => INDEX_SCRIPT.to_string(),
        _ => return Ok(ScriptFile::Skipped(SkipReason::AmbiguousStartFile)),
    };

    Ok(ScriptFile::Found {
        path: chosen,
        original: Shadow::ExplicitlyNone,
    })
}

async fn list_scripts(dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .fs_context("reading function directory", dir)?;

    let mut scripts = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading directory entry in", dir)?
    {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !name.ends_with(SCRIPT_EXTENSION) {
            continue;
        }
        let is_file = tokio::fs::metadata(entry.path())
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false);
        if is_file {
            scripts.push(name);
        }
    }

    scripts.sort();
    Ok(scripts)
}

/// Resolves the original entry point and the member the aggregate selects.
///
/// A packed descriptor without an entry point shadow never had an entry point;
/// its live `entryPoint` is the safe identifier written by pack. An unpacked
/// `entryPoint` that is not a string cannot be shadowed, so the function is
/// skipped with [`SkipReason::NonStringEntryPoint`].
pub(super) fn resolve_entry_point(
    descriptor: &FunctionDescriptor,
) -> std::result::Result<(Option<String>, Shadow), SkipReason> {
    let original = match descriptor.original_entry_point() {
        Shadow::Unset if descriptor.is_packed() => Shadow::ExplicitlyNone,
        Shadow::Unset => Shadow::capture(descriptor.get(ENTRY_POINT))
            .ok_or(SkipReason::NonStringEntryPoint)?,
        shadow => shadow,
    };

    let member = match &original {
        Shadow::Value(entry_point) if !entry_point.is_empty() => Some(entry_point.clone()),
        _ => None,
    };

    Ok((member, original))
}
