//! Reading, writing and enumerating descriptor files.

use super::FunctionDescriptor;
use crate::error::{ErrorExt, FuncpackError, Result};
use crate::utils::fs::{is_file, read_file_utf8, write_file_utf8};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};

/// Name of the descriptor file inside each function directory.
pub const DESCRIPTOR_FILE_NAME: &str = "function.json";

/// Returns the descriptor path for a function directory.
pub fn descriptor_path(function_dir: &Path) -> PathBuf {
    function_dir.join(DESCRIPTOR_FILE_NAME)
}

/// Returns true if the directory contains a descriptor file.
pub async fn has_descriptor(dir: &Path) -> bool {
    is_file(&descriptor_path(dir)).await
}

/// Parses descriptor text and validates its shadow fields.
pub fn parse_descriptor(path: &Path, contents: &str) -> Result<FunctionDescriptor> {
    let descriptor: FunctionDescriptor =
        serde_json::from_str(contents).map_err(|e| FuncpackError::Descriptor {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    descriptor
        .validate()
        .map_err(|reason| FuncpackError::Descriptor {
            path: path.to_path_buf(),
            reason,
        })?;

    Ok(descriptor)
}

/// Reads and parses a descriptor file.
pub async fn read_descriptor(path: &Path) -> Result<FunctionDescriptor> {
    let contents = read_file_utf8(path).await?;
    parse_descriptor(path, &contents)
}

/// Serializes a descriptor the way it is stored on disk: single-space indent,
/// no trailing newline.
pub fn to_canonical_json(descriptor: &FunctionDescriptor) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
    descriptor.serialize(&mut serializer)?;

    String::from_utf8(buf).map_err(|e| FuncpackError::Generic(e.to_string()))
}

/// Writes a descriptor in canonical form, replacing the file's contents.
pub async fn write_descriptor(path: &Path, descriptor: &FunctionDescriptor) -> Result<()> {
    let contents = to_canonical_json(descriptor)?;
    write_file_utf8(path, &contents).await
}

/// Lists the names of the immediate subdirectories of `root`, sorted.
///
/// Symlinks to directories count as directories. Entries whose names are not
/// valid UTF-8 are ignored.
pub async fn list_subdirectories(root: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(root)
        .await
        .fs_context("reading directory", root)?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading directory entry in", root)?
    {
        let path = entry.path();
        let is_dir = tokio::fs::metadata(&path)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false);
        if !is_dir {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => log::debug!("Ignoring non UTF-8 directory name: {:?}", name),
        }
    }

    names.sort();
    Ok(names)
}
