//! Host aggregator.
//!
//! Generates the single module the bundler starts from. The module maps each
//! function's safe identifier to its handler:
//!
//! ```js
//! module.exports = {
//!     "funcA": require("../funcA/index.js"),
//!     "funcB": require("../funcB/handler.js").run
//! }
//! ```
//!
//! Paths are relative to the output directory, which is where the module lives.
//! When bundling, the module is written as `<stem>.gen.js` and the bundle takes
//! the index file name; without bundling the module is the index file itself.

mod output;

pub use output::{DEFAULT_OUTPUT_DIR, OutputDir, OutputPath};

use crate::discovery::FunctionModule;
use crate::error::{FuncpackError, Result};
use crate::utils::fs::write_file_utf8;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default file name of the module packed descriptors load.
pub const DEFAULT_INDEX_FILE_NAME: &str = "index.js";

/// Infix marking the generated module the bundler starts from.
const GENERATED_INFIX: &str = ".gen";

/// Replacement for every `-` in a function name.
pub const DASH_ESCAPE: &str = "$dash";

/// Renders a function name as the key used in the generated module and in the
/// packed descriptor's `entryPoint`.
///
/// The escape is not injective: `a-b` and `a$dashb` map to the same key.
/// [`render_host_module`] rejects such pairs.
pub fn safe_function_name(name: &str) -> String {
    name.replace('-', DASH_ESCAPE)
}

/// File name of the generated module when a bundle is written to
/// `index_file_name`: `index.js` becomes `index.gen.js`.
pub fn generated_entry_file_name(index_file_name: &str) -> String {
    let path = Path::new(index_file_name);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(extension)) => format!("{stem}{GENERATED_INFIX}.{extension}"),
        _ => format!("{index_file_name}{GENERATED_INFIX}.js"),
    }
}

/// Renders the generated module for the functions, in the given order.
///
/// # Errors
///
/// A configuration error when two function names escape to the same key.
pub fn render_host_module(functions: &[FunctionModule], output: &OutputPath) -> Result<String> {
    let mut keys: HashMap<String, &str> = HashMap::with_capacity(functions.len());
    for function in functions {
        if let Some(other) = keys.insert(function.safe_name(), &function.name) {
            return Err(FuncpackError::config(format!(
                "Functions '{}' and '{}' both export as '{}'",
                other,
                function.name,
                function.safe_name()
            )));
        }
    }

    let up = output.up_prefix();
    let exports: Vec<String> = functions
        .iter()
        .map(|function| {
            let module_path = format!("{}{}/{}", up, function.name, function.script_file);
            let mut export = format!(
                "    {}: require({})",
                js_string(&function.safe_name()),
                js_string(&module_path)
            );
            if let Some(entry_point) = &function.entry_point {
                export.push_str(&member_access(entry_point));
            }
            export
        })
        .collect();

    let mut module = String::from("module.exports = {\n");
    if !exports.is_empty() {
        module.push_str(&exports.join(",\n"));
        module.push('\n');
    }
    module.push('}');
    Ok(module)
}

/// Writes the generated module into the output directory as `file_name`.
///
/// Returns the path of the written file.
pub async fn write_host_file(
    output: &OutputDir,
    file_name: &str,
    functions: &[FunctionModule],
) -> Result<PathBuf> {
    log::debug!("Generating host file for {} functions", functions.len());
    let contents = render_host_module(functions, output.location())?;
    let path = output.file(file_name);
    write_file_utf8(&path, &contents).await?;
    log::info!("Wrote host file: {}", path.display());
    Ok(path)
}

fn js_string(value: &str) -> String {
    Json::String(value.to_string()).to_string()
}

fn member_access(member: &str) -> String {
    if is_identifier(member) {
        format!(".{}", member)
    } else {
        format!("[{}]", js_string(member))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}
