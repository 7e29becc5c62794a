//! Function discovery.
//!
//! Walks the immediate subdirectories of a project root and turns every one
//! holding a `function.json` into a [`FunctionModule`]. Functions whose start
//! file cannot be determined are reported as skipped instead of failing the run.

mod resolve;

use crate::error::{FuncpackError, Result};
use crate::metadata::{self, Shadow};
use crate::packhost::{OutputPath, safe_function_name};
use resolve::ScriptFile;
use std::fmt;
use std::path::{Path, PathBuf};

/// A function as seen by the aggregator and the patcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionModule {
    /// Directory name, which is also the function name.
    pub name: String,
    /// Script file relative to the function directory.
    pub script_file: String,
    /// Export selected from the script; `None` uses the module itself.
    pub entry_point: Option<String>,
    /// Value stored in `_originalScriptFile` on pack.
    pub original_script_file: Shadow,
    /// Value stored in `_originalEntryPoint` on pack.
    pub original_entry_point: Shadow,
}

impl FunctionModule {
    /// Identifier used as the export key and the packed `entryPoint`.
    pub fn safe_name(&self) -> String {
        safe_function_name(&self.name)
    }
}

/// Why a function directory was left out of the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `scriptFile` is set but is not a `.js` file.
    NonScriptFile,
    /// No `scriptFile` and no `.js` file in the directory.
    NoStartFile,
    /// No `scriptFile`, several `.js` files and no `index.js`.
    AmbiguousStartFile,
    /// `scriptFile` points into the output directory but no shadow fields exist.
    PointsAtOutput,
    /// `entryPoint` is set to something other than a string.
    NonStringEntryPoint,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NonScriptFile => "scriptFile is not a .js file",
            Self::NoStartFile => "no .js start file found",
            Self::AmbiguousStartFile => "several .js files and no index.js",
            Self::PointsAtOutput => "scriptFile points into the output directory",
            Self::NonStringEntryPoint => "entryPoint is not a string",
        };
        f.write_str(reason)
    }
}

/// A function directory that was not aggregated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFunction {
    pub name: String,
    pub reason: SkipReason,
    /// The descriptor still carries shadows from an earlier pack and points
    /// at an export the new aggregate no longer has.
    pub packed: bool,
}

/// Result of walking a project root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Functions in directory name order.
    pub functions: Vec<FunctionModule>,
    /// Directories with a descriptor that could not be aggregated.
    pub skipped: Vec<SkippedFunction>,
}

enum Loaded {
    Function(FunctionModule),
    Skipped { reason: SkipReason, packed: bool },
}

/// Refuses to run when the project root is itself a function directory.
pub async fn ensure_project_root(project_root: &Path) -> Result<()> {
    if metadata::has_descriptor(project_root).await {
        return Err(FuncpackError::config(format!(
            "{} contains a {}; run from the function app root, not from inside a function",
            project_root.display(),
            metadata::DESCRIPTOR_FILE_NAME
        )));
    }
    Ok(())
}

/// Lists the directories that hold a descriptor, excluding the output directory.
pub async fn function_directories(
    project_root: &Path,
    output: &OutputPath,
) -> Result<Vec<(String, PathBuf)>> {
    let names = metadata::list_subdirectories(project_root)
        .await
        .map_err(|e| FuncpackError::config(format!("Unable to read project root: {}", e)))?;
    log::debug!("Found directories in project root: {}", names.join(", "));

    let mut directories = Vec::new();
    for name in names {
        if name == output.top_level() {
            continue;
        }
        let dir = project_root.join(&name);
        if metadata::has_descriptor(&dir).await {
            directories.push((name, dir));
        }
    }
    Ok(directories)
}

/// Discovers every function under the project root.
///
/// Descriptors are read concurrently; the result keeps directory name order.
pub async fn discover(project_root: &Path, output: &OutputPath) -> Result<Discovery> {
    ensure_project_root(project_root).await?;

    let handles: Vec<_> = function_directories(project_root, output)
        .await?
        .into_iter()
        .map(|(name, dir)| {
            let output = output.clone();
            let task_name = name.clone();
            let handle = tokio::spawn(async move { load_function(task_name, dir, output).await });
            (name, handle)
        })
        .collect();

    let mut discovery = Discovery::default();
    for (name, handle) in handles {
        let loaded = match handle.await {
            Ok(loaded) => loaded?,
            Err(e) => crate::bail!("Loading function '{}' failed: {}", name, e),
        };

        match loaded {
            Loaded::Function(function) => {
                log::debug!(
                    "Loaded function({}) using scriptFile: {} - entryPoint: {:?}",
                    function.name,
                    function.script_file,
                    function.entry_point
                );
                discovery.functions.push(function);
            }
            Loaded::Skipped { reason, packed } => {
                log::warn!("Skipping function {}: {}", name, reason);
                discovery.skipped.push(SkippedFunction {
                    name,
                    reason,
                    packed,
                });
            }
        }
    }

    log::info!(
        "Discovered {} functions ({} skipped)",
        discovery.functions.len(),
        discovery.skipped.len()
    );
    Ok(discovery)
}

async fn load_function(name: String, dir: PathBuf, output: OutputPath) -> Result<Loaded> {
    let descriptor = metadata::read_descriptor(&metadata::descriptor_path(&dir)).await?;

    let packed = descriptor.is_packed();
    let skipped = |reason| Loaded::Skipped { reason, packed };

    let (script_file, original_script_file) =
        match resolve::resolve_script_file(&dir, &descriptor, &output).await? {
            ScriptFile::Found { path, original } => (path, original),
            ScriptFile::Skipped(reason) => return Ok(skipped(reason)),
        };
    let (entry_point, original_entry_point) = match resolve::resolve_entry_point(&descriptor) {
        Ok(resolved) => resolved,
        Err(reason) => return Ok(skipped(reason)),
    };

    Ok(Loaded::Function(FunctionModule {
        name,
        script_file,
        entry_point,
        original_script_file,
        original_entry_point,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write(root: &Path, relative: &str, contents: &str) {
        crate::utils::fs::write_file_utf8(&root.join(relative), contents)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn discovers_in_name_order_and_ignores_plain_directories() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "zeta/function.json", r#"{"scriptFile": "index.js"}"#).await;
        write(temp.path(), "alpha/function.json", r#"{"entryPoint": "run"}"#).await;
        write(temp.path(), "alpha/handler.js", "").await;
        write(temp.path(), "lib/util.js", "").await;

        let discovery = discover(temp.path(), &OutputPath::default()).await.unwrap();

        let names: Vec<_> = discovery.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["alpha", "zeta"]);
        assert_eq!(discovery.functions[0].script_file, "handler.js");
        assert_eq!(discovery.functions[0].entry_point.as_deref(), Some("run"));
        assert!(discovery.skipped.is_empty());
    }

    #[tokio::test]
    async fn skips_are_reported_and_the_run_continues() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "ambiguous/function.json", "{}").await;
        write(temp.path(), "ambiguous/a.js", "").await;
        write(temp.path(), "ambiguous/b.js", "").await;
        write(temp.path(), "typed/function.json", r#"{"scriptFile": "run.ts"}"#).await;
        write(temp.path(), "ok/function.json", r#"{"scriptFile": "index.js"}"#).await;

        let discovery = discover(temp.path(), &OutputPath::default()).await.unwrap();

        assert_eq!(discovery.functions.len(), 1);
        assert_eq!(
            discovery.skipped,
            [
                SkippedFunction {
                    name: "ambiguous".into(),
                    reason: SkipReason::AmbiguousStartFile,
                    packed: false,
                },
                SkippedFunction {
                    name: "typed".into(),
                    reason: SkipReason::NonScriptFile,
                    packed: false,
                },
            ]
        );
    }

    #[tokio::test]
    async fn skipped_packed_descriptors_are_flagged() {
        let temp = tempfile::tempdir().unwrap();
        write(
            temp.path(),
            "timer/function.json",
            r#"{"scriptFile": "../.funcpack/index.js", "entryPoint": "timer", "_originalScriptFile": false}"#,
        )
        .await;
        write(temp.path(), "timer/main.js", "").await;
        write(temp.path(), "timer/helper.js", "").await;

        let discovery = discover(temp.path(), &OutputPath::default()).await.unwrap();

        assert_eq!(
            discovery.skipped,
            [SkippedFunction {
                name: "timer".into(),
                reason: SkipReason::AmbiguousStartFile,
                packed: true,
            }]
        );
    }

    #[tokio::test]
    async fn output_directory_is_never_a_candidate() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), ".funcpack/copied/function.json", "{}").await;
        write(temp.path(), ".funcpack/function.json", "{}").await;
        write(temp.path(), ".funcpack/index.js", "").await;

        let discovery = discover(temp.path(), &OutputPath::default()).await.unwrap();

        assert_eq!(discovery, Discovery::default());
    }

    #[tokio::test]
    async fn refuses_to_run_inside_a_function() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "function.json", "{}").await;

        let err = discover(temp.path(), &OutputPath::default()).await.unwrap_err();

        assert!(err.is_configuration(), "{err}");
    }

    #[tokio::test]
    async fn malformed_descriptor_fails_the_run() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "broken/function.json", "{").await;

        let err = discover(temp.path(), &OutputPath::default()).await.unwrap_err();

        assert!(matches!(err, FuncpackError::Descriptor { .. }), "{err}");
    }

    #[test]
    fn safe_name_escapes_hyphens() {
        let function = FunctionModule {
            name: "http-trigger".into(),
            script_file: "index.js".into(),
            entry_point: None,
            original_script_file: Shadow::Value("index.js".into()),
            original_entry_point: Shadow::ExplicitlyNone,
        };
        assert_eq!(function.safe_name(), "http$dashtrigger");
    }
}
