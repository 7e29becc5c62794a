//! `funcpack unpack`

use super::project_path;
use crate::cli::{RuntimeConfig, UnpackArgs};
use crate::error::Result;
use crate::project::ProjectRoot;

pub async fn execute(args: &UnpackArgs, runtime: &RuntimeConfig) -> Result<i32> {
    let root = project_path(&args.path)?;
    runtime.section(&format!("Unpacking project at: {}", root.display()))?;

    let report = ProjectRoot::new(root).unpack(&args.output).await?;

    for path in &report.restored {
        runtime.verbose_println(&format!("  restored {}", path.display()))?;
    }
    runtime.success(&format!("Restored {} function descriptors", report.restored.len()))?;
    Ok(0)
}
