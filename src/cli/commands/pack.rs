//! `funcpack pack`

use super::project_path;
use crate::bundler::WatchSession;
use crate::cli::{PackArgs, RuntimeConfig};
use crate::error::Result;
use crate::packhost::DEFAULT_INDEX_FILE_NAME;
use crate::project::{BundleOptions, PackOptions, ProjectRoot};

/// Line printed once the first watch build succeeded.
pub const WATCHING_MESSAGE: &str = "Webpack compiled successfully. Watching for changes.";

pub async fn execute(args: &PackArgs, runtime: &RuntimeConfig) -> Result<i32> {
    let root = project_path(&args.path)?;
    runtime.section(&format!("Packing project at: {}", root.display()))?;

    let options = PackOptions {
        output_dir: args.output.clone(),
        index_file_name: DEFAULT_INDEX_FILE_NAME.to_string(),
        copy_to_output: args.copy_to_output,
        bundle: (!args.no_bundle).then_some(BundleOptions {
            minify: args.uglify,
            watch: args.watch,
        }),
    };
    if options.bundle.is_some() {
        runtime.progress("Generating project files and webpacking")?;
    } else {
        runtime.progress("Generating project files")?;
    }

    let mut report = ProjectRoot::new(root).pack(&options).await?;

    for skipped in &report.skipped {
        runtime.warn(&format!("Skipped function {}: {}", skipped.name, skipped.reason))?;
        if skipped.packed && !options.copy_to_output {
            runtime.indent("Restored its descriptor from the previous pack")?;
        }
    }
    for function in &report.functions {
        runtime.verbose_println(&format!("  {} -> {}", function.name, function.safe_name()))?;
    }
    runtime.success(&format!(
        "Packed {} functions into {}",
        report.functions.len(),
        report.host_file.display()
    ))?;

    if let Some(session) = report.watch.take() {
        watch(session, runtime).await?;
    }

    Ok(0)
}

async fn watch(mut session: WatchSession, runtime: &RuntimeConfig) -> Result<()> {
    runtime.output().println(WATCHING_MESSAGE)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                runtime.progress("Stopping webpack")?;
                break;
            }
            build = session.next_build() => match build {
                Some(build) if build.success => runtime.output().println("Webpack compiled successfully.")?,
                Some(build) => runtime.warn(&format!("Webpack compilation failed:\n{}", build.diagnostics))?,
                None => {
                    runtime.warn("Webpack exited; no longer watching")?;
                    break;
                }
            }
        }
    }

    session.stop().await;
    Ok(())
}
