//! Command line argument parsing and validation.

use crate::packhost::DEFAULT_OUTPUT_DIR;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Packs a function app into a single bundled entry point
#[derive(Parser, Debug)]
#[command(
    name = "funcpack",
    version,
    about = "Packs a function app into a single bundled entry point",
    long_about = "Generates one module that re-exports every function's handler, bundles it with \
webpack and points each function.json at the bundle. `unpack` restores the original descriptors.

Usage:
  funcpack pack .
  funcpack pack ./app --uglify --output build/pack
  funcpack unpack ./app"
)]
pub struct Args {
    /// Emit debug messages
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pack the function app at PATH
    Pack(PackArgs),
    /// Remove all traces of packing from the function app at PATH
    Unpack(UnpackArgs),
}

#[derive(clap::Args, Debug)]
pub struct PackArgs {
    /// Function app root
    #[arg(default_value = ".", value_name = "PATH")]
    pub path: PathBuf,

    /// Output directory, relative to the function app root
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, value_name = "DIR")]
    pub output: String,

    /// Minify the bundle
    #[arg(short, long)]
    pub uglify: bool,

    /// Write packed function.json files into the output directory and leave the
    /// originals untouched
    #[arg(short, long)]
    pub copy_to_output: bool,

    /// Keep webpack running and rebuild on changes
    #[arg(short, long)]
    pub watch: bool,

    /// Skip webpack; function.json files point at the generated module
    #[arg(long, conflicts_with_all = ["watch", "uglify"])]
    pub no_bundle: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnpackArgs {
    /// Function app root
    #[arg(default_value = ".", value_name = "PATH")]
    pub path: PathBuf,

    /// Output directory, relative to the function app root
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, value_name = "DIR")]
    pub output: String,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        let output = match &self.command {
            Command::Pack(args) => &args.output,
            Command::Unpack(args) => &args.output,
        };
        if output.trim().is_empty() {
            return Err("Output directory cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.debug),
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print verbose message if in debug mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}
