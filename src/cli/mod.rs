//! Command line interface for funcpack.
//!
//! Parses arguments, runs the pack or unpack flow and reports the outcome on
//! the terminal.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, PackArgs, RuntimeConfig, UnpackArgs};
pub use output::OutputManager;

use crate::error::{CliError, Result};

/// Main CLI entry point. Returns the process exit code.
pub async fn run(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;
    let runtime = RuntimeConfig::from(&args);

    match &args.command {
        Command::Pack(pack) => commands::pack::execute(pack, &runtime).await,
        Command::Unpack(unpack) => commands::unpack::execute(unpack, &runtime).await,
    }
}
