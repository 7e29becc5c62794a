//! funcpack - packs a directory of serverless functions into one bundled entry
//! point and restores it again.

use env_logger::{Builder, Env};
use funcpack::cli::{self, Args};
use std::process;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();

    // RUST_LOG wins over --debug
    let default_level = if args.debug { "debug" } else { "warn" };
    Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let exit_code = match cli::run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_configuration() { 2 } else { 1 }
        }
    };

    process::exit(exit_code);
}
