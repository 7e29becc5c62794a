//! Pack and unpack engine for serverless function apps.
//!
//! A function app is a directory with one subdirectory per function, each
//! holding a `function.json` descriptor. Packing generates a single module that
//! re-exports every handler, bundles it with webpack and points each descriptor
//! at the bundle. Unpacking restores the descriptors exactly.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod discovery;
pub mod error;
pub mod metadata;
pub mod packhost;
pub mod patcher;
pub mod project;
pub mod utils;

// Re-export commonly used types
pub use error::{CliError, FuncpackError, Result};
pub use project::{BundleOptions, PackOptions, PackReport, ProjectRoot, UnpackReport};
