//! Bundle invoker.
//!
//! Hands the generated module to webpack and reports when a complete,
//! error-free build has finished:
//!
//! - [`BundleSettings`] describes one invocation (entry, externals, output,
//!   minification, watch mode and an optional user config module)
//! - [`WebpackRunner`] renders a node driver script from those settings, runs
//!   it and reads the build events it prints
//! - [`WatchSession`] keeps a watching bundler alive and streams rebuilds

pub mod error;
mod events;
mod runner;
mod settings;
mod template;
mod tool_detection;

pub use error::{Error, Result};
pub use events::{BuildEvent, EVENT_MARKER, parse_event};
pub use runner::{BundleOutcome, WatchSession, WebpackRunner};
pub use settings::{
    BundleSettings, BundleSettingsBuilder, ConfigTransform, externals_map, resolve_in,
};
pub use template::{DRIVER_FILE_NAME, render_driver};
pub use tool_detection::node_path;
