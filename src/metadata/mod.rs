//! Metadata store access.
//!
//! Each function directory holds a `function.json` descriptor telling the
//! function host which script and export implement the handler. This module
//! reads and writes those descriptors, enumerates candidate directories and
//! loads the optional project config file.

mod config;
mod descriptor;
mod store;

pub use config::{CONFIG_FILE_NAME, FuncpackConfig};
pub use descriptor::{
    ENTRY_POINT, FunctionDescriptor, ORIGINAL_ENTRY_POINT, ORIGINAL_SCRIPT_FILE, SCRIPT_FILE,
    Shadow,
};
pub use store::{
    DESCRIPTOR_FILE_NAME, descriptor_path, has_descriptor, list_subdirectories, parse_descriptor,
    read_descriptor, to_canonical_json, write_descriptor,
};
