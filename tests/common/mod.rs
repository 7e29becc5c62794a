//! Shared helpers for integration tests.
//!
//! `FunctionApp` is a throwaway function app directory with helpers to lay out
//! functions and read descriptors back as text.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// `{"scriptFile": "index.js", "bindings": [...]}` in canonical form.
pub const HTTP_INDEX_DESCRIPTOR: &str = "{\n \"scriptFile\": \"index.js\",\n \"bindings\": [\n  {\n   \"type\": \"httpTrigger\",\n   \"name\": \"req\"\n  }\n ]\n}";

/// `{"scriptFile": "handler.js", "entryPoint": "run", ...}` in canonical form.
pub const HANDLER_RUN_DESCRIPTOR: &str = "{\n \"disabled\": false,\n \"scriptFile\": \"handler.js\",\n \"entryPoint\": \"run\",\n \"bindings\": []\n}";

pub struct FunctionApp {
    dir: TempDir,
}

impl FunctionApp {
    pub fn new() -> Self {
        let app = Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        };
        app.write("host.json", "{ \"version\": \"2.0\" }");
        app
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, contents).expect("write file");
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("read {relative}: {e}"))
    }

    /// Creates `<name>/function.json` plus empty script files.
    pub fn function(&self, name: &str, descriptor: &str, scripts: &[&str]) {
        self.write(&format!("{name}/function.json"), descriptor);
        for script in scripts {
            self.write(&format!("{name}/{script}"), "module.exports = () => {};\n");
        }
    }

    pub fn descriptor(&self, name: &str) -> String {
        self.read(&format!("{name}/function.json"))
    }

    pub fn descriptor_json(&self, name: &str) -> serde_json::Value {
        serde_json::from_str(&self.descriptor(name)).expect("descriptor is JSON")
    }

    /// The two-function app used across the scenario tests.
    pub fn with_two_functions() -> Self {
        let app = Self::new();
        app.function("funcA", HTTP_INDEX_DESCRIPTOR, &["index.js"]);
        app.function("funcB", HANDLER_RUN_DESCRIPTOR, &["handler.js"]);
        app
    }
}
