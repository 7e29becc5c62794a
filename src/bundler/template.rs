//! Driver script generation.
//!
//! The driver is a small node program that loads webpack from the project's
//! `node_modules`, builds the configuration from the serialized
//! [`BundleSettings`], and prints one event line per finished compilation.

use super::error::{Error, ErrorExt, Result};
use super::events::EVENT_MARKER;
use super::settings::BundleSettings;
use handlebars::Handlebars;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name of the driver script inside the output directory.
pub const DRIVER_FILE_NAME: &str = "funcpack.webpack.js";

const DRIVER_TEMPLATE: &str = r#"// Generated by funcpack.
"use strict";

const path = require("path");

const MARKER = {{marker}};
const settings = {{settings}};

function report(success, diagnostics) {
    process.stdout.write(MARKER + JSON.stringify({ event: "build", success, diagnostics }) + "\n");
}

function describe(err, stats) {
    if (err) {
        return String((err && err.stack) || err);
    }
    return stats.toString({ all: false, errors: true, errorDetails: true, colors: false });
}

let webpack;
try {
    webpack = require(require.resolve("webpack", { paths: [process.cwd()] }));
} catch (e) {
    report(false, "Could not load webpack from " + process.cwd() + ": " + e.message);
    process.exit(1);
}

let config = {
    entry: settings.entry,
    externals: settings.externals,
    mode: settings.minify ? "production" : "none",
    optimization: { minimize: settings.minify },
    target: "node",
    node: {
        __dirname: false,
        __filename: false,
    },
    output: {
        path: settings.outputPath,
        filename: settings.outputFilename,
        library: "index",
        libraryTarget: "commonjs2",
    },
    watchOptions: {
        ignored: [path.join(settings.outputPath, settings.outputFilename)],
    },
};
{{#if edit_config}}

try {
    config = require({{edit_config}})(config, webpack);
} catch (e) {
    report(false, "Could not apply customize function: " + ((e && e.stack) || e));
    process.exit(1);
}
{{/if}}

const compiler = webpack(config);

function finished(err, stats) {
    const failed = Boolean(err) || stats.hasErrors();
    report(!failed, failed ? describe(err, stats) : "");
    return failed;
}

if (settings.watch) {
    compiler.watch({}, finished);
} else {
    compiler.run((err, stats) => {
        const failed = finished(err, stats);
        const exit = () => process.exit(failed ? 1 : 0);
        if (typeof compiler.close === "function") {
            compiler.close(exit);
        } else {
            exit();
        }
    });
}
"#;

/// Renders the driver script for the settings.
pub fn render_driver(settings: &BundleSettings) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    let mut data = BTreeMap::new();
    data.insert("marker", serde_json::to_string(EVENT_MARKER)?);
    data.insert("settings", serde_json::to_string(settings)?);
    if let Some(edit_config) = &settings.edit_config {
        data.insert("edit_config", serde_json::to_string(edit_config)?);
    }

    handlebars
        .register_template_string(DRIVER_FILE_NAME, DRIVER_TEMPLATE)
        .map_err(|e| Error::Template(format!("failed to register driver template: {}", e)))?;

    handlebars
        .render(DRIVER_FILE_NAME, &data)
        .map_err(|e| Error::Template(format!("failed to render driver template: {}", e)))
}

/// Writes the driver script into `dir` and returns its path.
pub async fn write_driver(settings: &BundleSettings, dir: &Path) -> Result<PathBuf> {
    let script = render_driver(settings)?;
    let path = dir.join(DRIVER_FILE_NAME);
    tokio::fs::write(&path, script)
        .await
        .fs_context("writing driver script", &path)?;
    log::debug!("Wrote driver script: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(edit_config: Option<&str>) -> BundleSettings {
        BundleSettings::builder()
            .entry("/app/.funcpack/index.gen.js")
            .output_path("/app/.funcpack")
            .output_filename("index.js")
            .externals(&["Sharp"])
            .edit_config(edit_config.map(PathBuf::from))
            .build()
            .unwrap()
    }

    #[test]
    fn embeds_settings_as_json() {
        let script = render_driver(&settings(None)).unwrap();

        assert!(script.contains(r#"const MARKER = "@@funcpack ";"#), "{script}");
        assert!(script.contains(r#""entry":"/app/.funcpack/index.gen.js""#));
        assert!(script.contains(r#""outputFilename":"index.js""#));
        assert!(script.contains(r#""externals":{"sharp":"Sharp"}"#));
        assert!(!script.contains("customize function"));
    }

    #[test]
    fn includes_the_user_transform_when_configured() {
        let script = render_driver(&settings(Some("/app/tools/edit.js"))).unwrap();
        assert!(script.contains(r#"config = require("/app/tools/edit.js")(config, webpack);"#));
    }

    #[tokio::test]
    async fn writes_next_to_the_bundle() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_driver(&settings(None), temp.path()).await.unwrap();
        assert_eq!(path, temp.path().join(DRIVER_FILE_NAME));
        assert!(path.is_file());
    }
}
