//! Pack and unpack flows without the bundler.

mod common;

use common::{FunctionApp, HANDLER_RUN_DESCRIPTOR, HTTP_INDEX_DESCRIPTOR};
use funcpack::discovery::SkipReason;
use funcpack::{FuncpackError, PackOptions, ProjectRoot};
use serde_json::json;

fn unbundled() -> PackOptions {
    PackOptions {
        bundle: None,
        ..PackOptions::default()
    }
}

#[tokio::test]
async fn two_function_scenario_packs_and_unpacks_exactly() {
    let app = FunctionApp::with_two_functions();
    let project = ProjectRoot::new(app.root());

    let report = project.pack(&unbundled()).await.unwrap();

    assert_eq!(report.functions.len(), 2);
    assert_eq!(report.patched.len(), 2);
    assert_eq!(
        app.read(".funcpack/index.js"),
        "module.exports = {\n    \"funcA\": require(\"../funcA/index.js\"),\n    \"funcB\": require(\"../funcB/handler.js\").run\n}"
    );

    let func_a = app.descriptor_json("funcA");
    assert_eq!(func_a["scriptFile"], "../.funcpack/index.js");
    assert_eq!(func_a["entryPoint"], "funcA");
    assert_eq!(func_a["_originalScriptFile"], "index.js");
    assert_eq!(func_a["_originalEntryPoint"], false);
    assert_eq!(func_a["bindings"][0]["type"], "httpTrigger");

    let func_b = app.descriptor_json("funcB");
    assert_eq!(func_b["entryPoint"], "funcB");
    assert_eq!(func_b["_originalEntryPoint"], "run");

    let unpacked = project.unpack(".funcpack").await.unwrap();

    assert_eq!(unpacked.restored.len(), 2);
    assert_eq!(app.descriptor("funcA"), HTTP_INDEX_DESCRIPTOR);
    assert_eq!(app.descriptor("funcB"), HANDLER_RUN_DESCRIPTOR);
    assert!(!app.path(".funcpack").exists());
}

#[tokio::test]
async fn packing_twice_matches_packing_once() {
    let app = FunctionApp::with_two_functions();
    let project = ProjectRoot::new(app.root());

    project.pack(&unbundled()).await.unwrap();
    let once = (app.descriptor("funcA"), app.descriptor("funcB"), app.read(".funcpack/index.js"));

    project.pack(&unbundled()).await.unwrap();
    let twice = (app.descriptor("funcA"), app.descriptor("funcB"), app.read(".funcpack/index.js"));

    assert_eq!(once, twice);
}

#[tokio::test]
async fn pack_unpack_pack_matches_pack() {
    let app = FunctionApp::with_two_functions();
    let project = ProjectRoot::new(app.root());

    project.pack(&unbundled()).await.unwrap();
    let packed = app.descriptor("funcB");

    project.unpack(".funcpack").await.unwrap();
    project.pack(&unbundled()).await.unwrap();

    assert_eq!(app.descriptor("funcB"), packed);
}

#[tokio::test]
async fn inferred_script_is_removed_again_on_unpack() {
    let app = FunctionApp::new();
    let original = "{\n \"bindings\": []\n}";
    app.function("timer-job", original, &["main.js"]);
    let project = ProjectRoot::new(app.root());

    project.pack(&unbundled()).await.unwrap();

    assert!(app
        .read(".funcpack/index.js")
        .contains("\"timer$dashjob\": require(\"../timer-job/main.js\")"));
    let packed = app.descriptor_json("timer-job");
    assert_eq!(packed["_originalScriptFile"], false);
    assert_eq!(packed["entryPoint"], "timer$dashjob");

    project.unpack(".funcpack").await.unwrap();

    assert_eq!(app.descriptor("timer-job"), original);
}

#[tokio::test]
async fn empty_entry_point_survives_a_cycle() {
    let app = FunctionApp::new();
    let original = "{\n \"scriptFile\": \"index.js\",\n \"entryPoint\": \"\"\n}";
    app.function("fn", original, &["index.js"]);
    let project = ProjectRoot::new(app.root());

    project.pack(&unbundled()).await.unwrap();
    assert_eq!(app.descriptor_json("fn")["_originalEntryPoint"], "");
    assert!(app.read(".funcpack/index.js").ends_with("require(\"../fn/index.js\")\n}"));

    project.unpack(".funcpack").await.unwrap();
    assert_eq!(app.descriptor("fn"), original);
}

#[tokio::test]
async fn skipped_functions_are_left_alone() {
    let app = FunctionApp::with_two_functions();
    let typescript = "{\n \"scriptFile\": \"index.ts\"\n}";
    let ambiguous = "{\n \"bindings\": []\n}";
    app.function("typed", typescript, &["index.ts"]);
    app.function("ambiguous", ambiguous, &["a.js", "b.js"]);
    let project = ProjectRoot::new(app.root());

    let report = project.pack(&unbundled()).await.unwrap();

    let skipped: Vec<_> = report
        .skipped
        .iter()
        .map(|s| (s.name.as_str(), s.reason))
        .collect();
    assert_eq!(
        skipped,
        [
            ("ambiguous", SkipReason::AmbiguousStartFile),
            ("typed", SkipReason::NonScriptFile)
        ]
    );
    assert_eq!(app.descriptor("typed"), typescript);
    assert_eq!(app.descriptor("ambiguous"), ambiguous);
    let host = app.read(".funcpack/index.js");
    assert!(!host.contains("typed") && !host.contains("ambiguous"), "{host}");
}

#[tokio::test]
async fn copy_mode_writes_a_runnable_output_directory() {
    let app = FunctionApp::with_two_functions();
    let project = ProjectRoot::new(app.root());
    let options = PackOptions {
        copy_to_output: true,
        ..unbundled()
    };

    let report = project.pack(&options).await.unwrap();

    assert_eq!(report.patched.len(), 2);
    assert_eq!(app.descriptor("funcA"), HTTP_INDEX_DESCRIPTOR);
    let copied: serde_json::Value =
        serde_json::from_str(&app.read(".funcpack/funcA/function.json")).unwrap();
    assert_eq!(copied["scriptFile"], "../index.js");
    assert_eq!(copied["entryPoint"], "funcA");
    assert_eq!(app.read(".funcpack/host.json"), app.read("host.json"));
}

#[tokio::test]
async fn nested_output_directory() {
    let app = FunctionApp::with_two_functions();
    let project = ProjectRoot::new(app.root());
    let options = PackOptions {
        output_dir: "build/pack".to_string(),
        ..unbundled()
    };

    project.pack(&options).await.unwrap();

    assert!(app
        .read("build/pack/index.js")
        .contains("require(\"../../funcA/index.js\")"));
    assert_eq!(app.descriptor_json("funcA")["scriptFile"], "../build/pack/index.js");

    project.unpack("build/pack").await.unwrap();
    assert_eq!(app.descriptor("funcA"), HTTP_INDEX_DESCRIPTOR);
    assert!(!app.path("build/pack").exists());
}

#[tokio::test]
async fn unpack_leaves_unpacked_descriptors_untouched() {
    let app = FunctionApp::new();
    let hand_written = "{\"scriptFile\":\"index.js\",   \"bindings\":[]}";
    app.function("plain", hand_written, &["index.js"]);

    let report = ProjectRoot::new(app.root()).unpack(".funcpack").await.unwrap();

    assert!(report.restored.is_empty());
    assert_eq!(app.descriptor("plain"), hand_written);
}

#[tokio::test]
async fn running_inside_a_function_is_a_configuration_error() {
    let app = FunctionApp::new();
    app.function("funcA", HTTP_INDEX_DESCRIPTOR, &["index.js"]);
    let inside = ProjectRoot::new(app.path("funcA"));

    let pack = inside.pack(&unbundled()).await.unwrap_err();
    let unpack = inside.unpack(".funcpack").await.unwrap_err();

    assert!(pack.is_configuration(), "{pack}");
    assert!(unpack.is_configuration(), "{unpack}");
    assert_eq!(app.descriptor("funcA"), HTTP_INDEX_DESCRIPTOR);
}

#[tokio::test]
async fn output_outside_the_project_is_rejected() {
    let app = FunctionApp::with_two_functions();
    let options = PackOptions {
        output_dir: "../elsewhere".to_string(),
        ..unbundled()
    };

    let err = ProjectRoot::new(app.root()).pack(&options).await.unwrap_err();

    assert!(matches!(err, FuncpackError::Config { .. }), "{err}");
    assert_eq!(app.descriptor("funcA"), HTTP_INDEX_DESCRIPTOR);
}

#[tokio::test]
async fn malformed_shadow_fails_before_any_write() {
    let app = FunctionApp::with_two_functions();
    app.function(
        "broken",
        &json!({ "scriptFile": "index.js", "_originalEntryPoint": 42 }).to_string(),
        &["index.js"],
    );

    let err = ProjectRoot::new(app.root())
        .pack(&unbundled())
        .await
        .unwrap_err();

    assert!(matches!(err, FuncpackError::Descriptor { .. }), "{err}");
    assert_eq!(app.descriptor("funcA"), HTTP_INDEX_DESCRIPTOR);
    assert!(!app.path(".funcpack").exists());
}

#[tokio::test]
async fn repack_unpacks_a_function_that_became_ambiguous() {
    let app = FunctionApp::with_two_functions();
    let original = "{\n \"bindings\": []\n}";
    app.function("timer", original, &["main.js"]);
    let project = ProjectRoot::new(app.root());

    project.pack(&unbundled()).await.unwrap();
    assert_eq!(app.descriptor_json("timer")["entryPoint"], "timer");

    app.write("timer/helper.js", "module.exports = {};\n");
    let report = project.pack(&unbundled()).await.unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].packed);
    assert_eq!(report.skipped[0].reason, SkipReason::AmbiguousStartFile);
    assert!(!app.read(".funcpack/index.js").contains("\"timer\""));
    assert_eq!(app.descriptor("timer"), original);
    assert_eq!(app.descriptor_json("funcA")["entryPoint"], "funcA");
}

#[tokio::test]
async fn non_string_entry_point_is_skipped_and_kept() {
    let app = FunctionApp::with_two_functions();
    let original = "{\n \"scriptFile\": \"index.js\",\n \"entryPoint\": false\n}";
    app.function("flagged", original, &["index.js"]);
    let project = ProjectRoot::new(app.root());

    let report = project.pack(&unbundled()).await.unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::NonStringEntryPoint);
    assert_eq!(app.descriptor("flagged"), original);

    project.unpack(".funcpack").await.unwrap();
    assert_eq!(app.descriptor("flagged"), original);
}
