//! E2E tests for `typesync generate`

use std::fs;
use std::process::Command;
use tempfile::tempdir;

mod common;

#[test]
fn generate_writes_snapshot_and_types() {
    let temp = tempdir().unwrap();
    common::setup_project(temp.path());

    let output = Command::new(env!("CARGO_BIN_EXE_typesync"))
        .arg("generate")
        .current_dir(temp.path())
        .output()
        .expect("Failed to run typesync generate");

    assert!(output.status.success(), "generate should succeed");

    let snapshot = temp.path().join(".cache/typesync/schema.json");
    assert!(snapshot.exists(), "snapshot should be written");
    let snapshot_content = fs::read_to_string(&snapshot).unwrap();
    assert!(snapshot_content.contains("sdl"));

    let types = temp.path().join("src/__generated__/types.d.ts");
    assert!(types.exists(), "type definitions should be written");
    let types_content = fs::read_to_string(&types).unwrap();
    assert!(types_content.contains("export type PageQueryQuery"));
}

#[test]
fn generate_json_reports_summary() {
    let temp = tempdir().unwrap();
    common::setup_project(temp.path());

    let output = Command::new(env!("CARGO_BIN_EXE_typesync"))
        .arg("--json")
        .arg("generate")
        .current_dir(temp.path())
        .output()
        .expect("Failed to run typesync generate");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"event\":\"generate\""));
    assert!(stdout.contains("\"operations\":1"));
    assert!(stdout.contains("\"snapshot_written\":true"));
}

#[test]
fn generate_is_hash_gated_across_runs_in_one_process_only() {
    // A fresh process has no stored digest, so a second run rewrites the
    // snapshot; content is identical either way.
    let temp = tempdir().unwrap();
    common::setup_project(temp.path());

    for _ in 0..2 {
        let output = Command::new(env!("CARGO_BIN_EXE_typesync"))
            .arg("generate")
            .current_dir(temp.path())
            .output()
            .expect("Failed to run typesync generate");
        assert!(output.status.success());
    }

    let types = fs::read_to_string(temp.path().join("src/__generated__/types.d.ts")).unwrap();
    assert!(types.contains("export type PageQueryQuery"));
}

#[test]
fn generate_fails_without_schema() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_typesync"))
        .arg("generate")
        .current_dir(temp.path())
        .output()
        .expect("Failed to run typesync generate");

    assert!(!output.status.success(), "missing schema must be fatal");
}

#[test]
fn generate_continues_past_broken_documents() {
    let temp = tempdir().unwrap();
    common::setup_project(temp.path());
    fs::write(
        temp.path().join("src/broken.tsx"),
        "const q = graphql`query Broken { f ",
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_typesync"))
        .arg("generate")
        .current_dir(temp.path())
        .output()
        .expect("Failed to run typesync generate");

    assert!(output.status.success(), "one broken file must not be fatal");
    let types = fs::read_to_string(temp.path().join("src/__generated__/types.d.ts")).unwrap();
    assert!(types.contains("export type PageQueryQuery"));
}
