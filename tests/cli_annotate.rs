//! E2E tests for `typesync annotate`

use std::fs;
use std::process::Command;
use tempfile::tempdir;

mod common;

#[test]
fn annotate_rewrites_call_sites() {
    let temp = tempdir().unwrap();
    common::setup_project(temp.path());

    let output = Command::new(env!("CARGO_BIN_EXE_typesync"))
        .arg("annotate")
        .current_dir(temp.path())
        .output()
        .expect("Failed to run typesync annotate");

    assert!(output.status.success());

    let content = fs::read_to_string(temp.path().join("src/pages/index.tsx")).unwrap();
    assert!(content.contains("useStaticQuery<PageQueryQuery>(graphql`"));
    // template body untouched
    assert!(content.contains("query PageQuery { site { title } }"));
}

#[test]
fn annotate_twice_is_stable() {
    let temp = tempdir().unwrap();
    common::setup_project(temp.path());

    for _ in 0..2 {
        let output = Command::new(env!("CARGO_BIN_EXE_typesync"))
            .arg("annotate")
            .current_dir(temp.path())
            .output()
            .expect("Failed to run typesync annotate");
        assert!(output.status.success());
    }

    let content = fs::read_to_string(temp.path().join("src/pages/index.tsx")).unwrap();
    // exactly one injected type argument
    assert_eq!(content.matches("PageQueryQuery").count(), 1);
}

#[test]
fn annotate_dry_run_does_not_write() {
    let temp = tempdir().unwrap();
    common::setup_project(temp.path());
    let before = fs::read_to_string(temp.path().join("src/pages/index.tsx")).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_typesync"))
        .arg("--json")
        .arg("annotate")
        .arg("--dry-run")
        .current_dir(temp.path())
        .output()
        .expect("Failed to run typesync annotate");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"dry_run\":true"));
    assert!(stdout.contains("\"injected\":1"));

    let after = fs::read_to_string(temp.path().join("src/pages/index.tsx")).unwrap();
    assert_eq!(before, after, "dry run must not modify sources");
}

#[test]
fn annotate_skips_anonymous_queries() {
    let temp = tempdir().unwrap();
    common::setup_project(temp.path());
    let anon = temp.path().join("src/anon.tsx");
    fs::write(
        &anon,
        "const data = useStaticQuery(graphql`query { site { title } }`);\n",
    )
    .unwrap();
    let before = fs::read_to_string(&anon).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_typesync"))
        .arg("annotate")
        .current_dir(temp.path())
        .output()
        .expect("Failed to run typesync annotate");

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&anon).unwrap(), before);
}

#[test]
fn annotate_component_shape() {
    let temp = tempdir().unwrap();
    common::setup_project(temp.path());
    let header = temp.path().join("src/header.tsx");
    fs::write(
        &header,
        "export const Header = () => (<StaticQuery query={graphql`query HeaderQuery { site { title } }`} render={data => null} />);\n",
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_typesync"))
        .arg("annotate")
        .current_dir(temp.path())
        .output()
        .expect("Failed to run typesync annotate");

    assert!(output.status.success());
    let content = fs::read_to_string(&header).unwrap();
    assert!(content.contains("<StaticQuery<HeaderQueryQuery> query={graphql`"));
}
