use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures").join(name)
}

fn cli(data_dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("areaclone-cli");
    cmd.env("AREACLONE_DATA_DIR", data_dir).env_remove("RUST_LOG");
    cmd
}

fn read_session(path: &Path) -> Value {
    let bytes = std::fs::read(path).expect("session file should exist");
    serde_json::from_slice(&bytes).expect("session file should contain valid json")
}

#[test]
fn version_prints_package_version() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cli(temp.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn lines_output_is_stable() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let output = cli(temp.path())
        .arg("lines")
        .arg(fixture("invoice.json"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).expect("stdout should be utf-8");
    insta::assert_snapshot!("cli_lines_invoice", stdout);
}

#[test]
fn clone_heading_writes_grouped_item() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let session_path = temp.path().join("work/session.json");

    cli(temp.path())
        .arg("clone")
        .arg(fixture("invoice.json"))
        .args(["--rect", "60,50,200,40"])
        .arg("--session")
        .arg(&session_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cloned 1 block(s)."));

    let envelope = read_session(&session_path);
    assert_eq!(envelope["version"], 1);

    let session = &envelope["session"];
    let item = &session["items"][0];
    assert_eq!(item["type"], "text");
    assert_eq!(item["text"], "ACME Corporation");
    assert_eq!(item["font"], "Helvetica-Bold");
    assert_eq!(item["colorHex"], "#1565c0");
    assert_eq!(item["fauxBold"], 1);
    assert_eq!(item["size"].as_f64(), Some(18.0));

    let group = &session["groups"][0];
    assert_eq!(group["children"][0]["itemRef"], item["id"]);
    assert_eq!(session["selection"]["kind"], "group");
    assert_eq!(session["selection"]["id"], group["id"]);
}

#[test]
fn clone_paragraph_keeps_line_breaks() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cli(temp.path())
        .arg("clone")
        .arg(fixture("invoice.json"))
        .args(["--rect", "60,135,200,50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cloned 1 block(s)."));

    let envelope = read_session(&temp.path().join("session.json"));
    let item = &envelope["session"]["items"][0];
    assert_eq!(item["text"], "Thank you for your business.\nPayment is due within\nthirty days.");
    assert_eq!(item["lineHeight"].as_f64(), Some(12.0));
    assert_eq!(item["colorHex"], "#222222");
}

#[test]
fn clone_accepts_pixel_rect_at_scale() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cli(temp.path())
        .arg("clone")
        .arg(fixture("invoice.json"))
        .args(["--rect", "120,430,320,40", "--px", "--scale", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cloned 1 block(s)."));

    let envelope = read_session(&temp.path().join("session.json"));
    let item = &envelope["session"]["items"][0];
    assert_eq!(item["text"], "Total due: $1,250.00");
    assert_eq!(item["font"], "Courier-Bold");
    assert_eq!(item["colorHex"], "#c62828");
}

#[test]
fn clone_over_blank_area_reports_nothing_found() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cli(temp.path())
        .arg("clone")
        .arg(fixture("invoice.json"))
        .args(["--rect", "300,400,100,100"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("No text found in selection."));

    assert!(!temp.path().join("session.json").exists(), "session should not be written");
}

#[test]
fn clone_rejects_tiny_marquee() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cli(temp.path())
        .arg("clone")
        .arg(fixture("invoice.json"))
        .args(["--rect", "72,60,3,3", "--px"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Selection too small."));
}

#[test]
fn eyedrop_reports_style_and_updates_session() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let session_path = temp.path().join("session.json");

    let output = cli(temp.path())
        .arg("eyedrop")
        .arg(fixture("invoice.json"))
        .args(["--at", "144,227"])
        .arg("--session")
        .arg(&session_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let pick: Value = serde_json::from_slice(&output).expect("stdout should contain valid json");
    assert_eq!(pick["font"], "Courier-Bold");
    assert_eq!(pick["size"].as_f64(), Some(12.0));
    assert_eq!(pick["color"], "#c62828");

    let envelope = read_session(&session_path);
    assert_eq!(envelope["session"]["text_style"]["font"], "Courier-Bold");
    assert_eq!(envelope["session"]["tool"], "Place");
}

#[test]
fn export_lists_cloned_items() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cli(temp.path())
        .arg("clone")
        .arg(fixture("invoice.json"))
        .args(["--rect", "60,50,200,40"])
        .assert()
        .success();

    let output =
        cli(temp.path()).arg("export").assert().success().get_output().stdout.clone();

    let edits: Value = serde_json::from_slice(&output).expect("stdout should contain valid json");
    let edits = edits.as_array().expect("export should be a json array");
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0]["type"], "text");
    assert_eq!(edits[0]["font"], "Helvetica-Bold");
    assert_eq!(edits[0]["color"].as_array().map(Vec::len), Some(3));
}

#[test]
fn lines_on_empty_page_reports_nothing_found() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cli(temp.path())
        .arg("lines")
        .arg(fixture("invoice.json"))
        .args(["--page", "2"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("No text on page 2."));
}

#[test]
fn clone_fails_for_missing_capture() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cli(temp.path())
        .arg("clone")
        .arg(fixture("missing.json"))
        .args(["--rect", "0,0,10,10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn clone_fails_for_invalid_capture() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cli(temp.path())
        .arg("clone")
        .arg(fixture("invalid.json"))
        .args(["--rect", "0,0,10,10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open capture"));
}

#[test]
fn clone_fails_for_page_out_of_range() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cli(temp.path())
        .arg("clone")
        .arg(fixture("invoice.json"))
        .args(["--page", "9", "--rect", "0,0,10,10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("page 9 out of range"));
}
