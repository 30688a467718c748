//! CLI smoke tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn sdfanim() -> Command {
    Command::cargo_bin("sdfanim").unwrap()
}

fn write_demo(dir: &TempDir, extra: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join("arm.anim");
    sdfanim()
        .arg("demo")
        .arg(&path)
        .args(extra)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to"));
    path
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_help() {
    sdfanim()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"))
        .stdout(predicate::str::contains("play"));
}

#[test]
fn test_demo_then_info() {
    let dir = TempDir::new().unwrap();
    let path = write_demo(&dir, &["--joints", "3", "--keyframes", "2", "--loop"]);

    sdfanim()
        .args(["info", path_arg(&path)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Objects: 1"))
        .stdout(predicate::str::contains("Joints:     3"))
        .stdout(predicate::str::contains("Keyframes:  4"))
        .stdout(predicate::str::contains("Looping:    true"));
}

#[test]
fn test_info_json() {
    let dir = TempDir::new().unwrap();
    let path = write_demo(&dir, &["--duration", "1.5"]);

    let output = sdfanim()
        .args(["info", "--json", path_arg(&path)])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["joint_count"], 4);
    assert_eq!(json[0]["keyframe_count"], 5);
    assert_eq!(json[0]["duration"], 1.5);
    assert_eq!(json[0]["looping"], false);
    assert!(json[0].get("animation").is_none());
}

#[test]
fn test_tree() {
    let dir = TempDir::new().unwrap();
    let path = write_demo(&dir, &[]);

    sdfanim()
        .args(["tree", "--no-color", path_arg(&path)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Object 0"))
        .stdout(predicate::str::contains("Bind pose"))
        .stdout(predicate::str::contains("Keyframe 4"));
}

#[test]
fn test_play_finishes() {
    let dir = TempDir::new().unwrap();
    let path = write_demo(&dir, &["--duration", "0.5"]);

    sdfanim()
        .args(["play", path_arg(&path), "--steps", "20", "--delta", "0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Joint   0"))
        .stdout(predicate::str::contains("Finished after"));
}

#[test]
fn test_play_rejects_bad_object_index() {
    let dir = TempDir::new().unwrap();
    let path = write_demo(&dir, &[]);

    sdfanim()
        .args(["play", path_arg(&path), "--object", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_info_on_corrupt_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corrupt.anim");
    std::fs::write(&path, [1, 0, 0]).unwrap();

    sdfanim()
        .args(["info", path_arg(&path)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load animation objects"));
}

#[test]
fn test_completions() {
    sdfanim()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sdfanim"));
}
