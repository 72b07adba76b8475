use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn writes_a_pixmap_of_the_final_frame() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("frame.ppm");

    Command::cargo_bin("mandelview")
        .unwrap()
        .args(&["-s", "64x48", "-b", "tiled:3", "-o"])
        .arg(&output)
        .args(&["-c", "zoom-in; zoom-in; move:5,-3; left; zoom-out"])
        .assert()
        .success();

    let written = fs::read(&output).unwrap();
    assert!(written.starts_with(b"P6"));
    assert!(written.len() > 64 * 48 * 3);
}

#[test]
fn sequential_and_tiled_agree() {
    let dir = tempdir().unwrap();
    let mut frames = Vec::new();
    for backend in &["sequential", "tiled"] {
        let output = dir.path().join(format!("{}.ppm", backend));
        Command::cargo_bin("mandelview")
            .unwrap()
            .args(&["-s", "40x30", "-t", "2", "--no-incremental", "-b", *backend, "-o"])
            .arg(&output)
            .args(&["-c", "zoom-in;down"])
            .assert()
            .success();
        frames.push(fs::read(&output).unwrap());
    }
    assert_eq!(frames[0], frames[1]);
}

#[test]
fn rejects_unknown_commands() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("mandelview")
        .unwrap()
        .arg("-o")
        .arg(dir.path().join("never.ppm"))
        .args(&["-c", "zoom-in;spin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown command: spin"));
}

#[test]
fn reports_a_missing_accelerator() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("never.ppm");
    Command::cargo_bin("mandelview")
        .unwrap()
        .args(&["-s", "16x16", "-b", "accelerator", "-o"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render failure"));
    assert!(!output.exists());
}

#[test]
fn rejects_an_empty_view() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("mandelview")
        .unwrap()
        .args(&["-s", "0x10", "-o"])
        .arg(dir.path().join("never.ppm"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("View size must not be empty"));
}
