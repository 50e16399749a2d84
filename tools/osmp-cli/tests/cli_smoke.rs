//! Integration tests for the osmp binary
//!
//! Builds a small instrument folder, then drives build -> inspect -> extract.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn osmp(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_osmp"))
        .args(args)
        .output()
        .expect("Failed to run osmp")
}

fn write_instrument(dir: &Path) {
    fs::create_dir_all(dir.join("samples")).unwrap();
    fs::write(dir.join("samples/a.wav"), b"abc").unwrap();
    fs::write(dir.join("metadata.yaml"), "name: Smoke\n").unwrap();
    fs::write(
        dir.join("mapping.yaml"),
        r#"
global:
  global_volume: 0.8
groups:
  - name: Piano
    regions:
      - sample: samples/a.wav
      - sample: missing.wav
"#,
    )
    .unwrap();
}

#[test]
fn test_build_inspect_extract() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("piano");
    write_instrument(&input);
    let container = dir.path().join("piano.osmp");

    let out = osmp(&[
        "build",
        input.to_str().unwrap(),
        container.to_str().unwrap(),
        "--key",
        "0x3F",
    ]);
    assert!(out.status.success(), "build failed: {:?}", out);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Created:"));
    assert!(stdout.contains("0x3F"));
    assert!(stdout.contains("Missing samples: 1"));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("missing.wav"), "expected a warning: {stderr}");
    assert!(container.exists());

    let out = osmp(&["inspect", container.to_str().unwrap()]);
    assert!(out.status.success(), "inspect failed: {:?}", out);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Piano (2 regions)"));
    assert!(stdout.contains("no sample"));

    let samples = dir.path().join("samples-out");
    let out = osmp(&[
        "extract",
        container.to_str().unwrap(),
        samples.to_str().unwrap(),
        "--key",
        "63",
    ]);
    assert!(out.status.success(), "extract failed: {:?}", out);
    assert_eq!(fs::read(samples.join("g0_r0.bin")).unwrap(), b"abc");
    assert!(!samples.join("g0_r1.bin").exists());
}

#[test]
fn test_extract_with_wrong_key_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("piano");
    write_instrument(&input);
    let container = dir.path().join("piano.osmp");

    let out = osmp(&["build", input.to_str().unwrap(), container.to_str().unwrap()]);
    assert!(out.status.success());

    let out = osmp(&[
        "extract",
        container.to_str().unwrap(),
        dir.path().join("x").to_str().unwrap(),
        "--key",
        "0x01",
    ]);
    assert!(!out.status.success());
}

#[test]
fn test_missing_documents_are_fatal() {
    let dir = tempdir().unwrap();
    let container = dir.path().join("out.osmp");

    let out = osmp(&["build", dir.path().to_str().unwrap(), container.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(!container.exists());
}

#[test]
fn test_key_out_of_range_is_rejected() {
    let dir = tempdir().unwrap();
    write_instrument(dir.path());
    let container = dir.path().join("out.osmp");

    let out = osmp(&[
        "build",
        dir.path().to_str().unwrap(),
        container.to_str().unwrap(),
        "--key",
        "0x100",
    ]);
    assert!(!out.status.success());
    assert!(!container.exists());
}

#[test]
fn test_build_without_subcommand() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("piano");
    write_instrument(&input);
    let container = dir.path().join("piano.osmp");

    let out = osmp(&[
        input.to_str().unwrap(),
        container.to_str().unwrap(),
        "--key",
        "0x3F",
    ]);
    assert!(out.status.success(), "build failed: {:?}", out);
    assert!(String::from_utf8_lossy(&out.stdout).contains("0x3F"));

    let samples = dir.path().join("samples-out");
    let out = osmp(&[
        "extract",
        container.to_str().unwrap(),
        samples.to_str().unwrap(),
        "--key",
        "0x3F",
    ]);
    assert!(out.status.success(), "extract failed: {:?}", out);
    assert_eq!(fs::read(samples.join("g0_r0.bin")).unwrap(), b"abc");
}

#[test]
fn test_positional_build_needs_both_paths() {
    let dir = tempdir().unwrap();
    write_instrument(dir.path());

    let out = osmp(&[dir.path().to_str().unwrap()]);
    assert!(!out.status.success());
}
