//! `osmp build`: instrument folder to container.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use flate2::Compression;
use osmp_core::{BuildError, BuildOptions, BuildReport};
use osmp_shared::OSMP_FORMAT;

use crate::key::parse_key;

/// Arguments for the build command
#[derive(Args)]
pub struct BuildArgs {
    /// Folder containing metadata.yaml, mapping.yaml and samples
    pub input_folder: PathBuf,

    /// Output .osmp file path
    pub output_file: PathBuf,

    /// XOR obfuscation key, decimal or 0x-hex (e.g. 0x3F or 123)
    #[arg(long, value_parser = parse_key, default_value_t = OSMP_FORMAT.default_key)]
    pub key: u8,

    /// zlib compression level (0-9)
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: u32,
}

/// Execute the build command
pub fn execute(args: BuildArgs) -> Result<()> {
    let options = BuildOptions {
        key: args.key,
        compression: Compression::new(args.level),
    };

    println!(
        "Packing instrument: {} -> {}",
        args.input_folder.display(),
        args.output_file.display()
    );

    let report = match osmp_core::build(&args.input_folder, &args.output_file, &options) {
        Ok(report) => report,
        Err(e) => {
            discard_failed_output(&e, &args.output_file);
            return Err(e).context("Build failed");
        }
    };

    print_summary(&report);
    Ok(())
}

/// Remove the output after a failure that may have left part of it on disk.
///
/// Failures that happen before the file is created leave any existing file alone.
fn discard_failed_output(err: &BuildError, path: &Path) {
    if err.touched_output() {
        remove_partial(path);
    }
}

/// Remove a partially written container so it cannot be mistaken for a good one
fn remove_partial(path: &Path) {
    if !path.exists() {
        return;
    }
    match std::fs::remove_file(path) {
        Ok(()) => tracing::info!("Removed partial output: {}", path.display()),
        Err(e) => tracing::warn!("Failed to remove partial output {}: {}", path.display(), e),
    }
}

fn print_summary(report: &BuildReport) {
    println!();
    println!(
        "Created: {} ({} bytes)",
        report.output_path.display(),
        report.container_bytes
    );
    println!("  Groups: {}", report.group_count);
    println!("  Regions: {}", report.region_count);
    println!("  Sample payload: {} bytes", report.payload_bytes);
    if !report.missing_samples.is_empty() {
        println!(
            "  Missing samples: {} (stored as empty payloads)",
            report.missing_samples.len()
        );
    }
    println!(
        "  Obfuscation key: 0x{:02X} (the engine needs this to read samples)",
        report.key
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::tempdir;

    #[test]
    fn test_write_failure_removes_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("piano.osmp");
        std::fs::write(&output, b"OSMP half written").unwrap();

        let err = BuildError::Write {
            path: output.clone(),
            source: io::Error::other("No space left on device"),
        };
        discard_failed_output(&err, &output);
        assert!(!output.exists());
    }

    #[test]
    fn test_early_failure_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("piano.osmp");
        std::fs::write(&output, b"previous build").unwrap();

        let err = BuildError::GroupNameTooLong {
            group: 0,
            len: 70_000,
        };
        discard_failed_output(&err, &output);
        assert_eq!(std::fs::read(&output).unwrap(), b"previous build");
    }

    #[test]
    fn test_remove_partial_ignores_absent_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("never-created.osmp");
        remove_partial(&output);
        assert!(!output.exists());
    }
}
