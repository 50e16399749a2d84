//! `osmp extract`: decode every present sample back to disk.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use osmp_core::ContainerReader;
use osmp_shared::OSMP_FORMAT;

use crate::key::parse_key;

/// Arguments for the extract command
#[derive(Args)]
pub struct ExtractArgs {
    /// Container to read
    pub container: PathBuf,

    /// Directory to write samples into (created if missing)
    pub output_dir: PathBuf,

    /// XOR obfuscation key the container was built with
    #[arg(long, value_parser = parse_key, default_value_t = OSMP_FORMAT.default_key)]
    pub key: u8,
}

/// Execute the extract command
pub fn execute(args: ExtractArgs) -> Result<()> {
    let file = File::open(&args.container)
        .with_context(|| format!("Failed to open container: {}", args.container.display()))?;
    let mut reader = ContainerReader::new(BufReader::new(file));
    let header = reader
        .read_header()
        .with_context(|| format!("Failed to parse container: {}", args.container.display()))?;

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create directory: {}", args.output_dir.display()))?;

    let mut written = 0usize;
    for (g, group) in header.groups.iter().enumerate() {
        for (r, region) in group.regions.iter().enumerate() {
            if region.sample.compressed_len == 0 {
                tracing::debug!(group = g, region = r, "Skipping empty payload");
                continue;
            }

            let data = reader.read_sample(&region.sample, args.key).with_context(|| {
                format!(
                    "Failed to decode sample for group {} region {} (wrong key?)",
                    g, r
                )
            })?;

            let path = args.output_dir.join(format!("g{g}_r{r}.bin"));
            std::fs::write(&path, &data)
                .with_context(|| format!("Failed to write sample: {}", path.display()))?;
            println!("  {} ({} bytes)", path.display(), data.len());
            written += 1;
        }
    }

    println!();
    println!(
        "Extracted {} of {} samples to {}",
        written,
        header.region_count(),
        args.output_dir.display()
    );
    Ok(())
}
