//! `osmp inspect`: print a container's header tree.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use osmp_core::ContainerReader;
use osmp_core::container::ContainerHeader;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Container to inspect
    pub container: PathBuf,

    /// Also print the embedded metadata document
    #[arg(long)]
    pub metadata: bool,
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let file = File::open(&args.container)
        .with_context(|| format!("Failed to open container: {}", args.container.display()))?;
    let header = ContainerReader::new(BufReader::new(file))
        .read_header()
        .with_context(|| format!("Failed to parse container: {}", args.container.display()))?;

    print_header(&header, args.metadata);
    Ok(())
}

fn print_header(header: &ContainerHeader, with_metadata: bool) {
    println!("OSMP container v{}", header.version);
    println!("  Metadata: {} bytes", header.metadata.len());
    println!("  Global volume: {}", header.global.global_volume);
    println!("  Amp veltrack: {}", header.global.amp_veltrack);
    println!("  Header: {} bytes", header.header_len);
    println!("  Groups: {}", header.groups.len());

    for (g, group) in header.groups.iter().enumerate() {
        println!();
        println!("  [{}] {} ({} regions)", g, group.name, group.regions.len());
        for (r, region) in group.regions.iter().enumerate() {
            let sample = &region.sample;
            let payload = if sample.compressed_len == 0 {
                "no sample".to_string()
            } else {
                format!(
                    "@{} {} -> {} bytes",
                    sample.offset, sample.original_len, sample.compressed_len
                )
            };
            println!(
                "    [{}] key {}-{} vel {}-{} center {} vol {} tune {} | {}",
                r,
                region.lokey,
                region.hikey,
                region.lovel,
                region.hivel,
                region.pitch_keycenter,
                region.volume,
                region.tune,
                payload
            );
        }
    }

    if with_metadata {
        println!();
        println!("{}", header.metadata);
    }
}
