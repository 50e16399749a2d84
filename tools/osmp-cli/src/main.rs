//! OSMP CLI - Build tool for OSMP instrument containers
//!
//! # Commands
//!
//! - `osmp build` - Pack an instrument folder into a .osmp container
//! - `osmp inspect` - Print the header tree of a container
//! - `osmp extract` - Decode every sample of a container back to disk
//!
//! Without a subcommand the arguments are taken as a build, so
//! `osmp <input_folder> <output_file> [--key K]` is the same as `osmp build ...`.
//!
//! # Usage
//!
//! ```bash
//! # Build with the default key (0x5A)
//! osmp instruments/piano piano.osmp
//! osmp build instruments/piano piano.osmp
//!
//! # Build with a custom key, maximum compression
//! osmp build instruments/piano piano.osmp --key 0x3F --level 9
//!
//! # Look inside
//! osmp inspect piano.osmp
//! osmp extract piano.osmp out/ --key 0x3F
//! ```
//!
//! # Input folder
//!
//! ```text
//! piano/
//!   metadata.yaml   # free-form, embedded as-is
//!   mapping.yaml    # global params, groups, regions
//!   samples/*.wav   # referenced by region `sample:` paths
//! ```
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=osmp_core=debug`) for per-region logging.

mod build;
mod extract;
mod inspect;
mod key;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

/// OSMP CLI - Build tool for OSMP instrument containers
#[derive(Parser)]
#[command(name = "osmp")]
#[command(about = "Build tool for OSMP instrument containers")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(subcommand_negates_reqs = true)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Build arguments when no subcommand is given
    #[command(flatten)]
    build: Option<build::BuildArgs>,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack an instrument folder into a .osmp container
    Build(build::BuildArgs),

    /// Print the header tree of a container
    Inspect(inspect::InspectArgs),

    /// Decode every sample of a container back to disk
    Extract(extract::ExtractArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match (cli.command, cli.build) {
        (Some(Commands::Build(args)), _) | (None, Some(args)) => build::execute(args),
        (Some(Commands::Inspect(args)), _) => inspect::execute(args),
        (Some(Commands::Extract(args)), _) => extract::execute(args),
        (None, None) => bail!("Nothing to do, see `osmp --help`"),
    }
}
