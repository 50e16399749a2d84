//! Packer for OSMP instrument containers.
//!
//! An input folder holds `metadata.yaml`, `mapping.yaml` and the sample files
//! the mapping references. [`build`] turns that folder into a single `.osmp`
//! container:
//!
//! 1. [`document`] loads both YAML documents.
//! 2. [`payload`] compresses and obfuscates every region's sample.
//! 3. [`container::ContainerWriter`] writes the header tree with offset
//!    placeholders, appends the payload area, then patches the offsets.
//!
//! [`container::ContainerReader`] parses a finished container back and is the
//! reference consumer of the byte layout.

pub mod build;
pub mod container;
pub mod document;
pub mod error;
pub mod payload;

pub use build::{BuildOptions, BuildReport, MissingSample, build, write};
pub use container::{ContainerReader, ContainerWriter};
pub use document::{GlobalParams, Group, InstrumentDocuments, InstrumentMapping, Region};
pub use error::BuildError;
pub use payload::PackedSample;
