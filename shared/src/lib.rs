//! Shared constants and helpers for the OSMP instrument container.
//!
//! Both the packer and any tool that reads containers back go through
//! [`OSMP_FORMAT`] for magic bytes, version and input filenames.

mod container_format;
mod fs;

pub use container_format::{ContainerFormat, OSMP_FORMAT};
pub use fs::{MAX_DOCUMENT_BYTES, MAX_SAMPLE_BYTES, ReadLimitError, read_file_with_limit};
