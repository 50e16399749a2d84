//! Container format definition for OSMP instrument files.
//!
//! [`ContainerFormat`] is the single source of truth for the container
//! constants (file extension, magic bytes, version) and for the
//! convention-based filenames the packer expects inside an input folder.
//!
//! # Example
//!
//! ```
//! use osmp_shared::OSMP_FORMAT;
//!
//! assert_eq!(OSMP_FORMAT.extension, "osmp");
//! assert_eq!(OSMP_FORMAT.magic, b"OSMP");
//! assert_eq!(OSMP_FORMAT.mapping_file, "mapping.yaml");
//! ```

/// Container format definition.
#[derive(Debug, Clone, Copy)]
pub struct ContainerFormat {
    /// Container file extension without dot (e.g., "osmp")
    pub extension: &'static str,

    /// Magic bytes at start of the container (4 bytes)
    pub magic: &'static [u8; 4],

    /// Format version. Any field reordering bumps this.
    pub version: u32,

    /// Instrument metadata document inside the input folder
    pub metadata_file: &'static str,

    /// Group/region mapping document inside the input folder
    pub mapping_file: &'static str,

    /// XOR key used when the caller does not supply one
    pub default_key: u8,
}

impl ContainerFormat {
    /// Create a new container format definition.
    pub const fn new(
        extension: &'static str,
        magic: &'static [u8; 4],
        version: u32,
        metadata_file: &'static str,
        mapping_file: &'static str,
        default_key: u8,
    ) -> Self {
        Self {
            extension,
            magic,
            version,
            metadata_file,
            mapping_file,
            default_key,
        }
    }

    /// Returns true if `version` can be read by this build.
    pub const fn supports_version(&self, version: u32) -> bool {
        version == self.version
    }
}

/// OSMP container format definition.
///
/// - Extension: `.osmp`
/// - Magic bytes: `OSMP`
/// - Inputs: `metadata.yaml`, `mapping.yaml`
pub const OSMP_FORMAT: ContainerFormat = ContainerFormat::new(
    "osmp",
    b"OSMP",
    1,
    "metadata.yaml",
    "mapping.yaml",
    0x5A,
);
