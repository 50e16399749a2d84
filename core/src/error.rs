//! Build error taxonomy.
//!
//! Everything here is fatal. A missing sample file is not an error: it is
//! reported through [`crate::BuildReport::missing_samples`].

use std::io;
use std::path::PathBuf;

use osmp_shared::ReadLimitError;

/// Fatal failure while building a container.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// An input document is absent or cannot be read
    #[error("document missing or unreadable: {}", path.display())]
    DocumentMissing {
        path: PathBuf,
        #[source]
        source: ReadLimitError,
    },

    /// An input document is not valid YAML or does not fit the expected shape
    #[error("document unparsable: {}", path.display())]
    DocumentUnparsable {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The metadata document could not be re-serialized
    #[error("failed to serialize metadata document")]
    MetadataEncode(#[source] serde_yaml::Error),

    /// Serialized metadata does not fit the 32-bit length prefix
    #[error("metadata too large ({len} bytes, max {} bytes)", u32::MAX)]
    MetadataTooLarge { len: usize },

    /// Group name does not fit the 16-bit length prefix
    #[error("group {group} name too long ({len} bytes, max {} bytes)", u16::MAX)]
    GroupNameTooLong { group: usize, len: usize },

    /// Sample (raw or compressed) does not fit the 32-bit size fields
    #[error("sample too large: {} ({len} bytes, max {} bytes)", path.display(), u32::MAX)]
    SampleTooLarge { path: PathBuf, len: u64 },

    /// Sample file exists but could not be read
    #[error("failed to read sample: {}", path.display())]
    SampleRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Compressing a sample failed
    #[error("failed to compress sample: {}", path.display())]
    Compress {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any I/O failure while creating, writing or patching the container
    #[error("failed to write container: {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    /// True if the error happened after the output file was created.
    ///
    /// Callers use this to decide whether a partial file needs removing.
    pub fn touched_output(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}
