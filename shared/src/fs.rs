//! Filesystem helpers shared by the packer and the CLI.

use std::io;
use std::path::Path;

/// Maximum size of a single sample file. Sizes are stored as u32.
pub const MAX_SAMPLE_BYTES: u64 = u32::MAX as u64;
/// Maximum size of an input YAML document.
pub const MAX_DOCUMENT_BYTES: u64 = 64 * 1024 * 1024; // 64 MiB

/// Failure reading a file under a size cap.
#[derive(Debug, thiserror::Error)]
pub enum ReadLimitError {
    #[error("file too large ({len} bytes, max {max} bytes)")]
    TooLarge { len: u64, max: u64 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ReadLimitError {
    /// True when the file does not exist (as opposed to being unreadable).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }
}

/// Read a file into memory with a size cap.
///
/// The size is checked from filesystem metadata before any bytes are read.
pub fn read_file_with_limit(path: &Path, max_bytes: u64) -> Result<Vec<u8>, ReadLimitError> {
    let len = std::fs::metadata(path)?.len();
    if len > max_bytes {
        return Err(ReadLimitError::TooLarge {
            len,
            max: max_bytes,
        });
    }
    Ok(std::fs::read(path)?)
}
