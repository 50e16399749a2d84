//! Sample payload packing.
//!
//! A payload is the zlib stream of a sample file with every byte XOR-ed
//! against a single key byte. The XOR step only keeps the samples from being
//! readable with a casual hex dump. It is NOT encryption: the key is one byte,
//! stored nowhere secret, and trivially recovered from the zlib header.
//!
//! The original length is recorded next to the payload rather than relying on
//! the compressed stream. Decoding never inflates past it, so a forged stream
//! cannot expand beyond what its header declares.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

/// One region's packed sample.
///
/// Only built by [`pack`] or [`PackedSample::empty`], so the stored bytes
/// always fit the container's u32 length field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedSample {
    bytes: Vec<u8>,
    original_len: u32,
}

impl PackedSample {
    /// Zero-length payload for a region whose sample file is missing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compressed, obfuscated bytes as stored in the payload area
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the source file before compression
    pub fn original_len(&self) -> u32 {
        self.original_len
    }

    /// Length of [`bytes`](Self::bytes)
    pub fn compressed_len(&self) -> u32 {
        // Checked in `pack`
        self.bytes.len() as u32
    }
}

/// XOR every byte with `key`. Applying it twice restores the input.
pub fn obfuscate(data: &mut [u8], key: u8) {
    for byte in data.iter_mut() {
        *byte ^= key;
    }
}

/// Compress `raw` and obfuscate the result with `key`.
///
/// Fails with `InvalidInput` if the raw or compressed length does not fit
/// the container's 32-bit size fields.
pub fn pack(raw: &[u8], key: u8, level: Compression) -> io::Result<PackedSample> {
    let original_len = u32::try_from(raw.len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "sample exceeds u32 length")
    })?;

    let mut encoder = ZlibEncoder::new(Vec::new(), level);
    encoder.write_all(raw)?;
    let mut bytes = encoder.finish()?;

    if u32::try_from(bytes.len()).is_err() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "compressed sample exceeds u32 length",
        ));
    }

    obfuscate(&mut bytes, key);

    Ok(PackedSample {
        bytes,
        original_len,
    })
}

/// Reverse [`pack`]: de-obfuscate with `key`, inflate, and check the length.
///
/// A wrong key yields a corrupt zlib stream and fails with `InvalidData`.
/// Inflation stops one byte past `original_len`, so a stream that expands
/// further is rejected without being decoded in full.
pub fn unpack(packed: &[u8], key: u8, original_len: u32) -> io::Result<Vec<u8>> {
    if packed.is_empty() {
        return if original_len == 0 {
            Ok(Vec::new())
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "empty payload for non-empty sample",
            ))
        };
    }

    let mut compressed = packed.to_vec();
    obfuscate(&mut compressed, key);

    let mut raw = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .take(u64::from(original_len) + 1)
        .read_to_end(&mut raw)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if raw.len() > original_len as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("sample inflates past its declared {original_len} bytes"),
        ));
    }
    if raw.len() < original_len as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "sample inflated to {} bytes, expected {}",
                raw.len(),
                original_len
            ),
        ));
    }

    Ok(raw)
}
