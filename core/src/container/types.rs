//! Parsed container header tree.
//!
//! These mirror the on-disk records one to one and are what
//! [`super::ContainerReader`] produces.

use crate::document::GlobalParams;

/// Size of one region record: 5 key/velocity bytes, 2 floats, sample descriptor.
pub const REGION_RECORD_BYTES: u64 = 5 + 4 + 4 + SampleDescriptor::BYTES;

/// Everything in a container except the payload area.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerHeader {
    pub version: u32,
    /// Serialized metadata document, byte-for-byte as stored
    pub metadata: String,
    pub global: GlobalParams,
    pub groups: Vec<GroupHeader>,
    /// Length of the header section; the payload area starts here
    pub header_len: u64,
}

impl ContainerHeader {
    pub fn region_count(&self) -> usize {
        self.groups.iter().map(|g| g.regions.len()).sum()
    }

    /// Iterate regions in container order.
    pub fn regions(&self) -> impl Iterator<Item = &RegionHeader> {
        self.groups.iter().flat_map(|g| g.regions.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupHeader {
    pub name: String,
    pub regions: Vec<RegionHeader>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionHeader {
    pub lokey: u8,
    pub hikey: u8,
    pub lovel: u8,
    pub hivel: u8,
    pub pitch_keycenter: u8,
    pub volume: f32,
    pub tune: f32,
    pub sample: SampleDescriptor,
}

/// Location and sizes of one region's payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleDescriptor {
    /// Absolute file offset of the payload
    pub offset: u64,
    /// Sample length before compression
    pub original_len: u32,
    /// Payload length in the file
    pub compressed_len: u32,
}

impl SampleDescriptor {
    /// Encoded size: u64 offset + two u32 lengths.
    pub const BYTES: u64 = 8 + 4 + 4;

    /// First byte past this payload.
    pub fn end(&self) -> u64 {
        self.offset + u64::from(self.compressed_len)
    }
}
