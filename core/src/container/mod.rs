//! OSMP container format (.osmp)
//!
//! All integers are little-endian, all floats IEEE-754 single precision.
//!
//! # File Structure
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │ magic: [u8; 4] = "OSMP"                          │
//! │ version: u32 = 1                                 │
//! │ metadata_len: u32, metadata: [u8; metadata_len]  │
//! │ global_volume: f32, amp_veltrack: u32            │
//! │ group_count: u32                                 │
//! ├──────────────────────────────────────────────────┤
//! │ per group:                                       │
//! │   name_len: u16, name: [u8; name_len] (UTF-8)    │
//! │   region_count: u32                              │
//! │   per region (29 bytes):                         │
//! │     lokey, hikey, lovel, hivel, pitch_keycenter  │
//! │     volume: f32, tune: f32                       │
//! │     sample_offset: u64 (absolute)                │
//! │     original_len: u32, compressed_len: u32       │
//! ├──────────────────────────────────────────────────┤
//! │ payload area: obfuscated zlib streams, one per   │
//! │ region, contiguous, in region order              │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Reordering any field is a breaking change and bumps the version.

mod reader;
mod types;
mod writer;

pub use reader::ContainerReader;
pub use types::{ContainerHeader, GroupHeader, REGION_RECORD_BYTES, RegionHeader, SampleDescriptor};
pub use writer::ContainerWriter;
