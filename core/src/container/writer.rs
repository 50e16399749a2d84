//! Container writer
//!
//! Writes the header tree in one linear pass with zeroed sample offsets,
//! appends the payload area, then seeks back to patch every offset.
//!
//! Every record has a known size, so the first pass counts bytes instead of
//! asking the stream for its position. A buffered stream is only flushed by
//! the seeks of the patch pass.

use std::io::{self, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use osmp_shared::OSMP_FORMAT;

use super::types::{REGION_RECORD_BYTES, SampleDescriptor};
use crate::document::{GlobalParams, InstrumentMapping, Region};
use crate::payload::PackedSample;

/// Writer for the OSMP container format
pub struct ContainerWriter<W: Write + Seek> {
    writer: W,
    /// Absolute position of the next byte written
    position: u64,
    /// Absolute position of each region's offset placeholder, by region index
    placeholders: Vec<u64>,
}

impl<W: Write + Seek> ContainerWriter<W> {
    /// Create a new container writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            position: 0,
            placeholders: Vec::new(),
        }
    }

    /// Write a complete container.
    ///
    /// `samples` holds one entry per region in mapping order; missing samples
    /// are [`PackedSample::empty`]. Offsets are absolute positions in the
    /// underlying stream. Returns the final descriptor of every region,
    /// offsets included.
    pub fn write_container(
        &mut self,
        metadata: &str,
        mapping: &InstrumentMapping,
        samples: &[PackedSample],
    ) -> io::Result<Vec<SampleDescriptor>> {
        if samples.len() != mapping.region_count() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{} samples for {} regions",
                    samples.len(),
                    mapping.region_count()
                ),
            ));
        }

        self.placeholders.clear();
        self.position = self.writer.stream_position()?;

        // Pass 1: headers with placeholder offsets
        self.write_preamble(metadata)?;
        self.write_global(&mapping.global)?;
        self.write_groups(mapping, samples)?;

        // Payload area, in region order
        let offsets = self.write_payload_area(samples)?;

        // Pass 2: backfill offsets
        self.patch_offsets(&offsets)?;
        self.writer.seek(SeekFrom::End(0))?;
        self.writer.flush()?;

        Ok(samples
            .iter()
            .zip(offsets)
            .map(|(sample, offset)| SampleDescriptor {
                offset,
                original_len: sample.original_len(),
                compressed_len: sample.compressed_len(),
            })
            .collect())
    }

    /// Magic, version and the length-prefixed metadata blob
    fn write_preamble(&mut self, metadata: &str) -> io::Result<()> {
        let len = u32::try_from(metadata.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "metadata exceeds u32 length")
        })?;

        self.writer.write_all(OSMP_FORMAT.magic)?;
        self.writer.write_u32::<LittleEndian>(OSMP_FORMAT.version)?;
        self.writer.write_u32::<LittleEndian>(len)?;
        self.writer.write_all(metadata.as_bytes())?;
        self.position += 12 + u64::from(len);
        Ok(())
    }

    fn write_global(&mut self, global: &GlobalParams) -> io::Result<()> {
        self.writer.write_f32::<LittleEndian>(global.global_volume)?;
        self.writer.write_u32::<LittleEndian>(global.amp_veltrack)?;
        self.position += 8;
        Ok(())
    }

    fn write_groups(
        &mut self,
        mapping: &InstrumentMapping,
        samples: &[PackedSample],
    ) -> io::Result<()> {
        self.writer
            .write_u32::<LittleEndian>(count_u32(mapping.groups.len(), "group count")?)?;
        self.position += 4;

        let mut samples = samples.iter();
        for group in &mapping.groups {
            self.write_name(group.container_name())?;
            self.writer
                .write_u32::<LittleEndian>(count_u32(group.regions.len(), "region count")?)?;
            self.position += 4;

            for region in &group.regions {
                // Length checked against region_count above
                let sample = samples.next().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "sample list too short")
                })?;
                self.write_region(region, sample)?;
            }
        }

        Ok(())
    }

    /// u16 length-prefixed UTF-8 string
    fn write_name(&mut self, name: &str) -> io::Result<()> {
        let len = u16::try_from(name.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "group name exceeds u16 length")
        })?;
        self.writer.write_u16::<LittleEndian>(len)?;
        self.writer.write_all(name.as_bytes())?;
        self.position += 2 + u64::from(len);
        Ok(())
    }

    fn write_region(&mut self, region: &Region, sample: &PackedSample) -> io::Result<()> {
        self.writer.write_u8(region.lokey)?;
        self.writer.write_u8(region.hikey)?;
        self.writer.write_u8(region.lovel)?;
        self.writer.write_u8(region.hivel)?;
        self.writer.write_u8(region.pitch_keycenter)?;
        self.writer.write_f32::<LittleEndian>(region.volume)?;
        self.writer.write_f32::<LittleEndian>(region.tune)?;

        // Five key bytes, volume and tune precede the offset
        self.placeholders.push(self.position + 13);

        self.writer.write_u64::<LittleEndian>(0)?;
        self.writer.write_u32::<LittleEndian>(sample.original_len())?;
        self.writer.write_u32::<LittleEndian>(sample.compressed_len())?;
        self.position += REGION_RECORD_BYTES;
        Ok(())
    }

    /// Append every payload and return its absolute start offset
    fn write_payload_area(&mut self, samples: &[PackedSample]) -> io::Result<Vec<u64>> {
        let mut offsets = Vec::with_capacity(samples.len());

        for sample in samples {
            offsets.push(self.position);
            self.writer.write_all(sample.bytes())?;
            self.position += u64::from(sample.compressed_len());
        }

        Ok(offsets)
    }

    fn patch_offsets(&mut self, offsets: &[u64]) -> io::Result<()> {
        debug_assert_eq!(self.placeholders.len(), offsets.len());

        for (&position, &offset) in self.placeholders.iter().zip(offsets) {
            self.writer.seek(SeekFrom::Start(position))?;
            self.writer.write_u64::<LittleEndian>(offset)?;
        }

        Ok(())
    }

    /// Consume the writer and return the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn count_u32(count: usize, what: &str) -> io::Result<u32> {
    u32::try_from(count).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("{what} exceeds u32"))
    })
}
