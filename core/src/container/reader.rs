//! Container reader
//!
//! Parses the header tree of a finished container and extracts samples.

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use osmp_shared::OSMP_FORMAT;

use super::types::*;
use crate::document::GlobalParams;
use crate::payload;

/// Reader for the OSMP container format
pub struct ContainerReader<R: Read + Seek> {
    reader: R,
}

impl<R: Read + Seek> ContainerReader<R> {
    /// Create a new container reader
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read everything up to the payload area
    pub fn read_header(&mut self) -> io::Result<ContainerHeader> {
        self.reader.seek(SeekFrom::Start(0))?;

        let mut magic = [0u8; 4];
        self.reader.read_exact(&mut magic)?;
        if &magic != OSMP_FORMAT.magic {
            return Err(invalid_data("not an OSMP container (bad magic)"));
        }

        let version = self.reader.read_u32::<LittleEndian>()?;
        if !OSMP_FORMAT.supports_version(version) {
            return Err(invalid_data(format!(
                "unsupported container version {version}"
            )));
        }

        let metadata_len = self.reader.read_u32::<LittleEndian>()?;
        let metadata = String::from_utf8(self.read_bytes(u64::from(metadata_len))?)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let global = GlobalParams {
            global_volume: self.reader.read_f32::<LittleEndian>()?,
            amp_veltrack: self.reader.read_u32::<LittleEndian>()?,
        };

        let group_count = self.reader.read_u32::<LittleEndian>()?;
        let mut groups = Vec::new();
        for _ in 0..group_count {
            groups.push(self.read_group()?);
        }

        let header_len = self.reader.stream_position()?;

        Ok(ContainerHeader {
            version,
            metadata,
            global,
            groups,
            header_len,
        })
    }

    fn read_group(&mut self) -> io::Result<GroupHeader> {
        let name_len = self.reader.read_u16::<LittleEndian>()?;
        let name = String::from_utf8(self.read_bytes(u64::from(name_len))?)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let region_count = self.reader.read_u32::<LittleEndian>()?;
        let mut regions = Vec::new();
        for _ in 0..region_count {
            regions.push(self.read_region()?);
        }

        Ok(GroupHeader { name, regions })
    }

    fn read_region(&mut self) -> io::Result<RegionHeader> {
        let mut keys = [0u8; 5];
        self.reader.read_exact(&mut keys)?;
        let volume = self.reader.read_f32::<LittleEndian>()?;
        let tune = self.reader.read_f32::<LittleEndian>()?;

        let sample = SampleDescriptor {
            offset: self.reader.read_u64::<LittleEndian>()?,
            original_len: self.reader.read_u32::<LittleEndian>()?,
            compressed_len: self.reader.read_u32::<LittleEndian>()?,
        };

        Ok(RegionHeader {
            lokey: keys[0],
            hikey: keys[1],
            lovel: keys[2],
            hivel: keys[3],
            pitch_keycenter: keys[4],
            volume,
            tune,
            sample,
        })
    }

    /// Stored (compressed, obfuscated) bytes of one payload
    pub fn read_payload(&mut self, descriptor: &SampleDescriptor) -> io::Result<Vec<u8>> {
        self.reader.seek(SeekFrom::Start(descriptor.offset))?;
        self.read_bytes(u64::from(descriptor.compressed_len))
    }

    /// Decoded sample bytes of one region
    pub fn read_sample(&mut self, descriptor: &SampleDescriptor, key: u8) -> io::Result<Vec<u8>> {
        let packed = self.read_payload(descriptor)?;
        payload::unpack(&packed, key, descriptor.original_len)
    }

    /// Read exactly `len` bytes without trusting `len` for the allocation
    fn read_bytes(&mut self, len: u64) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        (&mut self.reader).take(len).read_to_end(&mut buf)?;
        if buf.len() as u64 != len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes, found {}", len, buf.len()),
            ));
        }
        Ok(buf)
    }
}

fn invalid_data(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}
