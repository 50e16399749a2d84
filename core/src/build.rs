//! Build orchestration: folder in, container out.
//!
//! Documents are loaded and every sample is packed before the output file is
//! created, so a bad input never leaves a file behind. Compression runs in
//! parallel; everything written to the container stays in region order.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use osmp_shared::{MAX_SAMPLE_BYTES, OSMP_FORMAT, ReadLimitError, read_file_with_limit};
use rayon::prelude::*;

use crate::container::ContainerWriter;
use crate::document::{InstrumentDocuments, InstrumentMapping, Region};
use crate::error::BuildError;
use crate::payload::{self, PackedSample};

/// Options for one build.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// XOR key applied to every compressed sample
    pub key: u8,
    /// zlib compression level
    pub compression: Compression,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            key: OSMP_FORMAT.default_key,
            compression: Compression::default(),
        }
    }
}

/// Region whose sample file was not found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSample {
    pub group: usize,
    pub region: usize,
    /// Resolved path, or `None` if the region names no sample
    pub path: Option<PathBuf>,
}

/// Summary of a finished build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_path: PathBuf,
    pub key: u8,
    pub group_count: usize,
    pub region_count: usize,
    /// Regions stored with an empty payload
    pub missing_samples: Vec<MissingSample>,
    /// Total length of the payload area
    pub payload_bytes: u64,
    /// Total container length
    pub container_bytes: u64,
}

/// Build a container from an input folder.
pub fn build(
    input_folder: &Path,
    output_path: &Path,
    options: &BuildOptions,
) -> Result<BuildReport, BuildError> {
    tracing::info!("Building {} from {}", output_path.display(), input_folder.display());
    let documents = InstrumentDocuments::load(input_folder)?;
    write(output_path, &documents, input_folder, options)
}

/// Write already-loaded documents to `output_path`.
///
/// Sample paths in the mapping resolve against `sample_root`.
pub fn write(
    output_path: &Path,
    documents: &InstrumentDocuments,
    sample_root: &Path,
    options: &BuildOptions,
) -> Result<BuildReport, BuildError> {
    let mapping = &documents.mapping;

    let metadata = documents.metadata_blob()?;
    if u32::try_from(metadata.len()).is_err() {
        return Err(BuildError::MetadataTooLarge {
            len: metadata.len(),
        });
    }
    check_group_names(mapping)?;

    let (samples, missing_samples) = pack_samples(mapping, sample_root, options)?;

    let file = File::create(output_path).map_err(|source| write_error(output_path, source))?;
    let mut writer = ContainerWriter::new(BufWriter::new(file));
    let descriptors = writer
        .write_container(&metadata, mapping, &samples)
        .map_err(|source| write_error(output_path, source))?;

    let mut out = writer.into_inner();
    let container_bytes = out
        .seek(SeekFrom::End(0))
        .map_err(|source| write_error(output_path, source))?;
    out.flush().map_err(|source| write_error(output_path, source))?;

    let payload_bytes: u64 = descriptors
        .iter()
        .map(|d| u64::from(d.compressed_len))
        .sum();

    tracing::info!(
        regions = descriptors.len(),
        missing = missing_samples.len(),
        payload_bytes,
        container_bytes,
        "Wrote {}",
        output_path.display()
    );

    Ok(BuildReport {
        output_path: output_path.to_path_buf(),
        key: options.key,
        group_count: mapping.groups.len(),
        region_count: descriptors.len(),
        missing_samples,
        payload_bytes,
        container_bytes,
    })
}

fn check_group_names(mapping: &InstrumentMapping) -> Result<(), BuildError> {
    for (index, group) in mapping.groups.iter().enumerate() {
        let len = group.container_name().len();
        if u16::try_from(len).is_err() {
            return Err(BuildError::GroupNameTooLong { group: index, len });
        }
    }
    Ok(())
}

/// Read and pack every region's sample, in region order.
fn pack_samples(
    mapping: &InstrumentMapping,
    sample_root: &Path,
    options: &BuildOptions,
) -> Result<(Vec<PackedSample>, Vec<MissingSample>), BuildError> {
    let regions: Vec<_> = mapping.regions().collect();

    let packed: Result<Vec<_>, BuildError> = regions
        .par_iter()
        .map(|&(group, region_index, region)| {
            pack_region(group, region_index, region, sample_root, options)
        })
        .collect();

    let mut samples = Vec::with_capacity(regions.len());
    let mut missing = Vec::new();
    for (sample, absent) in packed? {
        samples.push(sample);
        if let Some(absent) = absent {
            tracing::warn!(
                group = absent.group,
                region = absent.region,
                "Sample file not found: {}",
                absent
                    .path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(no sample)".to_string())
            );
            missing.push(absent);
        }
    }

    Ok((samples, missing))
}

/// Packed sample plus the missing-sample record when there was nothing to pack
type PackedRegion = (PackedSample, Option<MissingSample>);

fn pack_region(
    group: usize,
    region_index: usize,
    region: &Region,
    sample_root: &Path,
    options: &BuildOptions,
) -> Result<PackedRegion, BuildError> {
    let missing = |path: Option<PathBuf>| -> Result<PackedRegion, BuildError> {
        Ok((
            PackedSample::empty(),
            Some(MissingSample {
                group,
                region: region_index,
                path,
            }),
        ))
    };

    let Some(path) = region.sample_path(sample_root) else {
        return missing(None);
    };
    if !path.is_file() {
        return missing(Some(path));
    }

    let raw = match read_file_with_limit(&path, MAX_SAMPLE_BYTES) {
        Ok(raw) => raw,
        Err(e) if e.is_not_found() => return missing(Some(path)),
        Err(ReadLimitError::TooLarge { len, .. }) => {
            return Err(BuildError::SampleTooLarge { path, len });
        }
        Err(ReadLimitError::Io(source)) => return Err(BuildError::SampleRead { path, source }),
    };

    let sample = payload::pack(&raw, options.key, options.compression).map_err(|source| {
        if source.kind() == std::io::ErrorKind::InvalidInput {
            BuildError::SampleTooLarge {
                path: path.clone(),
                len: raw.len() as u64,
            }
        } else {
            BuildError::Compress {
                path: path.clone(),
                source,
            }
        }
    })?;

    tracing::debug!(
        group,
        region = region_index,
        original_len = sample.original_len(),
        compressed_len = sample.compressed_len(),
        "Packed {}",
        path.display()
    );

    Ok((sample, None))
}

fn write_error(path: &Path, source: std::io::Error) -> BuildError {
    BuildError::Write {
        path: path.to_path_buf(),
        source,
    }
}
