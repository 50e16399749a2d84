//! Input document loading.
//!
//! An input folder holds two YAML documents under fixed names:
//!
//! ```yaml
//! # mapping.yaml
//! global:
//!   global_volume: 0.8
//!   amp_veltrack: 100
//! groups:
//!   - name: Piano
//!     regions:
//!       - lokey: 60
//!         hikey: 62
//!         pitch_keycenter: 61
//!         sample: samples/c4.wav
//! ```
//!
//! `metadata.yaml` is arbitrary and is carried into the container verbatim
//! (re-serialized). Only structural presence is checked here; key ranges and
//! sample paths are not validated.

use std::path::{Path, PathBuf};

use osmp_shared::{MAX_DOCUMENT_BYTES, OSMP_FORMAT, read_file_with_limit};
use serde::Deserialize;

use crate::error::BuildError;

/// Name given to groups that have no name or an empty one.
pub const DEFAULT_GROUP_NAME: &str = "Group";

/// Both input documents of one build.
#[derive(Debug, Clone)]
pub struct InstrumentDocuments {
    /// Free-form instrument metadata
    pub metadata: serde_yaml::Value,
    /// Global parameters, groups and regions
    pub mapping: InstrumentMapping,
}

/// Parsed `mapping.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstrumentMapping {
    pub global: GlobalParams,
    pub groups: Vec<Group>,
}

/// Instrument-wide playback parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlobalParams {
    pub global_volume: f32,
    pub amp_veltrack: u32,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            global_volume: 1.0,
            amp_veltrack: 0,
        }
    }
}

/// Named, ordered list of regions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl Group {
    /// Name as stored in the container. Never empty.
    pub fn container_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_GROUP_NAME,
        }
    }
}

/// Key/velocity range mapped to one sample file.
///
/// Byte fields accept 0..=255 and are stored as given; values that do not
/// fit a byte are rejected at load time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Region {
    pub lokey: u8,
    pub hikey: u8,
    pub lovel: u8,
    pub hivel: u8,
    pub pitch_keycenter: u8,
    pub volume: f32,
    pub tune: f32,
    /// Sample path relative to the input folder
    pub sample: Option<String>,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            lokey: 0,
            hikey: 127,
            lovel: 0,
            hivel: 127,
            pitch_keycenter: 60,
            volume: 1.0,
            tune: 0.0,
            sample: None,
        }
    }
}

impl Region {
    /// Resolve the sample path against `root`.
    ///
    /// Returns `None` when the region names no sample at all.
    pub fn sample_path(&self, root: &Path) -> Option<PathBuf> {
        match self.sample.as_deref() {
            Some(rel) if !rel.is_empty() => Some(root.join(rel)),
            _ => None,
        }
    }
}

impl InstrumentMapping {
    /// Parse a mapping document. An empty document is an empty mapping.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn region_count(&self) -> usize {
        self.groups.iter().map(|g| g.regions.len()).sum()
    }

    /// Iterate regions in container order with their group/region indices.
    pub fn regions(&self) -> impl Iterator<Item = (usize, usize, &Region)> {
        self.groups.iter().enumerate().flat_map(|(g, group)| {
            group
                .regions
                .iter()
                .enumerate()
                .map(move |(r, region)| (g, r, region))
        })
    }
}

impl InstrumentDocuments {
    /// Load `metadata.yaml` and `mapping.yaml` from `folder`.
    pub fn load(folder: &Path) -> Result<Self, BuildError> {
        let metadata_path = folder.join(OSMP_FORMAT.metadata_file);
        let mapping_path = folder.join(OSMP_FORMAT.mapping_file);

        let metadata_bytes = read_document(&metadata_path)?;
        let mapping_bytes = read_document(&mapping_path)?;

        let metadata = parse_metadata(&metadata_bytes).map_err(|source| {
            BuildError::DocumentUnparsable {
                path: metadata_path,
                source,
            }
        })?;

        let mapping = std::str::from_utf8(&mapping_bytes)
            .map_err(<serde_yaml::Error as serde::de::Error>::custom)
            .and_then(InstrumentMapping::parse)
            .map_err(|source| BuildError::DocumentUnparsable {
                path: mapping_path,
                source,
            })?;

        tracing::debug!(
            groups = mapping.groups.len(),
            regions = mapping.region_count(),
            "Loaded documents from {}",
            folder.display()
        );

        Ok(Self { metadata, mapping })
    }

    /// Metadata document serialized as it is embedded in the container.
    pub fn metadata_blob(&self) -> Result<String, BuildError> {
        serde_yaml::to_string(&self.metadata).map_err(BuildError::MetadataEncode)
    }
}

fn read_document(path: &Path) -> Result<Vec<u8>, BuildError> {
    read_file_with_limit(path, MAX_DOCUMENT_BYTES).map_err(|source| BuildError::DocumentMissing {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_metadata(bytes: &[u8]) -> Result<serde_yaml::Value, serde_yaml::Error> {
    let text = std::str::from_utf8(bytes).map_err(<serde_yaml::Error as serde::de::Error>::custom)?;
    if text.trim().is_empty() {
        return Ok(serde_yaml::Value::Null);
    }
    serde_yaml::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_mapping_parsing() {
        let yaml = r#"
global:
  global_volume: 0.8
  amp_veltrack: 100
groups:
  - name: Piano
    regions:
      - lokey: 60
        hikey: 62
        lovel: 1
        hivel: 100
        pitch_keycenter: 61
        volume: 0.5
        tune: -12.5
        sample: samples/c4.wav
"#;
        let mapping = InstrumentMapping::parse(yaml).unwrap();
        assert_eq!(mapping.global.global_volume, 0.8);
        assert_eq!(mapping.global.amp_veltrack, 100);
        assert_eq!(mapping.groups.len(), 1);

        let group = &mapping.groups[0];
        assert_eq!(group.container_name(), "Piano");
        let region = &group.regions[0];
        assert_eq!(region.lokey, 60);
        assert_eq!(region.hikey, 62);
        assert_eq!(region.lovel, 1);
        assert_eq!(region.hivel, 100);
        assert_eq!(region.pitch_keycenter, 61);
        assert_eq!(region.volume, 0.5);
        assert_eq!(region.tune, -12.5);
        assert_eq!(region.sample.as_deref(), Some("samples/c4.wav"));
    }

    #[test]
    fn test_mapping_defaults() {
        let yaml = r#"
groups:
  - regions:
      - sample: a.wav
  - name: ""
"#;
        let mapping = InstrumentMapping::parse(yaml).unwrap();
        assert_eq!(mapping.global, GlobalParams::default());
        assert_eq!(mapping.global.global_volume, 1.0);
        assert_eq!(mapping.global.amp_veltrack, 0);

        assert_eq!(mapping.groups[0].container_name(), DEFAULT_GROUP_NAME);
        assert_eq!(mapping.groups[1].container_name(), DEFAULT_GROUP_NAME);
        assert!(mapping.groups[1].regions.is_empty());

        let region = &mapping.groups[0].regions[0];
        assert_eq!(region.lokey, 0);
        assert_eq!(region.hikey, 127);
        assert_eq!(region.lovel, 0);
        assert_eq!(region.hivel, 127);
        assert_eq!(region.pitch_keycenter, 60);
        assert_eq!(region.volume, 1.0);
        assert_eq!(region.tune, 0.0);
    }

    #[test]
    fn test_mapping_empty_document() {
        let mapping = InstrumentMapping::parse("").unwrap();
        assert!(mapping.groups.is_empty());
        assert_eq!(mapping.region_count(), 0);
    }

    #[test]
    fn test_mapping_accepts_full_byte_range() {
        let yaml = "groups:\n  - regions:\n      - lokey: 200\n        hikey: 255\n";
        let mapping = InstrumentMapping::parse(yaml).unwrap();
        assert_eq!(mapping.groups[0].regions[0].lokey, 200);
        assert_eq!(mapping.groups[0].regions[0].hikey, 255);
    }

    #[test]
    fn test_mapping_rejects_out_of_byte_range() {
        let yaml = "groups:\n  - regions:\n      - lokey: 300\n";
        assert!(InstrumentMapping::parse(yaml).is_err());

        let yaml = "groups:\n  - regions:\n      - hivel: -1\n";
        assert!(InstrumentMapping::parse(yaml).is_err());
    }

    #[test]
    fn test_regions_iterates_in_order() {
        let yaml = r#"
groups:
  - name: A
    regions: [{lokey: 1}, {lokey: 2}]
  - name: B
    regions: [{lokey: 3}]
"#;
        let mapping = InstrumentMapping::parse(yaml).unwrap();
        let order: Vec<_> = mapping
            .regions()
            .map(|(g, r, region)| (g, r, region.lokey))
            .collect();
        assert_eq!(order, vec![(0, 0, 1), (0, 1, 2), (1, 0, 3)]);
    }

    #[test]
    fn test_sample_path() {
        let root = Path::new("/instruments/piano");
        let region = Region {
            sample: Some("samples/c4.wav".to_string()),
            ..Region::default()
        };
        assert_eq!(
            region.sample_path(root),
            Some(root.join("samples/c4.wav"))
        );

        let empty = Region {
            sample: Some(String::new()),
            ..Region::default()
        };
        assert_eq!(empty.sample_path(root), None);
        assert_eq!(Region::default().sample_path(root), None);
    }

    #[test]
    fn test_load_documents() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("metadata.yaml"),
            "name: Grand\nauthor: Someone\ntags: [piano, acoustic]\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("mapping.yaml"),
            "groups:\n  - name: Piano\n    regions: []\n",
        )
        .unwrap();

        let docs = InstrumentDocuments::load(dir.path()).unwrap();
        assert_eq!(docs.mapping.groups.len(), 1);

        let blob = docs.metadata_blob().unwrap();
        assert!(blob.starts_with("name: Grand\n"));
        let reparsed: serde_yaml::Value = serde_yaml::from_str(&blob).unwrap();
        assert_eq!(reparsed, docs.metadata);
    }

    #[test]
    fn test_load_missing_document() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("metadata.yaml"), "name: x\n").unwrap();

        let err = InstrumentDocuments::load(dir.path()).unwrap_err();
        match err {
            BuildError::DocumentMissing { path, source } => {
                assert!(path.ends_with("mapping.yaml"));
                assert!(source.is_not_found());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_unparsable_document() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("metadata.yaml"), "name: x\n").unwrap();
        std::fs::write(dir.path().join("mapping.yaml"), "groups: [unclosed\n").unwrap();

        let err = InstrumentDocuments::load(dir.path()).unwrap_err();
        assert!(matches!(err, BuildError::DocumentUnparsable { .. }));
    }
}
