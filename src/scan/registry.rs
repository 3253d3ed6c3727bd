//! Global scan metadata shared by every loader invocation.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::ids::ScanId;
use super::transform::AlignmentTransform;
use crate::error::ScanprepError;

/// Locations of the three mapping files the registry is built from.
#[derive(Clone, Debug)]
pub struct RegistryPaths {
    /// `{"0": "wall", "1": "floor", ...}`
    pub idx_to_semantic_class: PathBuf,
    /// `{"office chair": "chair", ...}`
    pub instance_to_semantic_class: PathBuf,
    /// `{"scene0000_00": [16 row-major floats], ...}`
    pub axis_alignment: PathBuf,
}

/// Read-only metadata: class mappings and per-scan alignment matrices.
///
/// Loaded once at start-up and borrowed by all workers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanRegistry {
    /// Root directory holding one subdirectory per scan.
    pub scans_dir: PathBuf,

    pub idx_to_semantic_class: BTreeMap<u32, String>,

    pub instance_to_semantic_class: BTreeMap<String, String>,

    pub axis_alignment: BTreeMap<ScanId, AlignmentTransform>,
}

impl ScanRegistry {
    /// Loads the registry from the three mapping files.
    ///
    /// # Errors
    /// Returns an error if any file is unreadable, is not valid JSON of the
    /// expected shape, or holds an alignment matrix without 16 values.
    pub fn load(scans_dir: &Path, paths: &RegistryPaths) -> Result<Self, ScanprepError> {
        let idx_to_semantic_class: BTreeMap<u32, String> =
            read_json_file(&paths.idx_to_semantic_class)?;
        let instance_to_semantic_class: BTreeMap<String, String> =
            read_json_file(&paths.instance_to_semantic_class)?;
        let raw_alignment: BTreeMap<String, Vec<f64>> = read_json_file(&paths.axis_alignment)?;

        let mut axis_alignment = BTreeMap::new();
        for (scan_id, values) in raw_alignment {
            let scan_id = ScanId::new(scan_id);
            let transform = AlignmentTransform::from_flat(&scan_id, &values)?;
            axis_alignment.insert(scan_id, transform);
        }

        Ok(Self {
            scans_dir: scans_dir.to_path_buf(),
            idx_to_semantic_class,
            instance_to_semantic_class,
            axis_alignment,
        })
    }

    /// Maps a raw instance label to its semantic class.
    pub fn semantic_class_of(&self, instance_label: &str) -> Option<&str> {
        self.instance_to_semantic_class
            .get(instance_label)
            .map(String::as_str)
    }

    /// Returns the alignment transform recorded for a scan.
    pub fn alignment_of(&self, scan_id: &ScanId) -> Option<&AlignmentTransform> {
        self.axis_alignment.get(scan_id)
    }

    /// Number of semantic classes.
    pub fn num_semantic_classes(&self) -> usize {
        self.idx_to_semantic_class.len()
    }
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, ScanprepError> {
    let file = File::open(path).map_err(|source| ScanprepError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| ScanprepError::MappingParse {
        path: path.to_path_buf(),
        source,
    })
}
