//! Persisted artifact: the registry plus every loaded scan in one file.
//!
//! Output lands in `<save_dir>/<tag>/<tag>.bin`, where the tag encodes the
//! processing options (see [`processing_tag`]). The artifact has no internal
//! index; consumers rebuild their own lookup from `scans`.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::ScanprepError;
use crate::scan::{ScanRecord, ScanRegistry};

/// File extension of the artifact.
pub const ARTIFACT_EXTENSION: &str = "bin";

/// The on-disk pair of registry and ordered scan records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedArtifact {
    pub registry: ScanRegistry,
    pub scans: Vec<ScanRecord>,
}

/// Derives the output tag from the processing options.
///
/// ```
/// use scanprep::artifact::processing_tag;
///
/// assert_eq!(
///     processing_tag(true, false),
///     "keep_all_points_00_view_no_global_scan_alignment"
/// );
/// ```
pub fn processing_tag(only_zero_view: bool, apply_alignment: bool) -> String {
    let mut tag = String::from(if only_zero_view {
        "keep_all_points_00_view"
    } else {
        "keep_all_points"
    });
    tag.push_str(if apply_alignment {
        "_with_global_scan_alignment"
    } else {
        "_no_global_scan_alignment"
    });
    tag
}

/// Path of the artifact for `tag` under `save_dir`.
pub fn artifact_path(save_dir: &Path, tag: &str) -> PathBuf {
    save_dir
        .join(tag)
        .join(format!("{}.{}", tag, ARTIFACT_EXTENSION))
}

/// Writes the registry and records, replacing any existing artifact.
///
/// The tagged subdirectory is created if needed.
///
/// # Errors
/// Returns an error if the directory cannot be created or the file written.
pub fn save_artifact(
    registry: &ScanRegistry,
    scans: &[ScanRecord],
    save_dir: &Path,
    tag: &str,
) -> Result<PathBuf, ScanprepError> {
    let path = artifact_path(save_dir, tag);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ScanprepError::WriteFile {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file = File::create(&path).map_err(|source| ScanprepError::WriteFile {
        path: path.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    // Borrowed mirror of PersistedArtifact so records are not cloned.
    #[derive(Serialize)]
    struct ArtifactRef<'a> {
        registry: &'a ScanRegistry,
        scans: &'a [ScanRecord],
    }

    bincode::serialize_into(&mut writer, &ArtifactRef { registry, scans }).map_err(|source| {
        ScanprepError::ArtifactWrite {
            path: path.clone(),
            source,
        }
    })?;
    writer.flush().map_err(|source| ScanprepError::WriteFile {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// Reads an artifact written by [`save_artifact`].
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
pub fn load_artifact(path: &Path) -> Result<PersistedArtifact, ScanprepError> {
    let file = File::open(path).map_err(|source| ScanprepError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    bincode::deserialize_from(reader).map_err(|source| ScanprepError::ArtifactRead {
        path: path.to_path_buf(),
        source,
    })
}
