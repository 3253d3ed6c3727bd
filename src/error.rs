use std::path::PathBuf;
use thiserror::Error;

use crate::scan::ScanId;

/// The main error type for scanprep operations.
#[derive(Debug, Error)]
pub enum ScanprepError {
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse mapping file {path}: {source}")]
    MappingParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Alignment matrix for {scan_id} has {len} values (expected 16)")]
    InvalidAlignment { scan_id: ScanId, len: usize },

    #[error("Invalid scan geometry in {path}: {message}")]
    GeometryParse { path: PathBuf, message: String },

    #[error("Failed to read box array {path}: {message}")]
    BoxArray { path: PathBuf, message: String },

    #[error("Failed to write artifact {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("Failed to read artifact {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("Invalid worker count {0} (use -1 for auto or a positive number)")]
    InvalidWorkerCount(i64),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to load scan {scan_id}: {source}")]
    ScanFailed {
        scan_id: ScanId,
        #[source]
        source: Box<ScanprepError>,
    },

    #[error("Failed to render report: {0}")]
    Report(#[source] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
