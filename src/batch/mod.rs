//! Batch driver: scan enumeration, filtering and parallel loading.
//!
//! Scan ids come either from the immediate subdirectories of the scan root or
//! from the official train/val split files. They are loaded on a fixed-size
//! worker pool with an ordered parallel map: `records[i]` always belongs to
//! the i-th submitted id, whichever worker loaded it.

mod report;

pub use report::{BatchOutcome, ScanFailure};

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use log::{info, warn};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::ScanprepError;
use crate::scan::{load_scan, GeometryReader, LoadOptions, ScanId, ScanRecord, ScanRegistry};

/// Worker count value meaning "pick automatically".
pub const AUTO_WORKERS: i64 = -1;

/// Where scan ids come from.
#[derive(Clone, Debug)]
pub enum ScanSource {
    /// Every immediate subdirectory of this root is a scan.
    Directory(PathBuf),
    /// Newline-delimited train and val split files, concatenated.
    SplitFiles { train: PathBuf, val: PathBuf },
}

/// What to do when a single scan fails to load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FailurePolicy {
    /// Stop the batch and return the error.
    #[default]
    Abort,
    /// Record the failure and keep loading the remaining scans.
    Skip,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Abort => f.write_str("abort"),
            FailurePolicy::Skip => f.write_str("skip"),
        }
    }
}

/// Read-only state every worker borrows.
pub struct BatchContext<'a, R: ?Sized> {
    pub registry: &'a ScanRegistry,
    pub reader: &'a R,
    pub options: &'a LoadOptions,
    pub progress: ProgressBar,
}

impl<'a, R: GeometryReader + ?Sized> BatchContext<'a, R> {
    /// Creates a context with a hidden progress bar.
    pub fn new(registry: &'a ScanRegistry, reader: &'a R, options: &'a LoadOptions) -> Self {
        Self {
            registry,
            reader,
            options,
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports progress on the given bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }
}

/// Enumerates scan ids from `source`.
///
/// Directory listings are sorted by name. Split files keep their line order
/// with duplicates removed (first occurrence wins).
///
/// # Errors
/// Returns an error if the directory or a split file cannot be read.
pub fn enumerate_scan_ids(source: &ScanSource) -> Result<Vec<ScanId>, ScanprepError> {
    match source {
        ScanSource::Directory(root) => list_scan_dirs(root),
        ScanSource::SplitFiles { train, val } => {
            let mut seen = HashSet::new();
            let mut ids = read_split_file(train)?;
            ids.extend(read_split_file(val)?);
            ids.retain(|id| seen.insert(id.clone()));
            Ok(ids)
        }
    }
}

/// Lists the names of the immediate subdirectories of `root`.
pub fn list_scan_dirs(root: &Path) -> Result<Vec<ScanId>, ScanprepError> {
    let mut ids = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry.map_err(|source| ScanprepError::ReadFile {
            path: root.to_path_buf(),
            source: source.into(),
        })?;

        if entry.file_type().is_dir() {
            ids.push(ScanId::new(entry.file_name().to_string_lossy()));
        }
    }

    ids.sort();
    Ok(ids)
}

/// Reads a newline-delimited split file, skipping blank lines.
pub fn read_split_file(path: &Path) -> Result<Vec<ScanId>, ScanprepError> {
    let content = fs::read_to_string(path).map_err(|source| ScanprepError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(ScanId::new)
        .collect())
}

/// Keeps only primary-view (`..._00`) scans, preserving order.
pub fn keep_zero_view(ids: Vec<ScanId>) -> Vec<ScanId> {
    ids.into_iter().filter(ScanId::is_zero_view).collect()
}

/// Resolves the requested worker count.
///
/// [`AUTO_WORKERS`] picks the available parallelism capped by the item count.
/// The result is always at least 1.
///
/// # Errors
/// Returns [`ScanprepError::InvalidWorkerCount`] for 0 or values below -1.
pub fn resolve_worker_count(requested: i64, n_items: usize) -> Result<usize, ScanprepError> {
    match requested {
        AUTO_WORKERS => {
            let available = std::thread::available_parallelism().map_or(1, |n| n.get());
            Ok(available.min(n_items).max(1))
        }
        n if n > 0 => usize::try_from(n).map_err(|_| ScanprepError::InvalidWorkerCount(n)),
        n => Err(ScanprepError::InvalidWorkerCount(n)),
    }
}

/// Static chunk size: `floor(items / workers)`, at least 1.
pub fn chunk_size(n_items: usize, workers: usize) -> usize {
    (n_items / workers.max(1)).max(1)
}

/// Loads every scan in `scan_ids` on a pool of `workers` threads.
///
/// Records come back in submission order. Under [`FailurePolicy::Abort`] the
/// first failure observed stops the batch; under [`FailurePolicy::Skip`]
/// failures are collected in the outcome.
///
/// # Errors
/// Returns an error if the pool cannot be built, or a wrapped per-scan error
/// under the abort policy.
pub fn load_scans<R: GeometryReader + ?Sized>(
    scan_ids: &[ScanId],
    ctx: &BatchContext<'_, R>,
    workers: usize,
    policy: FailurePolicy,
) -> Result<BatchOutcome, ScanprepError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("scanprep-worker-{i}"))
        .build()?;
    let min_len = chunk_size(scan_ids.len(), workers);

    let load_one = |scan_id: &ScanId| -> Result<ScanRecord, ScanprepError> {
        let result = load_scan(scan_id, ctx.registry, ctx.reader, ctx.options);
        if let Ok(record) = &result {
            info!("{} box overlay: {}", scan_id, record.overlay);
        }
        ctx.progress.inc(1);
        result
    };

    let outcome = pool.install(|| -> Result<BatchOutcome, ScanprepError> {
        match policy {
            FailurePolicy::Abort => {
                let records = scan_ids
                    .par_iter()
                    .with_min_len(min_len)
                    .map(|scan_id| {
                        load_one(scan_id).map_err(|source| ScanprepError::ScanFailed {
                            scan_id: scan_id.clone(),
                            source: Box::new(source),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(BatchOutcome {
                    records,
                    failures: Vec::new(),
                })
            }
            FailurePolicy::Skip => {
                let results: Vec<_> = scan_ids
                    .par_iter()
                    .with_min_len(min_len)
                    .map(|scan_id| (scan_id, load_one(scan_id)))
                    .collect();

                let mut outcome = BatchOutcome::default();
                for (scan_id, result) in results {
                    match result {
                        Ok(record) => outcome.records.push(record),
                        Err(err) => {
                            warn!("Skipping {}: {}", scan_id, err);
                            outcome.failures.push(ScanFailure {
                                scan_id: scan_id.clone(),
                                message: err.to_string(),
                            });
                        }
                    }
                }
                Ok(outcome)
            }
        }
    })?;

    ctx.progress.finish_and_clear();
    Ok(outcome)
}
