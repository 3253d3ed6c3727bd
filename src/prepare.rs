//! The `prepare` pipeline: enumerate, filter, load in parallel, save.

use std::path::PathBuf;
use std::time::Instant;

use indicatif::ProgressBar;
use log::{info, warn};

use crate::artifact::{processing_tag, save_artifact};
use crate::batch::{
    enumerate_scan_ids, keep_zero_view, load_scans, resolve_worker_count, BatchContext,
    BatchOutcome, FailurePolicy, ScanSource,
};
use crate::error::ScanprepError;
use crate::scan::{LoadOptions, RegistryPaths, ScanNetReader, ScanRegistry};

/// Everything the pipeline needs, resolved from the command line.
///
/// Passed by reference into each stage; nothing is read from global state.
#[derive(Clone, Debug)]
pub struct PrepareConfig {
    /// Root holding one subdirectory per scan.
    pub top_scan_dir: PathBuf,
    /// Root under which the tagged output directory is created.
    pub top_save_dir: PathBuf,
    /// Requested worker count; -1 means automatic.
    pub n_processes: i64,
    pub only_zero_view: bool,
    pub verbose: bool,
    pub apply_alignment: bool,
    pub source: ScanSource,
    pub hardcoded_boxes_dir: Option<PathBuf>,
    pub registry_paths: RegistryPaths,
    pub on_scan_error: FailurePolicy,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct PrepareSummary {
    pub tag: String,
    pub artifact: PathBuf,
    pub outcome: BatchOutcome,
}

/// Runs the full preprocessing pipeline.
///
/// # Errors
/// Configuration and I/O errors surface directly. A scan failure aborts the
/// run unless `on_scan_error` is [`FailurePolicy::Skip`].
pub fn prepare(config: &PrepareConfig) -> Result<PrepareSummary, ScanprepError> {
    validate_config(config)?;
    let tag = processing_tag(config.only_zero_view, config.apply_alignment);

    let mut scan_ids = enumerate_scan_ids(&config.source)?;
    info!("{} scans found.", scan_ids.len());

    if config.only_zero_view {
        scan_ids = keep_zero_view(scan_ids);
    }
    info!("Working with {} scans.", scan_ids.len());

    let registry = ScanRegistry::load(&config.top_scan_dir, &config.registry_paths)?;
    let reader = ScanNetReader::new(&config.top_scan_dir);
    let options = LoadOptions {
        apply_alignment: config.apply_alignment,
        hardcoded_boxes_dir: config.hardcoded_boxes_dir.clone(),
    };
    let workers = resolve_worker_count(config.n_processes, scan_ids.len())?;

    info!("Loading scans in memory...");
    let start = Instant::now();

    let progress = if config.verbose {
        ProgressBar::new(scan_ids.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    let ctx = BatchContext::new(&registry, &reader, &options).with_progress(progress);
    let outcome = load_scans(&scan_ids, &ctx, workers, config.on_scan_error)?;

    info!(
        "Loading raw data took {:.4} minutes.",
        start.elapsed().as_secs_f64() / 60.0
    );
    if !outcome.is_complete() {
        warn!("{}", outcome);
    }

    info!("Saving the results.");
    let artifact = save_artifact(&registry, &outcome.records, &config.top_save_dir, &tag)?;
    info!("All done.");

    Ok(PrepareSummary {
        tag,
        artifact,
        outcome,
    })
}

fn validate_config(config: &PrepareConfig) -> Result<(), ScanprepError> {
    if !config.top_scan_dir.is_dir() {
        return Err(ScanprepError::InvalidConfig(format!(
            "scan directory '{}' does not exist",
            config.top_scan_dir.display()
        )));
    }

    if let Some(dir) = &config.hardcoded_boxes_dir {
        if !dir.is_dir() {
            return Err(ScanprepError::InvalidConfig(format!(
                "hardcoded box directory '{}' does not exist",
                dir.display()
            )));
        }
    }

    Ok(())
}
