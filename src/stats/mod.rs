//! Object-count statistics over precomputed box files.
//!
//! Used to size fixed-capacity object slots downstream: it reports the largest
//! number of detected boxes in any primary-view scan of a split.

mod report;

pub use report::MaxObjectsReport;

use std::path::Path;

use crate::batch::{keep_zero_view, read_split_file};
use crate::error::ScanprepError;
use crate::scan::{box_row_count, pred_boxes_path, ScanId};

/// Scans the box file of every primary-view id in `scan_ids`.
///
/// # Errors
/// Returns an error if any box file is missing or unreadable.
pub fn max_object_count(
    scan_ids: Vec<ScanId>,
    boxes_dir: &Path,
) -> Result<MaxObjectsReport, ScanprepError> {
    let mut report = MaxObjectsReport::default();

    for scan_id in keep_zero_view(scan_ids) {
        let path = pred_boxes_path(boxes_dir, &scan_id);
        let rows = box_row_count(&path)?;
        log::debug!("{}: {} boxes", scan_id, rows);
        report.observe(&scan_id, rows);
    }

    Ok(report)
}

/// Reads the split file and runs [`max_object_count`] over it.
pub fn max_object_count_for_split(
    split_file: &Path,
    boxes_dir: &Path,
) -> Result<MaxObjectsReport, ScanprepError> {
    let scan_ids = read_split_file(split_file)?;
    max_object_count(scan_ids, boxes_dir)
}
