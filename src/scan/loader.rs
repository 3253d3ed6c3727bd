//! Per-scan loading: geometry, alignment and the hardcoded-box overlay.

use ndarray::{Array2, ArrayD, Axis, Ix2};
use ndarray_npy::{read_npy, ReadNpyError};
use std::path::{Path, PathBuf};

use super::bbox::{Box3D, BOX_COLUMNS};
use super::ids::ScanId;
use super::model::{BoxOverlay, ScanObject, ScanRecord};
use super::reader::GeometryReader;
use super::registry::ScanRegistry;
use crate::error::ScanprepError;

/// Suffix of the per-scan precomputed box file.
pub const PRED_BOXES_SUFFIX: &str = "_pred_boxes.npy";

/// Options controlling how each scan is loaded.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// Apply the registry's alignment transform to every point.
    pub apply_alignment: bool,
    /// Directory holding `<scan_id>_pred_boxes.npy` files to overlay.
    pub hardcoded_boxes_dir: Option<PathBuf>,
}

/// Path of the precomputed box file for a scan.
pub fn pred_boxes_path(dir: &Path, scan_id: &ScanId) -> PathBuf {
    dir.join(format!("{}{}", scan_id, PRED_BOXES_SUFFIX))
}

/// Loads one scan.
///
/// Geometry comes from `reader`. With `apply_alignment` set and a transform
/// registered for the scan, every object is moved into the aligned frame
/// before its box is derived. A configured box directory then overrides the
/// derived boxes; a missing or unusable box file only shows up in
/// [`ScanRecord::overlay`].
///
/// # Errors
/// Returns an error if the scan geometry cannot be read.
pub fn load_scan<R: GeometryReader + ?Sized>(
    scan_id: &ScanId,
    registry: &ScanRegistry,
    reader: &R,
    opts: &LoadOptions,
) -> Result<ScanRecord, ScanprepError> {
    let raw_objects = reader.read_objects(scan_id)?;

    let transform = if opts.apply_alignment {
        let transform = registry.alignment_of(scan_id);
        if transform.is_none() {
            log::warn!("{}: no alignment matrix registered, keeping scan frame", scan_id);
        }
        transform
    } else {
        None
    };

    let objects: Vec<ScanObject> = raw_objects
        .into_iter()
        .map(|raw| {
            let points = match transform {
                Some(t) => t.apply_to_points(&raw.points),
                None => raw.points,
            };
            ScanObject {
                object_id: raw.object_id,
                semantic_class: registry
                    .semantic_class_of(&raw.instance_label)
                    .map(str::to_owned),
                instance_label: raw.instance_label,
                points,
                colors: raw.colors,
            }
        })
        .collect();

    let mut boxes: Vec<Box3D> = objects.iter().filter_map(ScanObject::bounding_box).collect();

    let overlay = match &opts.hardcoded_boxes_dir {
        None => BoxOverlay::NotRequested,
        Some(dir) => {
            let path = pred_boxes_path(dir, scan_id);
            match read_hardcoded_boxes(&path) {
                Ok(Some(hardcoded)) => {
                    let count = hardcoded.len();
                    boxes = hardcoded;
                    BoxOverlay::Applied { count }
                }
                Ok(None) => BoxOverlay::Missing,
                Err(err) => BoxOverlay::Malformed {
                    reason: err.to_string(),
                },
            }
        }
    };

    Ok(ScanRecord {
        scan_id: scan_id.clone(),
        objects,
        boxes,
        aligned: transform.is_some(),
        overlay,
    })
}

/// Reads a box file of any numeric or boolean element type and rank, widened
/// to `f64`.
///
/// # Errors
/// Returns [`ScanprepError::BoxArray`] if the file cannot be read or holds an
/// element type with no numeric reading.
fn read_npy_widened(path: &Path) -> Result<ArrayD<f64>, ScanprepError> {
    let box_array_error = |err: ReadNpyError| ScanprepError::BoxArray {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    // Only a descriptor mismatch moves on to the next element type.
    macro_rules! try_element_types {
        ($($ty:ty),+) => {$(
            match read_npy::<_, ArrayD<$ty>>(path) {
                Ok(array) => return Ok(array.mapv(|v| v as f64)),
                Err(ReadNpyError::WrongDescriptor(_)) => {}
                Err(err) => return Err(box_array_error(err)),
            }
        )+};
    }
    try_element_types!(f64, f32, i64, i32, i16, i8, u64, u32, u16, u8);

    read_npy::<_, ArrayD<bool>>(path)
        .map(|array| array.mapv(|v| if v { 1.0 } else { 0.0 }))
        .map_err(box_array_error)
}

/// Number of boxes in a box file: the length of its first axis.
///
/// # Errors
/// Returns [`ScanprepError::BoxArray`] if the file cannot be read or holds a
/// zero-dimensional array.
pub fn box_row_count(path: &Path) -> Result<usize, ScanprepError> {
    let array = read_npy_widened(path)?;
    array
        .shape()
        .first()
        .copied()
        .ok_or_else(|| ScanprepError::BoxArray {
            path: path.to_path_buf(),
            message: "zero-dimensional array has no rows".to_string(),
        })
}

/// Reads a 2-D box array, widening the elements to `f64`.
///
/// An empty 1-D array reads as zero boxes.
///
/// # Errors
/// Returns [`ScanprepError::BoxArray`] if the file cannot be read or is not
/// a 2-D array.
pub fn read_box_array(path: &Path) -> Result<Array2<f64>, ScanprepError> {
    let array = read_npy_widened(path)?;
    if array.ndim() == 1 && array.is_empty() {
        return Ok(Array2::zeros((0, BOX_COLUMNS)));
    }

    let shape = array.shape().to_vec();
    array
        .into_dimensionality::<Ix2>()
        .map_err(|_| ScanprepError::BoxArray {
            path: path.to_path_buf(),
            message: format!("expected a 2-D array of boxes, got shape {:?}", shape),
        })
}

/// Reads `cx, cy, cz, dx, dy, dz` rows from a box file.
///
/// Returns `Ok(None)` if the file does not exist.
fn read_hardcoded_boxes(path: &Path) -> Result<Option<Vec<Box3D>>, ScanprepError> {
    if !path.is_file() {
        return Ok(None);
    }

    let array = read_box_array(path)?;
    if array.nrows() > 0 && array.ncols() < BOX_COLUMNS {
        return Err(ScanprepError::BoxArray {
            path: path.to_path_buf(),
            message: format!(
                "{} columns per box, expected at least {}",
                array.ncols(),
                BOX_COLUMNS
            ),
        });
    }

    Ok(Some(
        array
            .axis_iter(Axis(0))
            .filter_map(Box3D::from_row)
            .collect(),
    ))
}
