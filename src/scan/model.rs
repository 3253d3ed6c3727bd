//! Loaded scan records.
//!
//! A [`ScanRecord`] is what the loader hands back for one scan and what the
//! artifact stores. Records are plain data: once built they are never mutated
//! by the batch driver.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::bbox::Box3D;
use super::ids::ScanId;

/// One annotated object of a scan with its point cloud.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanObject {
    /// Object id from the scan's aggregation file.
    pub object_id: u32,

    /// Raw instance label, e.g. "office chair".
    pub instance_label: String,

    /// Coarse semantic class, if the registry maps the instance label.
    pub semantic_class: Option<String>,

    /// N×3 point positions.
    pub points: Array2<f32>,

    /// N×3 colors in `[0, 1]`.
    pub colors: Array2<f32>,
}

impl ScanObject {
    /// Number of points in the object.
    pub fn num_points(&self) -> usize {
        self.points.nrows()
    }

    /// The tightest axis-aligned box around the object's points.
    pub fn bounding_box(&self) -> Option<Box3D> {
        Box3D::enclosing(self.points.view())
    }
}

/// Outcome of overlaying precomputed ("hardcoded") boxes onto a scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoxOverlay {
    /// No box directory was configured.
    NotRequested,
    /// Boxes were read and replaced the native ones.
    Applied { count: usize },
    /// The box file for this scan does not exist.
    Missing,
    /// The box file exists but could not be used.
    Malformed { reason: String },
}

impl BoxOverlay {
    /// Returns true if the overlay was requested but did not apply.
    pub fn is_failure(&self) -> bool {
        matches!(self, BoxOverlay::Missing | BoxOverlay::Malformed { .. })
    }
}

impl fmt::Display for BoxOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxOverlay::NotRequested => write!(f, "not requested"),
            BoxOverlay::Applied { count } => write!(f, "applied ({} boxes)", count),
            BoxOverlay::Missing => write!(f, "missing"),
            BoxOverlay::Malformed { reason } => write!(f, "malformed: {}", reason),
        }
    }
}

/// A fully loaded scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub scan_id: ScanId,

    /// Annotated objects with their (possibly aligned) points.
    pub objects: Vec<ScanObject>,

    /// Per-object boxes; replaced wholesale when hardcoded boxes apply.
    pub boxes: Vec<Box3D>,

    /// Whether the scan's alignment transform was applied.
    pub aligned: bool,

    pub overlay: BoxOverlay,
}

impl ScanRecord {
    /// Total number of points over all objects.
    pub fn num_points(&self) -> usize {
        self.objects.iter().map(ScanObject::num_points).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_overlay_failure_flag() {
        assert!(!BoxOverlay::NotRequested.is_failure());
        assert!(!BoxOverlay::Applied { count: 3 }.is_failure());
        assert!(BoxOverlay::Missing.is_failure());
        assert!(BoxOverlay::Malformed {
            reason: "bad".into()
        }
        .is_failure());
    }

    #[test]
    fn test_overlay_display() {
        assert_eq!(
            BoxOverlay::Applied { count: 4 }.to_string(),
            "applied (4 boxes)"
        );
        assert_eq!(BoxOverlay::Missing.to_string(), "missing");
    }

    #[test]
    fn test_record_point_count() {
        let object = ScanObject {
            object_id: 0,
            instance_label: "chair".into(),
            semantic_class: Some("chair".into()),
            points: array![[0.0f32, 0.0, 0.0], [1.0, 1.0, 1.0]],
            colors: array![[0.5f32, 0.5, 0.5], [0.5, 0.5, 0.5]],
        };
        let record = ScanRecord {
            scan_id: ScanId::new("scene0000_00"),
            boxes: object.bounding_box().into_iter().collect(),
            objects: vec![object.clone(), object],
            aligned: false,
            overlay: BoxOverlay::NotRequested,
        };
        assert_eq!(record.num_points(), 4);
        assert_eq!(record.boxes.len(), 1);
    }
}
