//! Axis-aligned 3D bounding boxes in center/size form.

use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Number of leading columns a box row must carry: `cx, cy, cz, dx, dy, dz`.
pub const BOX_COLUMNS: usize = 6;

/// An axis-aligned 3D bounding box.
///
/// Like the 2D boxes in annotation tooling, the constructor does not reject
/// negative sizes; a malformed detector row is still representable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Box3D {
    pub center: [f64; 3],
    pub size: [f64; 3],
}

impl Box3D {
    /// Creates a box from its center and edge lengths.
    #[inline]
    pub fn new(center: [f64; 3], size: [f64; 3]) -> Self {
        Self { center, size }
    }

    /// Creates a box from min and max corners.
    pub fn from_min_max(min: [f64; 3], max: [f64; 3]) -> Self {
        let mut center = [0.0; 3];
        let mut size = [0.0; 3];
        for axis in 0..3 {
            center[axis] = (min[axis] + max[axis]) / 2.0;
            size[axis] = max[axis] - min[axis];
        }
        Self { center, size }
    }

    /// Builds a box from a detector row (`cx, cy, cz, dx, dy, dz, ...`).
    ///
    /// Returns `None` when the row has fewer than [`BOX_COLUMNS`] values.
    pub fn from_row(row: ArrayView1<'_, f64>) -> Option<Self> {
        if row.len() < BOX_COLUMNS {
            return None;
        }
        Some(Self::new(
            [row[0], row[1], row[2]],
            [row[3], row[4], row[5]],
        ))
    }

    /// Returns the tightest box enclosing an N×3 point array.
    ///
    /// Returns `None` for an empty array.
    pub fn enclosing(points: ArrayView2<'_, f32>) -> Option<Self> {
        if points.nrows() == 0 {
            return None;
        }

        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for point in points.axis_iter(Axis(0)) {
            for axis in 0..3 {
                let v = point[axis] as f64;
                min[axis] = min[axis].min(v);
                max[axis] = max[axis].max(v);
            }
        }
        Some(Self::from_min_max(min, max))
    }

    /// Returns the minimum corner.
    pub fn min(&self) -> [f64; 3] {
        [
            self.center[0] - self.size[0] / 2.0,
            self.center[1] - self.size[1] / 2.0,
            self.center[2] - self.size[2] / 2.0,
        ]
    }

    /// Returns the maximum corner.
    pub fn max(&self) -> [f64; 3] {
        [
            self.center[0] + self.size[0] / 2.0,
            self.center[1] + self.size[1] / 2.0,
            self.center[2] + self.size[2] / 2.0,
        ]
    }
}
