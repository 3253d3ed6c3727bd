//! Rigid per-scan alignment transforms.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::ids::ScanId;
use crate::error::ScanprepError;

/// A homogeneous 4×4 transform stored row-major.
///
/// Only the upper 3×4 block is used: the 3×3 rotation and the translation
/// column. The bottom row is carried along so the matrix round-trips as read.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignmentTransform {
    matrix: [f64; 16],
}

impl AlignmentTransform {
    /// The identity transform.
    pub fn identity() -> Self {
        let mut matrix = [0.0; 16];
        for i in 0..4 {
            matrix[i * 4 + i] = 1.0;
        }
        Self { matrix }
    }

    /// Builds a transform from a row-major matrix.
    pub fn from_row_major(matrix: [f64; 16]) -> Self {
        Self { matrix }
    }

    /// Builds a transform from the flat list stored in the alignment file.
    ///
    /// # Errors
    /// Returns [`ScanprepError::InvalidAlignment`] unless exactly 16 values are given.
    pub fn from_flat(scan_id: &ScanId, values: &[f64]) -> Result<Self, ScanprepError> {
        let matrix: [f64; 16] =
            values
                .try_into()
                .map_err(|_| ScanprepError::InvalidAlignment {
                    scan_id: scan_id.clone(),
                    len: values.len(),
                })?;
        Ok(Self { matrix })
    }

    /// Returns the row-major matrix.
    pub fn as_row_major(&self) -> &[f64; 16] {
        &self.matrix
    }

    fn rotation(&self) -> Array2<f32> {
        Array2::from_shape_fn((3, 3), |(row, col)| self.matrix[row * 4 + col] as f32)
    }

    fn translation(&self) -> Array1<f32> {
        Array1::from_iter((0..3).map(|row| self.matrix[row * 4 + 3] as f32))
    }

    /// Applies the transform to an N×3 point array: `p' = R·p + t`.
    pub fn apply_to_points(&self, points: &Array2<f32>) -> Array2<f32> {
        let rotation = self.rotation();
        let translation = self.translation();
        points.dot(&rotation.t()) + &translation
    }
}

impl Default for AlignmentTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_identity_leaves_points_unchanged() {
        let points = array![[1.0f32, 2.0, 3.0], [-4.0, 0.5, 9.0]];
        let out = AlignmentTransform::identity().apply_to_points(&points);
        assert_eq!(out, points);
    }

    #[test]
    fn test_rotation_and_translation() {
        // 90 degrees about z, then shift by (10, 20, 30).
        let transform = AlignmentTransform::from_row_major([
            0.0, -1.0, 0.0, 10.0, //
            1.0, 0.0, 0.0, 20.0, //
            0.0, 0.0, 1.0, 30.0, //
            0.0, 0.0, 0.0, 1.0,
        ]);
        let points = array![[1.0f32, 0.0, 0.0], [0.0, 2.0, 1.0]];
        let out = transform.apply_to_points(&points);
        assert_eq!(out, array![[10.0f32, 21.0, 30.0], [8.0, 20.0, 31.0]]);
    }

    #[test]
    fn test_empty_point_array() {
        let points = Array2::<f32>::zeros((0, 3));
        let out = AlignmentTransform::identity().apply_to_points(&points);
        assert_eq!(out.dim(), (0, 3));
    }

    #[test]
    fn test_from_flat_rejects_wrong_length() {
        let err = AlignmentTransform::from_flat(&ScanId::new("scene0000_00"), &[1.0; 12])
            .expect_err("12 values");
        assert!(matches!(err, ScanprepError::InvalidAlignment { len: 12, .. }));
    }

    #[test]
    fn test_from_flat_accepts_sixteen_values() {
        let mut values = vec![0.0; 16];
        values[0] = 1.0;
        values[5] = 1.0;
        values[10] = 1.0;
        values[15] = 1.0;
        let transform =
            AlignmentTransform::from_flat(&ScanId::new("scene0000_00"), &values).expect("valid");
        assert_eq!(transform, AlignmentTransform::identity());
    }
}
