//! Scan data model and loading.
//!
//! This module holds everything needed to turn one scan directory into a
//! [`ScanRecord`]:
//!
//! - [`ScanRegistry`]: class mappings and alignment matrices, loaded once
//! - [`GeometryReader`]: the seam to the on-disk geometry format
//! - [`load_scan`]: geometry + optional alignment + optional box overlay
//!
//! # Example
//!
//! ```no_run
//! use scanprep::scan::{load_scan, LoadOptions, ScanId, ScanNetReader, ScanRegistry};
//!
//! let registry = ScanRegistry::default();
//! let reader = ScanNetReader::new("/data/scannet/scans");
//! let record = load_scan(
//!     &ScanId::new("scene0000_00"),
//!     &registry,
//!     &reader,
//!     &LoadOptions::default(),
//! )?;
//! println!("{} objects", record.objects.len());
//! # Ok::<(), scanprep::ScanprepError>(())
//! ```

mod bbox;
mod ids;
mod loader;
mod model;
mod reader;
mod registry;
mod transform;

pub use bbox::{Box3D, BOX_COLUMNS};
pub use ids::{ScanId, ZERO_VIEW_SUFFIX};
pub use loader::{
    box_row_count, load_scan, pred_boxes_path, read_box_array, LoadOptions, PRED_BOXES_SUFFIX,
};
pub use model::{BoxOverlay, ScanObject, ScanRecord};
pub use reader::{GeometryReader, RawObject, ScanNetReader};
pub use registry::{RegistryPaths, ScanRegistry};
pub use transform::AlignmentTransform;
