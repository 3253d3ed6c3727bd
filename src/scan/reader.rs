//! Scan geometry readers.
//!
//! The loader only needs per-object point clouds; how they are parsed from
//! disk sits behind [`GeometryReader`]. [`ScanNetReader`] handles the standard
//! ScanNet release layout:
//!
//! ```text
//! <scans_dir>/<scan_id>/<scan_id>_vh_clean_2.ply
//! <scans_dir>/<scan_id>/<scan_id>_vh_clean_2.0.010000.segs.json
//! <scans_dir>/<scan_id>/<scan_id>.aggregation.json
//! ```

use ndarray::Array2;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::ids::ScanId;
use crate::error::ScanprepError;

const MESH_SUFFIX: &str = "_vh_clean_2.ply";
const SEGS_SUFFIX: &str = "_vh_clean_2.0.010000.segs.json";
const AGGREGATION_SUFFIX: &str = ".aggregation.json";

/// An object as read from disk, before registry lookups.
#[derive(Clone, Debug, PartialEq)]
pub struct RawObject {
    pub object_id: u32,
    pub instance_label: String,
    /// N×3 positions.
    pub points: Array2<f32>,
    /// N×3 colors in `[0, 1]`.
    pub colors: Array2<f32>,
}

/// Reads the per-object geometry of a scan.
///
/// Implementations are shared by reference across all workers, hence `Sync`.
pub trait GeometryReader: Sync {
    /// Reads every annotated object of `scan_id`.
    fn read_objects(&self, scan_id: &ScanId) -> Result<Vec<RawObject>, ScanprepError>;
}

/// Reader for the ScanNet v2 directory layout.
#[derive(Clone, Debug)]
pub struct ScanNetReader {
    scans_dir: PathBuf,
}

#[derive(Deserialize)]
struct SegsFile {
    #[serde(rename = "segIndices")]
    seg_indices: Vec<u32>,
}

#[derive(Deserialize)]
struct AggregationFile {
    #[serde(rename = "segGroups")]
    seg_groups: Vec<SegGroup>,
}

#[derive(Deserialize)]
struct SegGroup {
    #[serde(rename = "objectId")]
    object_id: u32,
    label: String,
    segments: Vec<u32>,
}

struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
}

impl ScanNetReader {
    pub fn new(scans_dir: impl Into<PathBuf>) -> Self {
        Self {
            scans_dir: scans_dir.into(),
        }
    }

    fn scan_file(&self, scan_id: &ScanId, suffix: &str) -> PathBuf {
        self.scans_dir
            .join(scan_id.as_str())
            .join(format!("{}{}", scan_id, suffix))
    }
}

impl GeometryReader for ScanNetReader {
    fn read_objects(&self, scan_id: &ScanId) -> Result<Vec<RawObject>, ScanprepError> {
        let mesh_path = self.scan_file(scan_id, MESH_SUFFIX);
        let segs_path = self.scan_file(scan_id, SEGS_SUFFIX);
        let aggregation_path = self.scan_file(scan_id, AGGREGATION_SUFFIX);

        let vertices = read_mesh_vertices(&mesh_path)?;
        let segs: SegsFile = read_scan_json(&segs_path)?;
        let aggregation: AggregationFile = read_scan_json(&aggregation_path)?;

        if segs.seg_indices.len() != vertices.len() {
            return Err(ScanprepError::GeometryParse {
                path: segs_path,
                message: format!(
                    "{} segment indices for {} mesh vertices",
                    segs.seg_indices.len(),
                    vertices.len()
                ),
            });
        }

        let mut segment_to_vertices: HashMap<u32, Vec<usize>> = HashMap::new();
        for (vertex_idx, segment) in segs.seg_indices.iter().enumerate() {
            segment_to_vertices
                .entry(*segment)
                .or_default()
                .push(vertex_idx);
        }

        let mut objects = Vec::with_capacity(aggregation.seg_groups.len());
        for group in aggregation.seg_groups {
            let members: Vec<usize> = group
                .segments
                .iter()
                .filter_map(|segment| segment_to_vertices.get(segment))
                .flatten()
                .copied()
                .collect();

            if members.is_empty() {
                log::debug!(
                    "{}: object {} ({}) has no vertices, skipping",
                    scan_id,
                    group.object_id,
                    group.label
                );
                continue;
            }

            let points = Array2::from_shape_fn((members.len(), 3), |(row, col)| {
                vertices[members[row]].position[col]
            });
            let colors = Array2::from_shape_fn((members.len(), 3), |(row, col)| {
                vertices[members[row]].color[col]
            });

            objects.push(RawObject {
                object_id: group.object_id,
                instance_label: group.label,
                points,
                colors,
            });
        }

        Ok(objects)
    }
}

fn read_scan_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ScanprepError> {
    let content = fs::read_to_string(path).map_err(|source| ScanprepError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ScanprepError::GeometryParse {
        path: path.to_path_buf(),
        message: source.to_string(),
    })
}

fn read_mesh_vertices(path: &Path) -> Result<Vec<Vertex>, ScanprepError> {
    let file = File::open(path).map_err(|source| ScanprepError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|source| ScanprepError::GeometryParse {
            path: path.to_path_buf(),
            message: source.to_string(),
        })?;

    let Some(elements) = ply.payload.get("vertex") else {
        return Err(ScanprepError::GeometryParse {
            path: path.to_path_buf(),
            message: "no 'vertex' element".to_string(),
        });
    };

    elements
        .iter()
        .enumerate()
        .map(|(idx, element)| {
            let coord = |name: &str| {
                element
                    .get(name)
                    .and_then(scalar_value)
                    .ok_or_else(|| ScanprepError::GeometryParse {
                        path: path.to_path_buf(),
                        message: format!("vertex {} has no numeric '{}' property", idx, name),
                    })
            };
            let position = [coord("x")? as f32, coord("y")? as f32, coord("z")? as f32];

            let color = match (
                element.get("red"),
                element.get("green"),
                element.get("blue"),
            ) {
                (Some(r), Some(g), Some(b)) => [color_value(r), color_value(g), color_value(b)],
                _ => [0.0; 3],
            };

            Ok(Vertex { position, color })
        })
        .collect()
}

fn scalar_value(property: &Property) -> Option<f64> {
    match *property {
        Property::Char(v) => Some(v as f64),
        Property::UChar(v) => Some(v as f64),
        Property::Short(v) => Some(v as f64),
        Property::UShort(v) => Some(v as f64),
        Property::Int(v) => Some(v as f64),
        Property::UInt(v) => Some(v as f64),
        Property::Float(v) => Some(v as f64),
        Property::Double(v) => Some(v),
        _ => None,
    }
}

// Integer channels are 0..=255; float channels are taken as already normalized.
fn color_value(property: &Property) -> f32 {
    match *property {
        Property::Float(v) => v,
        Property::Double(v) => v as f32,
        _ => scalar_value(property).map_or(0.0, |v| (v / 255.0) as f32),
    }
}
