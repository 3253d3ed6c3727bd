#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use ndarray_npy::write_npy;
use scanprep::scan::{pred_boxes_path, RegistryPaths, ScanId};

/// Writes a minimal ScanNet scan: two objects made of four vertices each,
/// shifted along x by `offset`.
pub fn write_scan(scans_dir: &Path, scan_id: &str, offset: f32) {
    let dir = scans_dir.join(scan_id);
    fs::create_dir_all(&dir).expect("create scan dir");

    let mut ply = String::from(
        "ply\nformat ascii 1.0\nelement vertex 8\n\
         property float x\nproperty float y\nproperty float z\n\
         property uchar red\nproperty uchar green\nproperty uchar blue\n\
         end_header\n",
    );
    for i in 0..8 {
        let corner = (i % 4) as f32;
        let base = if i < 4 { 0.0 } else { 10.0 };
        ply.push_str(&format!(
            "{} {} {} 128 128 128\n",
            offset + base + corner,
            corner,
            corner / 2.0
        ));
    }
    fs::write(dir.join(format!("{scan_id}_vh_clean_2.ply")), ply).expect("write mesh");

    fs::write(
        dir.join(format!("{scan_id}_vh_clean_2.0.010000.segs.json")),
        format!(r#"{{"sceneId": "{scan_id}", "segIndices": [1, 1, 2, 2, 3, 3, 3, 3]}}"#),
    )
    .expect("write segs");

    fs::write(
        dir.join(format!("{scan_id}.aggregation.json")),
        format!(
            r#"{{"sceneId": "{scan_id}", "segGroups": [
                {{"id": 0, "objectId": 0, "label": "office chair", "segments": [1, 2]}},
                {{"id": 1, "objectId": 1, "label": "desk", "segments": [3]}}
            ]}}"#
        ),
    )
    .expect("write aggregation");
}

/// Creates a scan directory with no geometry files, so loading it fails.
pub fn write_broken_scan(scans_dir: &Path, scan_id: &str) {
    fs::create_dir_all(scans_dir.join(scan_id)).expect("create broken scan dir");
}

/// Writes the three mapping files. Every scan in `aligned` gets a +100 x shift.
pub fn write_mappings(dir: &Path, aligned: &[&str]) -> RegistryPaths {
    fs::create_dir_all(dir).expect("create mapping dir");
    let paths = RegistryPaths {
        idx_to_semantic_class: dir.join("scannet_idx_to_semantic_class.json"),
        instance_to_semantic_class: dir.join("scannet_instance_class_to_semantic_class.json"),
        axis_alignment: dir.join("scans_axis_alignment_matrices.json"),
    };

    fs::write(
        &paths.idx_to_semantic_class,
        r#"{"0": "chair", "1": "table"}"#,
    )
    .expect("write idx mapping");
    fs::write(
        &paths.instance_to_semantic_class,
        r#"{"office chair": "chair", "desk": "table"}"#,
    )
    .expect("write instance mapping");

    let entries: Vec<String> = aligned
        .iter()
        .map(|scan_id| format!(r#""{scan_id}": [1,0,0,100, 0,1,0,0, 0,0,1,0, 0,0,0,1]"#))
        .collect();
    fs::write(&paths.axis_alignment, format!("{{{}}}", entries.join(", ")))
        .expect("write alignment");

    paths
}

/// Writes `<scan_id>_pred_boxes.npy` with `rows` boxes of 7 columns.
pub fn write_boxes(dir: &Path, scan_id: &str, rows: usize) -> PathBuf {
    fs::create_dir_all(dir).expect("create boxes dir");
    let boxes = Array2::<f32>::from_shape_fn((rows, 7), |(row, col)| (row * 10 + col) as f32);
    let path = pred_boxes_path(dir, &ScanId::new(scan_id));
    write_npy(&path, &boxes).expect("write boxes");
    path
}

/// Writes a newline-delimited split file.
pub fn write_split(path: &Path, scan_ids: &[&str]) {
    let mut content = scan_ids.join("\n");
    content.push('\n');
    fs::write(path, content).expect("write split");
}
