#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use scanprep::scan::ScanId;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// ScanNet-style ids: `sceneNNNN_VV`.
pub fn arb_scan_id() -> impl Strategy<Value = ScanId> {
    (0u32..800, 0u32..4).prop_map(|(scene, view)| ScanId::new(format!("scene{scene:04}_{view:02}")))
}

/// Free-form ids, including ones shorter than the view suffix.
pub fn arb_loose_scan_id() -> impl Strategy<Value = ScanId> {
    "[a-z0-9_]{0,12}".prop_map(ScanId::new)
}

pub fn arb_unique_scan_ids(max: usize) -> impl Strategy<Value = Vec<ScanId>> {
    prop::collection::btree_set(arb_scan_id(), 0..max).prop_map(|set| set.into_iter().collect())
}
