//! Max-objects report types.

use serde::Serialize;
use std::fmt;

use crate::scan::ScanId;

/// Result of scanning precomputed box files for the largest object count.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MaxObjectsReport {
    /// Largest number of box rows seen in any examined scan.
    pub max_objects: usize,
    /// First scan that reached `max_objects`.
    pub scan_id: Option<ScanId>,
    /// Number of box files read.
    pub scans_examined: usize,
}

impl MaxObjectsReport {
    /// Folds one scan's box count into the running maximum.
    pub fn observe(&mut self, scan_id: &ScanId, count: usize) {
        self.scans_examined += 1;
        if self.scan_id.is_none() || count > self.max_objects {
            self.max_objects = count;
            self.scan_id = Some(scan_id.clone());
        }
    }
}

/// Prints only the maximum, so the output can be consumed by scripts.
impl fmt::Display for MaxObjectsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.max_objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_keeps_first_maximum() {
        let mut report = MaxObjectsReport::default();
        report.observe(&ScanId::new("a_00"), 3);
        report.observe(&ScanId::new("b_00"), 7);
        report.observe(&ScanId::new("c_00"), 7);
        report.observe(&ScanId::new("d_00"), 2);

        assert_eq!(report.max_objects, 7);
        assert_eq!(report.scan_id, Some(ScanId::new("b_00")));
        assert_eq!(report.scans_examined, 4);
        assert_eq!(report.to_string(), "7\n");
    }

    #[test]
    fn test_zero_count_scan_is_recorded() {
        let mut report = MaxObjectsReport::default();
        report.observe(&ScanId::new("empty_00"), 0);
        assert_eq!(report.scan_id, Some(ScanId::new("empty_00")));
        assert_eq!(report.max_objects, 0);
    }
}
