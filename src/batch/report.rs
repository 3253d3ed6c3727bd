//! Batch outcome types.

use std::fmt;

use crate::scan::{ScanId, ScanRecord};

/// A scan that failed to load under the `skip` policy.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanFailure {
    pub scan_id: ScanId,
    pub message: String,
}

impl fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scan_id, self.message)
    }
}

/// Result of loading a batch of scans.
///
/// `records` keeps the order in which scan ids were submitted, minus any
/// failures.
#[derive(Clone, Debug, Default)]
pub struct BatchOutcome {
    pub records: Vec<ScanRecord>,
    pub failures: Vec<ScanFailure>,
}

impl BatchOutcome {
    /// Number of scans whose box overlay was requested but did not apply.
    pub fn overlay_failure_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.overlay.is_failure())
            .count()
    }

    /// Returns true if every submitted scan loaded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Loaded {} scan(s), {} failed, {} without hardcoded boxes",
            self.records.len(),
            self.failures.len(),
            self.overlay_failure_count()
        )?;

        for failure in &self.failures {
            writeln!(f, "  {}", failure)?;
        }

        Ok(())
    }
}
