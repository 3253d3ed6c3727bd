//! Newtype identifier for scans.
//!
//! A scan id such as `scene0000_00` names a scene plus a capture view. It is
//! the key used everywhere a scan is looked up, so it gets its own type
//! instead of travelling around as a bare `String`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix marking the primary (reference) view of a multi-view scene.
pub const ZERO_VIEW_SUFFIX: &str = "00";

/// A unique identifier for a scan.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(String);

impl ScanId {
    /// Creates a new ScanId.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this scan is the primary view (`..._00`).
    #[inline]
    pub fn is_zero_view(&self) -> bool {
        self.0.ends_with(ZERO_VIEW_SUFFIX)
    }
}

impl fmt::Debug for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScanId({})", self.0)
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScanId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ScanId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ScanId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
