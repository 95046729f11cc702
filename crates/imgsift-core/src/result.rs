//! Scan result container and summary.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;
use crate::file::ScannedFile;
use crate::format::format_stats;

/// Severity of a status message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Success,
    Warning,
    Error,
}

/// A one-line summary of a finished scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub level: StatusLevel,
    pub message: String,
}

/// The files produced by one traversal.
///
/// Moved into the display layer once a scan completes; the scanner keeps no
/// reference to it.
#[derive(Debug)]
pub struct ScanResult {
    /// Name of the scanned root.
    pub root_name: CompactString,

    /// Files that passed the format filter, in walk order.
    pub files: Vec<ScannedFile>,

    /// Number of files seen before filtering.
    pub total_count: usize,

    /// Number of image files seen before filtering against the selection.
    pub image_count: usize,

    /// When this scan was performed.
    pub scanned_at: DateTime<Utc>,

    /// Duration of the scan.
    pub scan_duration: Duration,

    /// Warnings encountered during scan.
    pub warnings: Vec<ScanWarning>,
}

impl ScanResult {
    /// Create a new scan result.
    pub fn new(
        root_name: impl Into<CompactString>,
        files: Vec<ScannedFile>,
        total_count: usize,
        image_count: usize,
        scan_duration: Duration,
        warnings: Vec<ScanWarning>,
    ) -> Self {
        Self {
            root_name: root_name.into(),
            files,
            total_count,
            image_count,
            scanned_at: Utc::now(),
            scan_duration,
            warnings,
        }
    }

    /// An empty result, e.g. for a root with no readable entries.
    pub fn empty(root_name: impl Into<CompactString>) -> Self {
        Self::new(root_name, Vec::new(), 0, 0, Duration::ZERO, Vec::new())
    }

    /// Number of files kept.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file was kept.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if there were any warnings during scanning.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Count of kept files per format.
    pub fn format_stats(&self) -> BTreeMap<CompactString, usize> {
        format_stats(&self.files)
    }

    /// Status message for the user.
    pub fn summary(&self) -> ScanSummary {
        let found = self.image_count;
        let kept = self.files.len();
        let (level, message) = if found == 0 {
            (StatusLevel::Warning, "No image files found".to_string())
        } else if kept == 0 {
            (
                StatusLevel::Warning,
                format!("Found {found} images, but none match the selected formats"),
            )
        } else if kept == found {
            (StatusLevel::Success, format!("Scanned {kept} images"))
        } else {
            (
                StatusLevel::Success,
                format!("Scanned {kept} images ({found} in total)"),
            )
        };
        ScanSummary { level, message }
    }
}
