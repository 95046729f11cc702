//! The displayed image listing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use imgsift_core::{FormatFilterConfig, ScanResult, ScannedFile, filter_by_format, format_size};

use crate::preview::PreviewEntry;
use crate::sort::{SortColumn, SortState};

/// What the listing currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// No scan has completed yet.
    NeverScanned,
    /// A scan is in flight.
    Loading,
    /// The last scan found nothing to show, or everything was removed.
    Empty,
    /// At least one image is displayed.
    Populated,
}

/// One row of the listing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    /// 1-based position in display order.
    pub index: usize,
    pub path: CompactString,
    pub size_bytes: u64,
    pub size_formatted: String,
    /// Upper-cased extension, e.g. `PNG`.
    pub file_type: CompactString,
    pub selected: bool,
}

/// One image in an export snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportImage {
    pub path: CompactString,
    pub size: u64,
    pub extension: CompactString,
    pub size_formatted: String,
}

/// Serializable listing, detached from any preview handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub export_time: DateTime<Utc>,
    pub total_count: usize,
    pub images: Vec<ExportImage>,
}

impl ExportSnapshot {
    /// Whether the snapshot has no images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Owns the displayed scan result with its sort order and selection.
///
/// The selection only ever holds paths of displayed files and is cleared
/// whenever the displayed set changes.
#[derive(Debug)]
pub struct ImageDisplay {
    result: Option<ScanResult>,
    sort: SortState,
    selection: IndexSet<CompactString>,
    loading: bool,
}

impl ImageDisplay {
    /// Create an empty display with the default sort.
    pub fn new() -> Self {
        Self::with_sort(SortState::default())
    }

    /// Create an empty display with a remembered sort preference.
    pub fn with_sort(sort: SortState) -> Self {
        Self {
            result: None,
            sort,
            selection: IndexSet::new(),
            loading: false,
        }
    }

    pub fn state(&self) -> DisplayState {
        if self.loading {
            return DisplayState::Loading;
        }
        match &self.result {
            None => DisplayState::NeverScanned,
            Some(result) if result.is_empty() => DisplayState::Empty,
            Some(_) => DisplayState::Populated,
        }
    }

    /// Mark a scan as in flight. Displayed files stay untouched.
    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    /// Leave the loading state after a failed scan, keeping what was shown.
    pub fn scan_failed(&mut self) {
        self.loading = false;
    }

    /// Replace the displayed set with a fresh scan result.
    ///
    /// Handles of the previous set are released. The sort preference is
    /// kept and applied to the new files.
    pub fn set_result(&mut self, mut result: ScanResult) {
        self.sort.apply(&mut result.files);
        self.selection.clear();
        self.loading = false;

        info!(
            root = %result.root_name,
            files = result.len(),
            column = %self.sort.column,
            "displaying scan result"
        );
        self.result = Some(result);
    }

    /// Drop the displayed set, returning to the never-scanned state.
    pub fn clear(&mut self) {
        self.result = None;
        self.selection.clear();
        self.loading = false;
    }

    /// The displayed result, if any.
    pub fn result(&self) -> Option<&ScanResult> {
        self.result.as_ref()
    }

    /// Displayed files in display order.
    pub fn files(&self) -> &[ScannedFile] {
        self.result.as_ref().map_or(&[], |r| r.files.as_slice())
    }

    pub fn len(&self) -> usize {
        self.files().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files().is_empty()
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    /// Sort by `column`, flipping direction if it is already active.
    ///
    /// Flipping reverses the displayed order, so ties keep mirroring each
    /// other however many times the column is toggled.
    pub fn sort(&mut self, column: SortColumn) -> SortState {
        let flip = self.sort.column == column;
        self.sort.request(column);
        if let Some(result) = self.result.as_mut() {
            if flip {
                result.files.reverse();
            } else {
                self.sort.apply(&mut result.files);
            }
        }
        debug!(column = %self.sort.column, direction = %self.sort.direction, "sorted");
        self.sort
    }

    /// Flip selection of one displayed path, returning whether it is now
    /// selected. Paths not on display are ignored.
    pub fn toggle_selection(&mut self, path: &str) -> bool {
        if !self.files().iter().any(|f| f.path() == path) {
            return false;
        }
        if self.selection.shift_remove(path) {
            false
        } else {
            self.selection.insert(CompactString::new(path));
            true
        }
    }

    /// Select every displayed file, or clear the selection.
    pub fn select_all(&mut self, selected: bool) {
        self.selection.clear();
        if selected {
            let paths: Vec<CompactString> = self
                .files()
                .iter()
                .map(|f| CompactString::new(f.path()))
                .collect();
            self.selection.extend(paths);
        }
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selection.contains(path)
    }

    /// Selected paths in the order they were selected.
    pub fn selection(&self) -> impl Iterator<Item = &str> {
        self.selection.iter().map(|p| p.as_str())
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    /// Remove every selected file from the display, releasing its preview.
    ///
    /// Returns how many files were removed; nothing happens when the
    /// selection is empty.
    pub fn remove_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let Some(result) = self.result.as_mut() else {
            self.selection.clear();
            return 0;
        };

        let before = result.files.len();
        let selection = &self.selection;
        result.files.retain(|f| !selection.contains(f.path()));
        let removed = before - result.files.len();
        self.selection.clear();

        info!(removed, remaining = result.files.len(), "removed selected images");
        removed
    }

    /// Narrow the displayed set to `allow`, releasing the previews of files
    /// that no longer match.
    ///
    /// The selection is cleared when anything is dropped. Returns how many
    /// files were dropped. Files dropped here only come back with a rescan.
    pub fn filter_formats(&mut self, allow: &FormatFilterConfig) -> usize {
        let Some(result) = self.result.as_mut() else {
            return 0;
        };
        let before = result.files.len();
        result.files = filter_by_format(std::mem::take(&mut result.files), allow);
        let dropped = before - result.files.len();
        if dropped > 0 {
            self.selection.clear();
            info!(dropped, remaining = result.files.len(), "filtered displayed images");
        }
        dropped
    }

    /// Snapshot of the listing for export.
    pub fn export(&self) -> ExportSnapshot {
        let images: Vec<ExportImage> = self
            .files()
            .iter()
            .map(|f| ExportImage {
                path: CompactString::new(f.path()),
                size: f.size_bytes(),
                extension: CompactString::new(f.extension()),
                size_formatted: format_size(f.size_bytes()),
            })
            .collect();

        ExportSnapshot {
            export_time: Utc::now(),
            total_count: images.len(),
            images,
        }
    }

    /// Table rows in display order.
    pub fn rows(&self) -> Vec<DisplayRow> {
        self.files()
            .iter()
            .enumerate()
            .map(|(i, f)| DisplayRow {
                index: i + 1,
                path: CompactString::new(f.path()),
                size_bytes: f.size_bytes(),
                size_formatted: format_size(f.size_bytes()),
                file_type: f.extension().to_uppercase().into(),
                selected: self.selection.contains(f.path()),
            })
            .collect()
    }

    /// Displayed files whose path or extension contains `term`, ignoring
    /// case. An empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<&ScannedFile> {
        let needle = term.trim().to_lowercase();
        self.files()
            .iter()
            .filter(|f| {
                needle.is_empty()
                    || f.path().to_lowercase().contains(&needle)
                    || f.extension().contains(needle.as_str())
            })
            .collect()
    }

    /// Displayed files per extension.
    pub fn format_stats(&self) -> BTreeMap<CompactString, usize> {
        imgsift_core::format_stats(self.files())
    }

    /// Read-only entries for the preview coordinator.
    pub fn preview_entries(&self) -> Vec<PreviewEntry> {
        self.files().iter().map(PreviewEntry::from_file).collect()
    }
}

impl Default for ImageDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use imgsift_core::{PreviewRegistry, PreviewSource};

    use super::*;
    use crate::sort::SortDirection;

    fn result(registry: &PreviewRegistry, files: &[(&str, u64)]) -> ScanResult {
        let files = files
            .iter()
            .map(|(path, size)| {
                let handle = registry.allocate(PreviewSource::Path(PathBuf::from(path)));
                ScannedFile::new(*path, *size, "", handle)
            })
            .collect::<Vec<_>>();
        let count = files.len();
        ScanResult::new("root", files, count, count, Duration::ZERO, Vec::new())
    }

    fn paths(display: &ImageDisplay) -> Vec<&str> {
        display.files().iter().map(|f| f.path()).collect()
    }

    #[test]
    fn test_state_transitions() {
        let registry = PreviewRegistry::new();
        let mut display = ImageDisplay::new();
        assert_eq!(display.state(), DisplayState::NeverScanned);

        display.begin_loading();
        assert_eq!(display.state(), DisplayState::Loading);
        display.scan_failed();
        assert_eq!(display.state(), DisplayState::NeverScanned);

        display.set_result(result(&registry, &[]));
        assert_eq!(display.state(), DisplayState::Empty);

        display.set_result(result(&registry, &[("a.png", 1)]));
        assert_eq!(display.state(), DisplayState::Populated);

        display.begin_loading();
        display.scan_failed();
        assert_eq!(display.state(), DisplayState::Populated);
        assert_eq!(paths(&display), vec!["a.png"]);
    }

    #[test]
    fn test_set_result_applies_sort_and_clears_selection() {
        let registry = PreviewRegistry::new();
        let mut display = ImageDisplay::with_sort(SortState::new(
            SortColumn::Size,
            SortDirection::Descending,
        ));
        display.set_result(result(&registry, &[("a.png", 1), ("b.png", 3)]));
        display.toggle_selection("a.png");
        assert_eq!(paths(&display), vec!["b.png", "a.png"]);

        display.set_result(result(&registry, &[("c.png", 2), ("d.png", 9)]));
        assert_eq!(paths(&display), vec!["d.png", "c.png"]);
        assert_eq!(display.selection_len(), 0);
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn test_toggle_ignores_unknown_paths() {
        let registry = PreviewRegistry::new();
        let mut display = ImageDisplay::new();
        display.set_result(result(&registry, &[("a.png", 1)]));

        assert!(!display.toggle_selection("missing.png"));
        assert!(display.toggle_selection("a.png"));
        assert!(display.is_selected("a.png"));
        assert!(!display.toggle_selection("a.png"));
        assert_eq!(display.selection_len(), 0);
    }

    #[test]
    fn test_rows_and_search() {
        let registry = PreviewRegistry::new();
        let mut display = ImageDisplay::new();
        display.set_result(result(
            &registry,
            &[("Trips/beach.JPG", 2048), ("icons/logo.svg", 10)],
        ));
        display.toggle_selection("icons/logo.svg");

        let rows = display.rows();
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].path, "icons/logo.svg");
        assert_eq!(rows[0].file_type, "SVG");
        assert!(rows[0].selected);
        assert_eq!(rows[1].size_formatted, format_size(2048));
        assert!(!rows[1].selected);

        let found: Vec<_> = display.search("trips").iter().map(|f| f.path()).collect();
        assert_eq!(found, vec!["Trips/beach.JPG"]);
        assert_eq!(display.search("").len(), 2);
        assert_eq!(display.search("SVG").len(), 1);
    }

    #[test]
    fn test_toggling_one_column_mirrors_ties() {
        let registry = PreviewRegistry::new();
        let mut display = ImageDisplay::new();
        display.set_result(result(&registry, &[("x.png", 5), ("y.png", 5), ("z.png", 1)]));

        display.sort(SortColumn::Size);
        let asc: Vec<String> = paths(&display).iter().map(|p| p.to_string()).collect();
        display.sort(SortColumn::Size);
        let desc: Vec<String> = paths(&display).iter().map(|p| p.to_string()).collect();
        display.sort(SortColumn::Size);
        let asc_again: Vec<String> = paths(&display).iter().map(|p| p.to_string()).collect();

        let mut reversed = desc.clone();
        reversed.reverse();
        assert_eq!(asc_again, reversed);
        assert_eq!(asc_again, asc);
        assert_eq!(asc, vec!["z.png", "x.png", "y.png"]);
    }

    #[test]
    fn test_filter_formats_drops_and_releases() {
        let registry = PreviewRegistry::new();
        let mut display = ImageDisplay::new();
        display.set_result(result(&registry, &[("a.png", 1), ("b.gif", 1), ("c.jpg", 1)]));
        display.toggle_selection("a.png");

        let dropped = display.filter_formats(&FormatFilterConfig::new(["png", "jpg"]));
        assert_eq!(dropped, 1);
        assert_eq!(paths(&display), vec!["a.png", "c.jpg"]);
        assert_eq!(display.selection_len(), 0);
        assert_eq!(registry.live_count(), 2);
        assert_eq!(display.format_stats().get("gif"), None);

        assert_eq!(display.filter_formats(&FormatFilterConfig::any()), 0);
        assert_eq!(display.len(), 2);
    }

    #[test]
    fn test_clear_releases_everything() {
        let registry = PreviewRegistry::new();
        let mut display = ImageDisplay::new();
        display.set_result(result(&registry, &[("a.png", 1), ("b.png", 1)]));
        assert_eq!(registry.live_count(), 2);

        display.clear();
        assert_eq!(display.state(), DisplayState::NeverScanned);
        assert_eq!(registry.live_count(), 0);
    }
}
