//! Image format allow-list and per-file format matching.
//!
//! Extensions are compared lower-cased, and `jpeg` is folded into `jpg` on
//! both sides of every comparison so that either spelling in the allow-list
//! matches either spelling on disk.

use std::collections::{BTreeMap, BTreeSet};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::file::ScannedFile;

/// Formats recognised when no explicit allow-list is given.
pub const SUPPORTED_FORMATS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg"];

/// Formats checked after [`FormatSelection::reset`].
const DEFAULT_FORMATS: [&str; 3] = ["jpg", "png", "gif"];

/// Extract the lower-cased extension of a file name.
///
/// Returns the text after the last `.`, or an empty string when the name has
/// no `.` at all.
pub fn extension_of(filename: &str) -> CompactString {
    match filename.rsplit_once('.') {
        Some((_, ext)) => CompactString::new(ext.to_lowercase()),
        None => CompactString::default(),
    }
}

fn normalize(token: &str) -> CompactString {
    let lower = token.trim().trim_start_matches('.').to_lowercase();
    if lower == "jpeg" {
        CompactString::from("jpg")
    } else {
        CompactString::new(lower)
    }
}

/// Set of allowed extensions.
///
/// The empty set means "match everything" for [`filter_by_format`];
/// [`is_image_file`] falls back to [`SUPPORTED_FORMATS`] instead. Tokens are
/// normalized on the way in, including when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FormatFilterConfig {
    allowed: BTreeSet<CompactString>,
}

impl From<Vec<String>> for FormatFilterConfig {
    fn from(tokens: Vec<String>) -> Self {
        Self::new(tokens)
    }
}

impl From<FormatFilterConfig> for Vec<String> {
    fn from(config: FormatFilterConfig) -> Self {
        config.allowed.into_iter().map(String::from).collect()
    }
}

impl FormatFilterConfig {
    /// Build an allow-list from format tokens (any case, with or without a dot).
    pub fn new<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = formats
            .into_iter()
            .map(|f| normalize(f.as_ref()))
            .filter(|f| !f.is_empty())
            .collect();
        Self { allowed }
    }

    /// The empty allow-list.
    pub fn any() -> Self {
        Self::default()
    }

    /// Whether no format is selected.
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Normalized tokens in sorted order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(|t| t.as_str())
    }

    /// Whether an already-extracted extension is allowed.
    ///
    /// An empty allow-list accepts everything here.
    pub fn allows_extension(&self, extension: &str) -> bool {
        if self.allowed.is_empty() {
            return true;
        }
        let ext = normalize(extension);
        !ext.is_empty() && self.allowed.contains(&ext)
    }
}

/// Check whether a file name has an image extension.
///
/// With an empty allow-list the name is checked against
/// [`SUPPORTED_FORMATS`]. A name without an extension never matches.
pub fn is_image_file(filename: &str, allow: &FormatFilterConfig) -> bool {
    let ext = extension_of(filename);
    if ext.is_empty() {
        return false;
    }
    if allow.is_empty() {
        return SUPPORTED_FORMATS.contains(&ext.as_str());
    }
    allow.allows_extension(&ext)
}

/// Keep only the files whose extension is allowed, preserving order.
///
/// An empty allow-list passes every file through. Files that are dropped
/// release their preview handles.
pub fn filter_by_format(files: Vec<ScannedFile>, allow: &FormatFilterConfig) -> Vec<ScannedFile> {
    if allow.is_empty() {
        return files;
    }
    files
        .into_iter()
        .filter(|file| allow.allows_extension(file.extension()))
        .collect()
}

/// Count files per format, with `jpeg` counted as `jpg`.
pub fn format_stats(files: &[ScannedFile]) -> BTreeMap<CompactString, usize> {
    let mut stats = BTreeMap::new();
    for file in files {
        *stats.entry(normalize(file.extension())).or_insert(0) += 1;
    }
    stats
}

/// Best-effort mime type for an extension; empty when unknown.
pub fn mime_for_extension(extension: &str) -> &'static str {
    match normalize(extension).as_str() {
        "jpg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => "",
    }
}

/// Checkbox state over the supported formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSelection {
    checked: BTreeMap<CompactString, bool>,
}

impl Default for FormatSelection {
    fn default() -> Self {
        let mut selection = Self {
            checked: SUPPORTED_FORMATS
                .iter()
                .map(|f| (CompactString::new(f), false))
                .collect(),
        };
        selection.reset();
        selection
    }
}

impl FormatSelection {
    /// Selection with exactly the given formats checked.
    ///
    /// Tokens outside [`SUPPORTED_FORMATS`] are ignored.
    pub fn with_checked<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::default();
        selection.toggle_all(false);
        for format in formats {
            selection.set_checked(format.as_ref(), true);
        }
        selection
    }

    /// Check or uncheck one format. Returns `false` for unknown formats.
    pub fn set_checked(&mut self, format: &str, checked: bool) -> bool {
        let key = format.trim().to_lowercase();
        match self.checked.get_mut(key.as_str()) {
            Some(slot) => {
                *slot = checked;
                true
            }
            None => false,
        }
    }

    /// Whether a format is checked.
    pub fn is_checked(&self, format: &str) -> bool {
        self.checked
            .get(format.trim().to_lowercase().as_str())
            .copied()
            .unwrap_or(false)
    }

    /// Check or uncheck every format.
    pub fn toggle_all(&mut self, checked: bool) {
        for slot in self.checked.values_mut() {
            *slot = checked;
        }
    }

    /// Restore the default selection (`jpg`, `png`, `gif`).
    pub fn reset(&mut self) {
        for (format, slot) in self.checked.iter_mut() {
            *slot = DEFAULT_FORMATS.contains(&format.as_str());
        }
    }

    /// Checked formats, lower-cased, as an allow-list.
    pub fn selected_formats(&self) -> FormatFilterConfig {
        FormatFilterConfig::new(
            self.checked
                .iter()
                .filter(|(_, checked)| **checked)
                .map(|(format, _)| format.as_str()),
        )
    }

    /// Checked format names, alphabetically.
    pub fn checked_names(&self) -> Vec<&str> {
        self.checked
            .iter()
            .filter(|(_, checked)| **checked)
            .map(|(format, _)| format.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.JPG"), "jpg");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of("trailing."), "");
    }

    #[test]
    fn test_jpg_jpeg_symmetry() {
        let jpg = FormatFilterConfig::new(["jpg"]);
        let jpeg = FormatFilterConfig::new(["jpeg"]);
        for name in ["a.jpg", "b.JPEG", "c.jpeg", "d.Jpg"] {
            assert_eq!(is_image_file(name, &jpg), is_image_file(name, &jpeg));
            assert!(is_image_file(name, &jpg));
        }
        assert!(!is_image_file("e.png", &jpeg));
    }

    #[test]
    fn test_empty_allow_uses_supported_formats() {
        let any = FormatFilterConfig::any();
        assert!(is_image_file("x.webp", &any));
        assert!(is_image_file("x.SVG", &any));
        assert!(!is_image_file("x.txt", &any));
        assert!(!is_image_file("noext", &any));
    }

    #[test]
    fn test_tokens_are_normalized() {
        let config = FormatFilterConfig::new([".PNG", "JPEG", " gif "]);
        let tokens: Vec<_> = config.tokens().collect();
        assert_eq!(tokens, vec!["gif", "jpg", "png"]);
    }

    #[test]
    fn test_selection_defaults_and_toggle() {
        let mut selection = FormatSelection::default();
        assert!(selection.is_checked("jpg"));
        assert!(selection.is_checked("PNG"));
        assert!(!selection.is_checked("webp"));

        selection.toggle_all(false);
        assert!(selection.selected_formats().is_empty());

        assert!(selection.set_checked("webp", true));
        assert!(!selection.set_checked("tiff", true));
        assert_eq!(
            selection.selected_formats(),
            FormatFilterConfig::new(["webp"])
        );

        selection.reset();
        assert_eq!(selection.checked_names(), vec!["gif", "jpg", "png"]);
    }

    #[test]
    fn test_mime_guess() {
        assert_eq!(mime_for_extension("JPEG"), "image/jpeg");
        assert_eq!(mime_for_extension("svg"), "image/svg+xml");
        assert_eq!(mime_for_extension("xyz"), "");
    }
}
