//! Core types for imgsift.
//!
//! This crate provides the data model shared by the scanner and the display
//! layer: scanned files and scan results, the image format filter, revocable
//! preview handles, scan configuration and error types.

mod config;
mod error;
mod file;
pub mod format;
mod preview;
mod result;
mod size;

pub use config::{ScanConfig, ScanConfigBuilder};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use file::ScannedFile;
pub use format::{
    FormatFilterConfig, FormatSelection, SUPPORTED_FORMATS, extension_of, filter_by_format,
    format_stats, is_image_file, mime_for_extension,
};
pub use preview::{PreviewHandle, PreviewId, PreviewRef, PreviewRegistry, PreviewSource};
pub use result::{ScanResult, ScanSummary, StatusLevel};
pub use size::format_size;
