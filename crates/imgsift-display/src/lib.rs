//! Sortable image listing and preview navigation for imgsift.
//!
//! [`ImageDisplay`] owns a [`ScanResult`](imgsift_core::ScanResult) once a
//! scan completes: it keeps the listing sorted, tracks which rows are
//! selected, removes selections and produces export snapshots.
//! [`PreviewCoordinator`] pages through a read-only copy of that listing.
//!
//! # Example
//!
//! ```no_run
//! use imgsift_display::{ImageDisplay, SortColumn};
//! use imgsift_scan::{DirectoryScanner, FsDirectory, ScanConfig};
//!
//! let root = FsDirectory::open("/home/user/Pictures").unwrap();
//! let result = DirectoryScanner::new()
//!     .scan(&root, &ScanConfig::default())
//!     .unwrap();
//!
//! let mut display = ImageDisplay::new();
//! display.set_result(result);
//! display.sort(SortColumn::Size);
//!
//! for row in display.rows() {
//!     println!("{:>4} {:<40} {:>10}", row.index, row.path, row.size_formatted);
//! }
//! ```

mod display;
mod preview;
mod sort;

pub use display::{DisplayRow, DisplayState, ExportImage, ExportSnapshot, ImageDisplay};
pub use preview::{
    PaneState, PreviewCoordinator, PreviewEntry, PreviewError, PreviewPane, Viewport,
    read_dimensions,
};
pub use sort::{SortColumn, SortDirection, SortState, compare};
