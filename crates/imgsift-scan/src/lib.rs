//! Directory scanning engine for imgsift.
//!
//! This crate walks a [`DirectoryHandle`] depth-first, opens every file it
//! finds, and keeps the ones whose extension passes the configured format
//! filter.
//!
//! # Overview
//!
//! - **Handles, not paths**: a scan starts from a directory handle the
//!   caller was granted ([`FsDirectory::open`] or an in-memory tree)
//! - **Partial results**: unreadable files and subdirectories become
//!   warnings; only an unreadable root fails the scan
//! - **One scan at a time** per scanner, enforced by a busy guard
//! - **Lazy previews**: preview handles are allocated only for kept files
//! - **Progress updates** via broadcast channels, cancellation via
//!   `CancellationToken`
//!
//! # Example
//!
//! ```rust,no_run
//! use imgsift_scan::{DirectoryScanner, FsDirectory, ScanConfig};
//!
//! let root = FsDirectory::open("/path/to/photos").unwrap();
//! let scanner = DirectoryScanner::new();
//! let result = scanner.scan(&root, &ScanConfig::default()).unwrap();
//!
//! println!("{} of {} files kept", result.len(), result.total_count);
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use imgsift_scan::DirectoryScanner;
//!
//! let scanner = DirectoryScanner::new();
//! let mut progress_rx = scanner.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(progress) = progress_rx.recv().await {
//!         println!("Opened {} files", progress.files_seen);
//!     }
//! });
//! ```

mod fs;
mod handle;
mod memory;
mod progress;
mod scanner;
mod task;

pub use fs::{FsDirectory, FsFile};
pub use handle::{DirectoryHandle, Entry, FileHandle, FileInfo};
pub use memory::{MemoryDirectory, MemoryFile};
pub use progress::ScanProgress;
pub use scanner::{DirectoryScanner, PROGRESS_INTERVAL, ScanGuard};
pub use task::{SCAN_CHANNEL_SIZE, ScanEvent, start_scan};

// Re-export core types for convenience
pub use imgsift_core::{
    FormatFilterConfig, PreviewRegistry, ScanConfig, ScanError, ScanResult, ScanWarning,
    ScannedFile, WarningKind,
};
