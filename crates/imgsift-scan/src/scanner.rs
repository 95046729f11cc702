//! Depth-first directory scanner.

use std::sync::atomic::{AtomicBool, Ordering};

use compact_str::CompactString;
use globset::GlobSet;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use imgsift_core::{
    FormatFilterConfig, PreviewRegistry, ScanConfig, ScanError, ScanResult, ScanWarning,
    ScannedFile, is_image_file,
};

use crate::handle::{DirectoryHandle, Entry, FileHandle};
use crate::progress::{ProgressTracker, ScanProgress};

/// Files between two progress broadcasts.
pub const PROGRESS_INTERVAL: u64 = 256;

/// Scans directory handles for image files.
///
/// One scanner runs at most one scan at a time: a scan started while
/// another is in flight fails with [`ScanError::Busy`].
pub struct DirectoryScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
    registry: PreviewRegistry,
    busy: AtomicBool,
}

impl DirectoryScanner {
    /// Create a new scanner with its own preview registry.
    pub fn new() -> Self {
        Self::with_registry(PreviewRegistry::new())
    }

    /// Create a scanner allocating preview handles from `registry`.
    pub fn with_registry(registry: PreviewRegistry) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            progress_tx,
            registry,
            busy: AtomicBool::new(false),
        }
    }

    /// Registry that preview handles are allocated from.
    pub fn registry(&self) -> &PreviewRegistry {
        &self.registry
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Whether a scan is currently running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mark the scanner busy until the returned guard is dropped.
    pub fn try_begin(&self) -> Result<ScanGuard<'_>, ScanError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ScanError::Busy)?;
        Ok(ScanGuard { busy: &self.busy })
    }

    /// Scan a directory handle.
    pub fn scan(
        &self,
        root: &dyn DirectoryHandle,
        config: &ScanConfig,
    ) -> Result<ScanResult, ScanError> {
        self.scan_with_cancel(root, config, &CancellationToken::new())
    }

    /// Scan a directory handle, stopping early when `cancel` fires.
    ///
    /// Handles allocated before cancellation are released on the way out.
    pub fn scan_with_cancel(
        &self,
        root: &dyn DirectoryHandle,
        config: &ScanConfig,
        cancel: &CancellationToken,
    ) -> Result<ScanResult, ScanError> {
        let _guard = self.try_begin()?;

        info!(root = root.name(), "scan started");

        let ignore = config
            .ignore_set()
            .map_err(|e| ScanError::InvalidConfig {
                message: e.to_string(),
            })?;

        let root_entries = root.entries().map_err(|e| ScanError::io(root.name(), e))?;

        let mut walk = Walk {
            config,
            ignore,
            cancel,
            progress_tx: &self.progress_tx,
            tracker: ProgressTracker::new(),
            candidates: Vec::new(),
            warnings: Vec::new(),
        };
        walk.visit(root_entries, "", 1)?;

        let Walk {
            tracker,
            candidates,
            warnings,
            ..
        } = walk;

        let total_count = candidates.len();
        let any = FormatFilterConfig::any();
        let image_count = candidates
            .iter()
            .filter(|c| is_image_file(&c.name, &any))
            .count();

        // Allocate preview handles only for files that survive the filter.
        let mut files = Vec::new();
        for candidate in candidates {
            if cancel.is_cancelled() {
                debug!(allocated = files.len(), "scan cancelled while allocating previews");
                return Err(ScanError::Cancelled);
            }
            if !is_image_file(&candidate.name, &config.formats) {
                continue;
            }
            let handle = self.registry.allocate(candidate.file.preview_source());
            files.push(ScannedFile::new(
                candidate.path,
                candidate.size,
                candidate.mime_type,
                handle,
            ));
        }

        let _ = self.progress_tx.send(tracker.snapshot());

        let result = ScanResult::new(
            root.name(),
            files,
            total_count,
            image_count,
            tracker.elapsed(),
            warnings,
        );

        info!(
            root = root.name(),
            kept = result.len(),
            seen = result.total_count,
            warnings = result.warnings.len(),
            "scan finished"
        );

        Ok(result)
    }

    /// Legacy entry point taking a typed path.
    ///
    /// Always refuses without touching the filesystem; folders must be
    /// granted as a [`DirectoryHandle`].
    pub fn scan_with_path(&self, path: &str) -> Result<ScanResult, ScanError> {
        warn!(path, "path-string scanning is disabled");
        Err(ScanError::FeatureUnavailable {
            feature: "Scanning a typed path",
            hint: "pick a folder instead",
        })
    }
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a scanner marked busy while alive.
#[derive(Debug)]
pub struct ScanGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// A file seen during the walk, before filtering.
struct Candidate {
    path: CompactString,
    name: CompactString,
    size: u64,
    mime_type: CompactString,
    file: Box<dyn FileHandle>,
}

/// State of one walk.
struct Walk<'a> {
    config: &'a ScanConfig,
    ignore: GlobSet,
    cancel: &'a CancellationToken,
    progress_tx: &'a broadcast::Sender<ScanProgress>,
    tracker: ProgressTracker,
    candidates: Vec<Candidate>,
    warnings: Vec<ScanWarning>,
}

impl Walk<'_> {
    fn visit(&mut self, entries: Vec<Entry>, prefix: &str, depth: u32) -> Result<(), ScanError> {
        for entry in entries {
            if self.cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            let name = entry.name();
            if self.config.should_skip_hidden(name) || self.ignore.is_match(name) {
                continue;
            }

            let path = if prefix.is_empty() {
                CompactString::new(name)
            } else {
                compact_str::format_compact!("{prefix}/{name}")
            };

            match entry {
                Entry::Directory(dir) => {
                    if self.config.exceeds_depth(depth + 1) {
                        debug!(path = %path, "depth limit reached");
                        continue;
                    }
                    self.tracker.record_dir(&path);
                    debug!(path = %path, "entering directory");

                    match dir.entries() {
                        Ok(children) => self.visit(children, &path, depth + 1)?,
                        Err(err) => {
                            warn!(path = %path, error = %err, "skipping unreadable directory");
                            self.tracker.record_error();
                            self.warnings
                                .push(ScanWarning::directory_unreadable(path.as_str(), &err));
                        }
                    }
                }
                Entry::File(file) => match file.open() {
                    Ok(info) => {
                        self.tracker.record_file(&path, info.size);
                        self.candidates.push(Candidate {
                            name: CompactString::new(file.name()),
                            size: info.size,
                            mime_type: info.mime_type,
                            file,
                            path,
                        });

                        if self.tracker.files_seen() % PROGRESS_INTERVAL == 0 {
                            let _ = self.progress_tx.send(self.tracker.snapshot());
                        }
                    }
                    Err(err) => {
                        warn!(path = %path, error = %err, "skipping unreadable file");
                        self.tracker.record_error();
                        self.warnings
                            .push(ScanWarning::file_unreadable(path.as_str(), &err));
                    }
                },
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    use imgsift_core::PreviewSource;

    use super::*;
    use crate::handle::FileInfo;
    use crate::memory::{MemoryDirectory, MemoryFile};

    fn sample_tree() -> MemoryDirectory {
        MemoryDirectory::new("photos")
            .file(MemoryFile::with_size("a.png", 1024))
            .file(MemoryFile::with_size("b.txt", 10))
            .file(MemoryFile::with_size("c.JPG", 2048))
    }

    #[test]
    fn test_default_formats_scenario() {
        let scanner = DirectoryScanner::new();
        let result = scanner.scan(&sample_tree(), &ScanConfig::default()).unwrap();

        let paths: Vec<_> = result.files.iter().map(|f| f.path()).collect();
        assert_eq!(paths, vec!["a.png", "c.JPG"]);
        assert_eq!(result.files[0].size_bytes(), 1024);
        assert_eq!(result.files[1].extension(), "jpg");
        assert_eq!(result.total_count, 3);
        assert_eq!(scanner.registry().live_count(), 2);
    }

    #[test]
    fn test_guard_rejects_second_scan() {
        let scanner = DirectoryScanner::new();
        let guard = scanner.try_begin().unwrap();
        assert!(scanner.is_busy());

        let err = scanner.scan(&sample_tree(), &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::Busy));

        drop(guard);
        assert!(!scanner.is_busy());
        assert!(scanner.scan(&sample_tree(), &ScanConfig::default()).is_ok());
    }

    #[test]
    fn test_busy_flag_cleared_after_error() {
        let scanner = DirectoryScanner::new();
        let err = scanner
            .scan(&MemoryDirectory::denied("root"), &ScanConfig::default())
            .unwrap_err();
        assert!(matches!(err, ScanError::AccessDenied { .. }));
        assert!(!scanner.is_busy());
    }

    #[test]
    fn test_cancelled_scan_releases_handles() {
        let scanner = DirectoryScanner::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = scanner
            .scan_with_cancel(&sample_tree(), &ScanConfig::default(), &cancel)
            .unwrap_err();
        assert!(matches!(err, ScanError::Cancelled));
        assert_eq!(scanner.registry().live_count(), 0);
    }

    /// Fires the token when its preview source is taken, recording how many
    /// handles were live at that moment.
    struct CancellingFile {
        name: &'static str,
        cancel: CancellationToken,
        registry: PreviewRegistry,
        live_at_cancel: Arc<AtomicUsize>,
    }

    impl FileHandle for CancellingFile {
        fn name(&self) -> &str {
            self.name
        }

        fn open(&self) -> std::io::Result<FileInfo> {
            Ok(FileInfo {
                size: 4,
                mime_type: "image/png".into(),
            })
        }

        fn preview_source(&self) -> PreviewSource {
            self.live_at_cancel
                .store(self.registry.live_count(), Ordering::SeqCst);
            self.cancel.cancel();
            PreviewSource::Bytes(Arc::from(vec![0u8; 4]))
        }
    }

    struct CancellingDirectory {
        cancel: CancellationToken,
        registry: PreviewRegistry,
        live_at_cancel: Arc<AtomicUsize>,
    }

    impl DirectoryHandle for CancellingDirectory {
        fn name(&self) -> &str {
            "photos"
        }

        fn entries(&self) -> std::io::Result<Vec<Entry>> {
            Ok(vec![
                Entry::File(Box::new(MemoryFile::with_size("a.png", 4))),
                Entry::File(Box::new(CancellingFile {
                    name: "b.png",
                    cancel: self.cancel.clone(),
                    registry: self.registry.clone(),
                    live_at_cancel: Arc::clone(&self.live_at_cancel),
                })),
                Entry::File(Box::new(MemoryFile::with_size("c.png", 4))),
            ])
        }
    }

    #[test]
    fn test_cancel_during_allocation_releases_allocated_handles() {
        let registry = PreviewRegistry::new();
        let scanner = DirectoryScanner::with_registry(registry.clone());
        let cancel = CancellationToken::new();
        let live_at_cancel = Arc::new(AtomicUsize::new(0));
        let root = CancellingDirectory {
            cancel: cancel.clone(),
            registry: registry.clone(),
            live_at_cancel: Arc::clone(&live_at_cancel),
        };

        let err = scanner
            .scan_with_cancel(&root, &ScanConfig::default(), &cancel)
            .unwrap_err();

        assert!(matches!(err, ScanError::Cancelled));
        // a.png already held a handle when b.png fired the token
        assert_eq!(live_at_cancel.load(Ordering::SeqCst), 1);
        assert_eq!(registry.live_count(), 0);
        assert!(!scanner.is_busy());
    }

    #[test]
    fn test_scan_with_path_is_disabled() {
        let scanner = DirectoryScanner::new();
        let err = scanner.scan_with_path("/definitely/not/read").unwrap_err();
        assert!(matches!(err, ScanError::FeatureUnavailable { .. }));
        assert!(!scanner.is_busy());
    }
}
