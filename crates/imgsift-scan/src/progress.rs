//! Scan progress reporting.

use std::time::{Duration, Instant};

use compact_str::CompactString;

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of files opened so far.
    pub files_seen: u64,
    /// Number of directories entered so far.
    pub dirs_seen: u64,
    /// Total bytes of opened files.
    pub bytes_seen: u64,
    /// Relative path most recently visited.
    pub current_path: CompactString,
    /// Number of files or directories skipped because of errors.
    pub errors_count: u64,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            files_seen: 0,
            dirs_seen: 0,
            bytes_seen: 0,
            current_path: CompactString::default(),
            errors_count: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate scan rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_seen as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Get total items visited (files + dirs).
    pub fn total_items(&self) -> u64 {
        self.files_seen + self.dirs_seen
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Running counters for one scan.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    files_seen: u64,
    dirs_seen: u64,
    bytes_seen: u64,
    errors_count: u64,
    current_path: CompactString,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            files_seen: 0,
            dirs_seen: 0,
            bytes_seen: 0,
            errors_count: 0,
            current_path: CompactString::default(),
        }
    }

    pub fn record_file(&mut self, path: &str, size: u64) {
        self.files_seen += 1;
        self.bytes_seen += size;
        self.current_path = path.into();
    }

    pub fn record_dir(&mut self, path: &str) {
        self.dirs_seen += 1;
        self.current_path = path.into();
    }

    pub fn record_error(&mut self) {
        self.errors_count += 1;
    }

    pub fn files_seen(&self) -> u64 {
        self.files_seen
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            files_seen: self.files_seen,
            dirs_seen: self.dirs_seen,
            bytes_seen: self.bytes_seen,
            current_path: self.current_path.clone(),
            errors_count: self.errors_count,
            elapsed: self.start_time.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_snapshot() {
        let mut tracker = ProgressTracker::new();
        tracker.record_dir("a");
        tracker.record_file("a/b.png", 100);
        tracker.record_file("a/c.png", 50);
        tracker.record_error();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.files_seen, 2);
        assert_eq!(snapshot.dirs_seen, 1);
        assert_eq!(snapshot.bytes_seen, 150);
        assert_eq!(snapshot.errors_count, 1);
        assert_eq!(snapshot.current_path, "a/c.png");
        assert_eq!(snapshot.total_items(), 3);
    }

    #[test]
    fn test_rate_with_zero_elapsed() {
        let progress = ScanProgress::new();
        assert_eq!(progress.files_per_second(), 0.0);
    }
}
