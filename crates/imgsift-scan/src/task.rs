//! Background scanning.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use imgsift_core::{ScanConfig, ScanError, ScanResult};

use crate::handle::DirectoryHandle;
use crate::progress::ScanProgress;
use crate::scanner::DirectoryScanner;

/// Channel buffer size for scan events.
pub const SCAN_CHANNEL_SIZE: usize = 100;

/// Message sent from a background scan.
#[derive(Debug)]
pub enum ScanEvent {
    /// Intermediate progress.
    Progress(ScanProgress),
    /// The scan finished, failed, or was cancelled.
    Complete(Result<ScanResult, ScanError>),
}

/// Start a scan on the blocking pool.
///
/// Returns a receiver that will receive progress updates and then exactly
/// one [`ScanEvent::Complete`]. Must be called from within a tokio runtime.
pub fn start_scan(
    scanner: Arc<DirectoryScanner>,
    root: Arc<dyn DirectoryHandle>,
    config: ScanConfig,
    cancel: CancellationToken,
) -> mpsc::Receiver<ScanEvent> {
    let (tx, rx) = mpsc::channel(SCAN_CHANNEL_SIZE);

    tokio::spawn(async move {
        let mut progress_rx = scanner.subscribe();

        // Forward progress updates
        let tx_progress = tx.clone();
        let progress_task = tokio::spawn(async move {
            while let Ok(progress) = progress_rx.recv().await {
                if tx_progress.send(ScanEvent::Progress(progress)).await.is_err() {
                    break;
                }
            }
        });

        let result = tokio::task::spawn_blocking(move || {
            scanner.scan_with_cancel(root.as_ref(), &config, &cancel)
        })
        .await
        .unwrap_or_else(|e| {
            Err(ScanError::Other {
                message: e.to_string(),
            })
        });

        progress_task.abort();
        let _ = tx.send(ScanEvent::Complete(result)).await;
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryDirectory, MemoryFile};

    async fn completion(mut rx: mpsc::Receiver<ScanEvent>) -> Result<ScanResult, ScanError> {
        while let Some(event) = rx.recv().await {
            if let ScanEvent::Complete(result) = event {
                return result;
            }
        }
        panic!("scan channel closed without completion");
    }

    #[tokio::test]
    async fn test_background_scan_completes() {
        let scanner = Arc::new(DirectoryScanner::new());
        let root: Arc<dyn DirectoryHandle> = Arc::new(
            MemoryDirectory::new("root")
                .file(MemoryFile::with_size("a.png", 5))
                .dir(MemoryDirectory::new("nested").file(MemoryFile::with_size("b.gif", 7))),
        );

        let rx = start_scan(
            Arc::clone(&scanner),
            root,
            ScanConfig::default(),
            CancellationToken::new(),
        );
        let result = completion(rx).await.unwrap();

        let paths: Vec<_> = result.files.iter().map(|f| f.path()).collect();
        assert_eq!(paths, vec!["a.png", "nested/b.gif"]);
        assert!(!scanner.is_busy());
    }

    #[tokio::test]
    async fn test_background_scan_reports_cancel() {
        let scanner = Arc::new(DirectoryScanner::new());
        let root: Arc<dyn DirectoryHandle> =
            Arc::new(MemoryDirectory::new("root").file(MemoryFile::with_size("a.png", 5)));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let rx = start_scan(Arc::clone(&scanner), root, ScanConfig::default(), cancel);
        let err = completion(rx).await.unwrap_err();
        assert!(matches!(err, ScanError::Cancelled));
        assert_eq!(scanner.registry().live_count(), 0);
    }
}
