//! Error types for scanning operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a scan as a whole.
///
/// Problems with individual files or nested directories are not errors;
/// they are collected as [`ScanWarning`]s and the walk continues.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan root could not be read (revoked or missing permission).
    #[error("Access denied: {path}")]
    AccessDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another scan is still running on this scanner.
    #[error("A scan is already in progress")]
    Busy,

    /// The scan was cancelled before it completed.
    #[error("Scan cancelled")]
    Cancelled,

    /// The requested entry point is disabled.
    #[error("{feature} is unavailable: {hint}")]
    FeatureUnavailable {
        feature: &'static str,
        hint: &'static str,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::AccessDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether the folder itself could not be read, as opposed to the scan
    /// finding nothing or being refused.
    pub fn is_access_error(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied { .. } | Self::NotFound { .. } | Self::Io { .. }
        )
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A file could not be opened.
    FileUnreadable,
    /// A nested directory could not be listed.
    DirectoryUnreadable,
}

/// Non-fatal warning encountered during scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Relative path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning for a file that could not be opened.
    pub fn file_unreadable(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("Cannot open {}: {error}", path.display()),
            path,
            kind: WarningKind::FileUnreadable,
        }
    }

    /// Create a warning for a directory that could not be listed.
    pub fn directory_unreadable(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("Cannot list {}: {error}", path.display()),
            path,
            kind: WarningKind::DirectoryUnreadable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_io() {
        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ScanError::AccessDenied { .. }));
        assert!(err.is_access_error());

        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        );
        assert!(matches!(err, ScanError::Io { .. }));
    }

    #[test]
    fn test_busy_is_not_access_error() {
        assert!(!ScanError::Busy.is_access_error());
        assert!(!ScanError::Cancelled.is_access_error());
    }

    #[test]
    fn test_scan_warning_creation() {
        let error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let warning = ScanWarning::file_unreadable("photos/a.png", &error);
        assert_eq!(warning.kind, WarningKind::FileUnreadable);
        assert!(warning.message.contains("photos/a.png"));
    }
}
