//! Directory and file handle abstractions.
//!
//! A scan never starts from a path string. It starts from a
//! [`DirectoryHandle`] the caller obtained explicitly (a folder the user
//! picked, or an in-memory tree), and walks whatever that handle exposes.

use std::io;

use compact_str::CompactString;

use imgsift_core::PreviewSource;

/// Metadata read when a file is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Byte length.
    pub size: u64,
    /// Best-effort mime type, possibly empty.
    pub mime_type: CompactString,
}

/// A readable file inside a directory handle.
pub trait FileHandle: Send + Sync {
    /// File name (single path component).
    fn name(&self) -> &str;

    /// Open the file and read its metadata.
    fn open(&self) -> io::Result<FileInfo>;

    /// Where a preview of this file reads its bytes from.
    fn preview_source(&self) -> PreviewSource;
}

/// A directory that can be listed.
pub trait DirectoryHandle: Send + Sync {
    /// Directory name (single path component).
    fn name(&self) -> &str;

    /// List the directory's immediate children.
    fn entries(&self) -> io::Result<Vec<Entry>>;
}

/// One child of a directory.
pub enum Entry {
    File(Box<dyn FileHandle>),
    Directory(Box<dyn DirectoryHandle>),
}

impl Entry {
    /// Name of the entry.
    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => file.name(),
            Self::Directory(dir) => dir.name(),
        }
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory(_))
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(file) => f.debug_tuple("File").field(&file.name()).finish(),
            Self::Directory(dir) => f.debug_tuple("Directory").field(&dir.name()).finish(),
        }
    }
}
