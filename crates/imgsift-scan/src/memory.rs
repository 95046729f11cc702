//! In-memory directory trees.
//!
//! Useful for embedding imgsift where files do not live on a local disk,
//! and for exercising failure paths (unreadable files, denied directories)
//! that are awkward to reproduce on a real filesystem.

use std::io;
use std::sync::Arc;

use compact_str::CompactString;

use imgsift_core::{PreviewSource, extension_of, mime_for_extension};

use crate::handle::{DirectoryHandle, Entry, FileHandle, FileInfo};

/// A file held in memory.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: CompactString,
    bytes: Arc<[u8]>,
    mime_type: Option<CompactString>,
    failure: Option<io::ErrorKind>,
}

impl MemoryFile {
    /// A file with the given contents.
    pub fn new(name: impl Into<CompactString>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::from(bytes.into()),
            mime_type: None,
            failure: None,
        }
    }

    /// A file of `size` zero bytes.
    pub fn with_size(name: impl Into<CompactString>, size: usize) -> Self {
        Self::new(name, vec![0u8; size])
    }

    /// A file whose `open` always fails with permission denied.
    pub fn unreadable(name: impl Into<CompactString>) -> Self {
        Self {
            failure: Some(io::ErrorKind::PermissionDenied),
            ..Self::new(name, Vec::new())
        }
    }

    /// Override the reported mime type.
    pub fn mime(mut self, mime_type: impl Into<CompactString>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

impl FileHandle for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self) -> io::Result<FileInfo> {
        if let Some(kind) = self.failure {
            return Err(io::Error::new(kind, format!("cannot open {}", self.name)));
        }
        let mime_type = self
            .mime_type
            .clone()
            .unwrap_or_else(|| mime_for_extension(&extension_of(&self.name)).into());
        Ok(FileInfo {
            size: self.bytes.len() as u64,
            mime_type,
        })
    }

    fn preview_source(&self) -> PreviewSource {
        PreviewSource::Bytes(Arc::clone(&self.bytes))
    }
}

#[derive(Debug, Clone)]
enum MemoryNode {
    File(MemoryFile),
    Directory(MemoryDirectory),
}

/// A directory held in memory.
#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    name: CompactString,
    children: Vec<MemoryNode>,
    denied: bool,
}

impl MemoryDirectory {
    /// An empty directory.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            denied: false,
        }
    }

    /// A directory that refuses to be listed.
    pub fn denied(name: impl Into<CompactString>) -> Self {
        Self {
            denied: true,
            ..Self::new(name)
        }
    }

    /// Add a file.
    pub fn file(mut self, file: MemoryFile) -> Self {
        self.children.push(MemoryNode::File(file));
        self
    }

    /// Add a subdirectory.
    pub fn dir(mut self, dir: MemoryDirectory) -> Self {
        self.children.push(MemoryNode::Directory(dir));
        self
    }
}

impl DirectoryHandle for MemoryDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> io::Result<Vec<Entry>> {
        if self.denied {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot list {}", self.name),
            ));
        }
        Ok(self
            .children
            .iter()
            .map(|child| match child {
                MemoryNode::File(f) => Entry::File(Box::new(f.clone())),
                MemoryNode::Directory(d) => Entry::Directory(Box::new(d.clone())),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_file_open() {
        let file = MemoryFile::with_size("a.png", 1024);
        let info = file.open().unwrap();
        assert_eq!(info.size, 1024);
        assert_eq!(info.mime_type, "image/png");

        let custom = MemoryFile::new("b", b"abc".to_vec()).mime("application/octet-stream");
        assert_eq!(custom.open().unwrap().mime_type, "application/octet-stream");
    }

    #[test]
    fn test_unreadable_file() {
        let file = MemoryFile::unreadable("x.jpg");
        let err = file.open().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_directory_listing() {
        let dir = MemoryDirectory::new("root")
            .file(MemoryFile::with_size("a.png", 1))
            .dir(MemoryDirectory::new("sub"));
        let entries = dir.entries().unwrap();
        let names: Vec<_> = entries.iter().map(Entry::name).collect();
        assert_eq!(names, vec!["a.png", "sub"]);

        assert!(MemoryDirectory::denied("nope").entries().is_err());
    }
}
