//! Filesystem-backed directory handles.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use tracing::{debug, warn};

use imgsift_core::{PreviewSource, ScanError, extension_of, mime_for_extension};

use crate::handle::{DirectoryHandle, Entry, FileHandle, FileInfo};

/// A directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsDirectory {
    path: PathBuf,
    name: CompactString,
    follow_symlinks: bool,
}

impl FsDirectory {
    /// Grant access to a directory, the way a folder picker would.
    ///
    /// The path is canonicalized and must name a directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let root = path.canonicalize().map_err(|e| ScanError::io(path, e))?;

        if !root.is_dir() {
            return Err(ScanError::NotADirectory { path: root });
        }

        Ok(Self::from_parts(root, false))
    }

    /// Follow symbolic links while listing.
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Absolute path of this directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn from_parts(path: PathBuf, follow_symlinks: bool) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self {
            path,
            name: name.into(),
            follow_symlinks,
        }
    }
}

impl DirectoryHandle for FsDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();

        for dir_entry in fs::read_dir(&self.path)? {
            let dir_entry = match dir_entry {
                Ok(e) => e,
                Err(err) => {
                    warn!(dir = %self.path.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            let path = dir_entry.path();
            let mut file_type = match dir_entry.file_type() {
                Ok(t) => t,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "cannot read file type");
                    continue;
                }
            };

            if file_type.is_symlink() {
                if !self.follow_symlinks {
                    debug!(path = %path.display(), "skipping symlink");
                    continue;
                }
                match fs::metadata(&path) {
                    Ok(target) => file_type = target.file_type(),
                    Err(err) => {
                        debug!(path = %path.display(), error = %err, "skipping broken symlink");
                        continue;
                    }
                }
            }

            if file_type.is_dir() {
                entries.push(Entry::Directory(Box::new(FsDirectory::from_parts(
                    path,
                    self.follow_symlinks,
                ))));
            } else if file_type.is_file() {
                entries.push(Entry::File(Box::new(FsFile::new(path))));
            }
        }

        Ok(entries)
    }
}

/// A regular file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsFile {
    path: PathBuf,
    name: CompactString,
}

impl FsFile {
    /// Wrap a file path.
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            path,
            name: name.into(),
        }
    }
}

impl FileHandle for FsFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self) -> io::Result<FileInfo> {
        let file = fs::File::open(&self.path)?;
        let metadata = file.metadata()?;
        Ok(FileInfo {
            size: metadata.len(),
            mime_type: mime_for_extension(&extension_of(&self.name)).into(),
        })
    }

    fn preview_source(&self) -> PreviewSource {
        PreviewSource::Path(self.path.clone())
    }
}
