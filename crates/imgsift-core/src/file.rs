//! Scanned file entries.

use compact_str::CompactString;

use crate::format::extension_of;
use crate::preview::{PreviewHandle, PreviewRef};

/// One image file discovered by a scan.
///
/// Immutable once created. Owns its preview handle, which is released when
/// the file is dropped.
#[derive(Debug)]
pub struct ScannedFile {
    path: CompactString,
    size_bytes: u64,
    mime_type: CompactString,
    extension: CompactString,
    preview: PreviewHandle,
}

impl ScannedFile {
    /// Create a new scanned file. The extension is derived from `path`.
    pub fn new(
        path: impl Into<CompactString>,
        size_bytes: u64,
        mime_type: impl Into<CompactString>,
        preview: PreviewHandle,
    ) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(path.as_str());
        let extension = extension_of(name);
        Self {
            path,
            size_bytes,
            mime_type: mime_type.into(),
            extension,
            preview,
        }
    }

    /// Relative path from the scan root, `/`-separated.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name (last path component).
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Size in bytes at scan time.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Best-effort mime type, possibly empty.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Lower-cased extension without the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The owned preview handle.
    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    /// A non-owning reference to the preview handle.
    pub fn preview_ref(&self) -> PreviewRef {
        self.preview.view()
    }
}
