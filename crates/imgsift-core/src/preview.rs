//! Revocable preview handles.
//!
//! A [`PreviewHandle`] grants access to one file's bytes for display. The
//! handle is owned by the [`ScannedFile`](crate::ScannedFile) it belongs to
//! and is released when that file is dropped, so a handle is released
//! exactly once no matter how its file leaves the displayed set. Viewers get
//! a [`PreviewRef`], which can read the source while the handle is alive but
//! never release it.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::{trace, warn};

/// Identifier of a preview handle within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewId(pub u64);

/// Where the bytes behind a preview handle live.
#[derive(Debug, Clone)]
pub enum PreviewSource {
    /// A file on disk.
    Path(PathBuf),
    /// Bytes already held in memory.
    Bytes(Arc<[u8]>),
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: AtomicU64,
    live: DashMap<PreviewId, PreviewSource>,
}

/// Allocates and tracks live preview handles.
///
/// Cloning the registry shares the same set of handles.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<RegistryInner>,
}

impl PreviewRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle for a source.
    pub fn allocate(&self, source: PreviewSource) -> PreviewHandle {
        let id = PreviewId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.live.insert(id, source);
        trace!(id = id.0, "preview handle allocated");
        PreviewHandle {
            id,
            registry: self.clone(),
        }
    }

    /// Number of handles not yet released.
    pub fn live_count(&self) -> usize {
        self.inner.live.len()
    }

    /// Whether a handle is still live.
    pub fn is_live(&self, id: PreviewId) -> bool {
        self.inner.live.contains_key(&id)
    }

    fn resolve(&self, id: PreviewId) -> Option<PreviewSource> {
        self.inner.live.get(&id).map(|entry| entry.value().clone())
    }

    fn release(&self, id: PreviewId) {
        if self.inner.live.remove(&id).is_some() {
            trace!(id = id.0, "preview handle released");
        } else {
            warn!(id = id.0, "preview handle released twice");
        }
    }
}

/// Owned, revocable access to one file's bytes.
///
/// Not clonable; dropping it releases the underlying resource.
pub struct PreviewHandle {
    id: PreviewId,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    /// Identifier of this handle.
    pub fn id(&self) -> PreviewId {
        self.id
    }

    /// Source of the bytes behind this handle.
    pub fn source(&self) -> Option<PreviewSource> {
        self.registry.resolve(self.id)
    }

    /// A non-owning reference for viewers.
    pub fn view(&self) -> PreviewRef {
        PreviewRef {
            id: self.id,
            registry: self.registry.clone(),
        }
    }

    /// Release the handle now.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.id.0).finish()
    }
}

/// Read-only view of a preview handle owned elsewhere.
#[derive(Clone)]
pub struct PreviewRef {
    id: PreviewId,
    registry: PreviewRegistry,
}

impl PreviewRef {
    /// Identifier of the referenced handle.
    pub fn id(&self) -> PreviewId {
        self.id
    }

    /// Source of the bytes, or `None` once the owning handle is released.
    pub fn source(&self) -> Option<PreviewSource> {
        self.registry.resolve(self.id)
    }
}

impl fmt::Debug for PreviewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreviewRef").field(&self.id.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_releases_handle() {
        let registry = PreviewRegistry::new();
        let handle = registry.allocate(PreviewSource::Path(PathBuf::from("a.png")));
        let id = handle.id();
        assert_eq!(registry.live_count(), 1);
        assert!(registry.is_live(id));

        drop(handle);
        assert_eq!(registry.live_count(), 0);
        assert!(!registry.is_live(id));
    }

    #[test]
    fn test_view_does_not_outlive_handle() {
        let registry = PreviewRegistry::new();
        let handle = registry.allocate(PreviewSource::Bytes(Arc::from(&b"abc"[..])));
        let view = handle.view();
        assert!(view.source().is_some());

        drop(view.clone());
        assert_eq!(registry.live_count(), 1);

        handle.release();
        assert!(view.source().is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = PreviewRegistry::new();
        let a = registry.allocate(PreviewSource::Path(PathBuf::from("a")));
        let b = registry.allocate(PreviewSource::Path(PathBuf::from("b")));
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.live_count(), 2);
    }
}
