//! One-at-a-time image preview.
//!
//! The [`PreviewCoordinator`] pages through a read-only copy of the
//! displayed list. Each image it lands on is probed for its natural
//! dimensions on the blocking pool; a probe failure shows up in the pane and
//! never stops navigation.

use std::io::{self, Cursor};

use compact_str::CompactString;
use image::ImageReader;
use thiserror::Error;
use tracing::{debug, warn};

use imgsift_core::{PreviewRef, PreviewSource, ScannedFile, format_size};

/// Errors raised while opening a preview.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("there are no images to preview")]
    EmptySet,

    #[error("'{path}' is no longer displayed")]
    StaleEntry { path: CompactString },

    #[error("the preview of '{path}' has been released")]
    HandleReleased { path: CompactString },

    #[error("cannot read '{path}': {source}")]
    Io {
        path: CompactString,
        #[source]
        source: io::Error,
    },

    #[error("cannot decode '{path}': {message}")]
    Decode { path: CompactString, message: String },
}

/// Read-only copy of a displayed file.
#[derive(Debug, Clone)]
pub struct PreviewEntry {
    pub path: CompactString,
    pub size_bytes: u64,
    pub extension: CompactString,
    pub mime_type: CompactString,
    pub preview: PreviewRef,
}

impl PreviewEntry {
    pub fn from_file(file: &ScannedFile) -> Self {
        Self {
            path: file.path().into(),
            size_bytes: file.size_bytes(),
            extension: file.extension().into(),
            mime_type: file.mime_type().into(),
            preview: file.preview_ref(),
        }
    }
}

/// Loading state of the pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneState {
    Loading,
    Ready { width: u32, height: u32 },
    Failed(String),
}

/// The image currently shown.
#[derive(Debug, Clone)]
pub struct PreviewPane {
    pub entry: PreviewEntry,
    pub state: PaneState,
}

impl PreviewPane {
    fn loading(entry: PreviewEntry) -> Self {
        Self {
            entry,
            state: PaneState::Loading,
        }
    }

    /// Natural dimensions, once known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self.state {
            PaneState::Ready { width, height } => Some((width, height)),
            _ => None,
        }
    }

    /// Label/value pairs for the metadata sidebar.
    pub fn sidebar(&self) -> Vec<(&'static str, String)> {
        let resolution = match &self.state {
            PaneState::Loading => "loading...".to_string(),
            PaneState::Ready { width, height } => format!("{width} x {height}"),
            PaneState::Failed(_) => "unavailable".to_string(),
        };
        let file_type = if self.entry.mime_type.is_empty() {
            self.entry.extension.to_uppercase().to_string()
        } else {
            self.entry.mime_type.to_string()
        };

        vec![
            ("Path", self.entry.path.to_string()),
            ("Size", format_size(self.entry.size_bytes)),
            ("Type", file_type),
            ("Resolution", resolution),
            ("GPS", "none".to_string()),
        ]
    }
}

const ZOOM_STEP: f32 = 1.25;
const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 8.0;

/// Zoom and pan of the preview pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f32,
    pub offset: (i32, i32),
}

impl Viewport {
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.offset = (
            self.offset.0.saturating_add(dx),
            self.offset.1.saturating_add(dy),
        );
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset: (0, 0),
        }
    }
}

/// Steps through displayed images one at a time.
///
/// Holds only [`PreviewRef`]s, so closing or dropping the coordinator never
/// releases a file's preview.
#[derive(Debug, Default)]
pub struct PreviewCoordinator {
    entries: Vec<PreviewEntry>,
    current: Option<usize>,
    pane: Option<PreviewPane>,
    viewport: Viewport,
}

impl PreviewCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `path` out of `within`, the displayed list in display order.
    pub async fn open(
        &mut self,
        path: &str,
        within: Vec<PreviewEntry>,
    ) -> Result<&PreviewPane, PreviewError> {
        if within.is_empty() {
            return Err(PreviewError::EmptySet);
        }
        let Some(index) = within.iter().position(|e| e.path == path) else {
            warn!(path, "preview requested for an entry that is not displayed");
            return Err(PreviewError::StaleEntry { path: path.into() });
        };

        self.entries = within;
        self.viewport.reset();
        Ok(self.show(index).await)
    }

    /// Move to the next image. Does nothing on the last one.
    pub async fn next(&mut self) -> Option<&PreviewPane> {
        let index = self.current?;
        if index + 1 >= self.entries.len() {
            return None;
        }
        Some(self.show(index + 1).await)
    }

    /// Move to the previous image. Does nothing on the first one.
    pub async fn previous(&mut self) -> Option<&PreviewPane> {
        let index = self.current?.checked_sub(1)?;
        Some(self.show(index).await)
    }

    /// Close the pane and reset the viewport.
    pub fn close(&mut self) {
        self.entries.clear();
        self.current = None;
        self.pane = None;
        self.viewport.reset();
    }

    pub fn is_open(&self) -> bool {
        self.pane.is_some()
    }

    pub fn pane(&self) -> Option<&PreviewPane> {
        self.pane.as_ref()
    }

    /// 1-based position and total, e.g. `(3, 10)`.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current.map(|i| (i + 1, self.entries.len()))
    }

    pub fn has_next(&self) -> bool {
        self.current.is_some_and(|i| i + 1 < self.entries.len())
    }

    pub fn has_previous(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    async fn show(&mut self, index: usize) -> &PreviewPane {
        let entry = self.entries[index].clone();
        debug!(path = %entry.path, index, "showing preview");

        self.current = Some(index);
        let pane = self.pane.insert(PreviewPane::loading(entry.clone()));
        pane.state = probe(&entry).await;
        pane
    }
}

async fn probe(entry: &PreviewEntry) -> PaneState {
    let Some(source) = entry.preview.source() else {
        let err = PreviewError::HandleReleased {
            path: entry.path.clone(),
        };
        return PaneState::Failed(err.to_string());
    };

    let path = entry.path.clone();
    let probed = tokio::task::spawn_blocking(move || read_dimensions(&path, &source)).await;

    match probed {
        Ok(Ok((width, height))) => PaneState::Ready { width, height },
        Ok(Err(err)) => {
            warn!(path = %entry.path, error = %err, "failed to read image dimensions");
            PaneState::Failed(err.to_string())
        }
        Err(err) => PaneState::Failed(err.to_string()),
    }
}

/// Read an image's natural dimensions without decoding the pixels.
pub fn read_dimensions(path: &str, source: &PreviewSource) -> Result<(u32, u32), PreviewError> {
    let io_err = |source: io::Error| PreviewError::Io {
        path: path.into(),
        source,
    };
    let decode_err = |err: image::ImageError| PreviewError::Decode {
        path: path.into(),
        message: err.to_string(),
    };

    match source {
        PreviewSource::Path(file) => ImageReader::open(file)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(io_err)?
            .into_dimensions()
            .map_err(decode_err),
        PreviewSource::Bytes(bytes) => ImageReader::new(Cursor::new(&bytes[..]))
            .with_guessed_format()
            .map_err(io_err)?
            .into_dimensions()
            .map_err(decode_err),
    }
}
