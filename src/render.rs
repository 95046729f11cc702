//! Plain-text rendering of the listing, stats and preview pane.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use compact_str::CompactString;
use itertools::Itertools;

use imgsift_core::{ScanSummary, StatusLevel};
use imgsift_display::{
    DisplayRow, DisplayState, PaneState, PreviewCoordinator, SortColumn, SortState,
};

use crate::settings::ThemeVariant;

const PATH_WIDTH: usize = 48;

/// ANSI styles for one theme variant.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub header: &'static str,
    pub accent: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            header: "\x1b[1;96m",
            accent: "\x1b[92m",
            warning: "\x1b[93m",
            error: "\x1b[91m",
            muted: "\x1b[90m",
            reset: "\x1b[0m",
        }
    }

    pub fn light() -> Self {
        Self {
            header: "\x1b[1;34m",
            accent: "\x1b[32m",
            warning: "\x1b[33m",
            error: "\x1b[31m",
            muted: "\x1b[2m",
            reset: "\x1b[0m",
        }
    }

    /// No escape codes, for pipes and tests.
    pub fn plain() -> Self {
        Self {
            header: "",
            accent: "",
            warning: "",
            error: "",
            muted: "",
            reset: "",
        }
    }

    pub fn from_variant(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Dark => Self::dark(),
            ThemeVariant::Light => Self::light(),
        }
    }
}

/// Status line for a finished scan.
pub fn summary_line(theme: &Theme, summary: &ScanSummary) -> String {
    let style = match summary.level {
        StatusLevel::Success => theme.accent,
        StatusLevel::Warning => theme.warning,
        StatusLevel::Error => theme.error,
    };
    format!("{style}{}{}", summary.message, theme.reset)
}

/// Message shown instead of a table.
pub fn state_message(state: DisplayState) -> Option<&'static str> {
    match state {
        DisplayState::NeverScanned => Some("No folder scanned yet. Use 'browse DIR' to pick one."),
        DisplayState::Loading => Some("Scanning..."),
        DisplayState::Empty => Some("No images to show."),
        DisplayState::Populated => None,
    }
}

fn header_cell(label: &str, column: SortColumn, sort: SortState) -> String {
    if sort.column == column {
        format!("{label} {}", sort.direction.arrow())
    } else {
        label.to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 1).collect();
        format!("{kept}…")
    }
}

/// The listing table.
pub fn table(theme: &Theme, rows: &[DisplayRow], sort: SortState) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}{:>5}  {:<PATH_WIDTH$} {:>10}  {:<6}{}",
        theme.header,
        "#",
        header_cell("Path", SortColumn::Path, sort),
        header_cell("Size", SortColumn::Size, sort),
        header_cell("Type", SortColumn::Extension, sort),
        theme.reset,
    );
    let _ = writeln!(out, "{}", "─".repeat(PATH_WIDTH + 28));

    for row in rows {
        let marker = if row.selected { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker}{:>4}  {:<PATH_WIDTH$} {:>10}  {}{:<6}{}",
            row.index,
            truncate(&row.path, PATH_WIDTH),
            row.size_formatted,
            theme.muted,
            row.file_type,
            theme.reset,
        );
    }

    let selected = rows.iter().filter(|r| r.selected).count();
    let _ = write!(out, "{} image(s)", rows.len());
    if selected > 0 {
        let _ = write!(out, ", {selected} selected");
    }
    out
}

/// Per-format counts, e.g. `JPG: 3  PNG: 1`.
pub fn stats(stats: &BTreeMap<CompactString, usize>) -> String {
    if stats.is_empty() {
        return "No images.".to_string();
    }
    stats
        .iter()
        .map(|(format, count)| format!("{}: {count}", format.to_uppercase()))
        .join("  ")
}

/// The preview pane with its sidebar.
pub fn preview(theme: &Theme, coordinator: &PreviewCoordinator) -> String {
    let Some(pane) = coordinator.pane() else {
        return "Preview closed.".to_string();
    };

    let mut out = String::new();
    if let Some((position, total)) = coordinator.position() {
        let _ = writeln!(
            out,
            "{}{} ({position}/{total}){}",
            theme.header, pane.entry.path, theme.reset
        );
    }
    if let PaneState::Failed(message) = &pane.state {
        let _ = writeln!(out, "{}{message}{}", theme.error, theme.reset);
    }
    for (label, value) in pane.sidebar() {
        let _ = writeln!(out, "  {label:<11} {value}");
    }

    let viewport = coordinator.viewport();
    let _ = write!(
        out,
        "{}  zoom {:.0}%{}{}",
        theme.muted,
        viewport.zoom * 100.0,
        nav_hint(coordinator),
        theme.reset
    );
    out
}

fn nav_hint(coordinator: &PreviewCoordinator) -> &'static str {
    match (coordinator.has_previous(), coordinator.has_next()) {
        (true, true) => "  [prev | next]",
        (true, false) => "  [prev]",
        (false, true) => "  [next]",
        (false, false) => "",
    }
}
