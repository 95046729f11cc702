//! Interactive command session.
//!
//! Reads one command per line and drives the scanner, the display and the
//! preview coordinator. Scans run in the background; their events are
//! handled between commands so the prompt stays responsive.

use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use imgsift_core::{FormatSelection, SUPPORTED_FORMATS, ScanSummary, StatusLevel};
use imgsift_display::{ImageDisplay, PreviewCoordinator};
use imgsift_scan::{
    DirectoryHandle, DirectoryScanner, FsDirectory, ScanConfig, ScanError, ScanEvent, start_scan,
};

use crate::commands::{
    CommandAction, FormatsCommand, HELP, ThemeCommand, ZoomCommand, parse_command,
};
use crate::render::{self, Theme};
use crate::settings::UserSettings;

/// Whether the session should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

struct RunningScan {
    events: mpsc::Receiver<ScanEvent>,
    cancel: CancellationToken,
}

/// State of one interactive session.
pub struct Session<W: Write> {
    out: W,
    theme: Theme,
    styled: bool,
    scanner: Arc<DirectoryScanner>,
    root: Option<Arc<dyn DirectoryHandle>>,
    formats: FormatSelection,
    display: ImageDisplay,
    preview: PreviewCoordinator,
    settings: UserSettings,
    settings_path: Option<PathBuf>,
    scan: Option<RunningScan>,
}

impl<W: Write> Session<W> {
    /// Create a session writing to `out`.
    ///
    /// Settings changes are saved to `settings_path` when one is given.
    /// `styled` enables theme colors and the prompt.
    pub fn new(
        out: W,
        settings: UserSettings,
        settings_path: Option<PathBuf>,
        styled: bool,
    ) -> Self {
        let theme = if styled {
            Theme::from_variant(settings.theme)
        } else {
            Theme::plain()
        };
        Self {
            out,
            theme,
            styled,
            scanner: Arc::new(DirectoryScanner::new()),
            root: None,
            formats: settings.format_selection(),
            display: ImageDisplay::with_sort(settings.sort),
            preview: PreviewCoordinator::new(),
            settings,
            settings_path,
            scan: None,
        }
    }

    /// Read and execute commands until `quit` or end of input.
    pub async fn run<R>(&mut self, input: R) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.prompt()?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if self.execute(parse_command(&line)).await? == Flow::Quit {
                        break;
                    }
                    self.prompt()?;
                }
                event = next_event(&mut self.scan) => {
                    match event {
                        Some(event) => self.handle_event(event)?,
                        None => self.scan_lost()?,
                    }
                    self.prompt()?;
                }
            }
        }

        if let Some(scan) = self.scan.take() {
            scan.cancel.cancel();
        }
        Ok(())
    }

    /// Execute one parsed command.
    pub async fn execute(&mut self, action: CommandAction) -> io::Result<Flow> {
        match action {
            CommandAction::None => {}
            CommandAction::Quit => return Ok(Flow::Quit),
            CommandAction::ShowHelp => writeln!(self.out, "{HELP}")?,
            CommandAction::Invalid(message) => self.notify(StatusLevel::Warning, &message)?,

            CommandAction::Browse(path) => self.browse(&path)?,
            CommandAction::Scan(Some(text)) => {
                // Typed paths are refused; only a picked folder can be scanned.
                if let Err(err) = self.scanner.scan_with_path(&text) {
                    self.notify(StatusLevel::Warning, &err.to_string())?;
                }
            }
            CommandAction::Scan(None) => self.begin_scan()?,
            CommandAction::Cancel => {
                if let Some(scan) = &self.scan {
                    scan.cancel.cancel();
                } else {
                    self.notify(StatusLevel::Warning, "No scan is running")?;
                }
            }

            CommandAction::Formats(command) => self.formats_command(command)?,
            CommandAction::Sort(column) => {
                let state = self.display.sort(column);
                self.settings.sort = state;
                self.save_settings();
                self.list()?;
            }

            CommandAction::Select(path) => {
                if !self.display.files().iter().any(|f| f.path() == path) {
                    self.notify(StatusLevel::Warning, &format!("'{path}' is not listed"))?;
                } else if self.display.toggle_selection(&path) {
                    writeln!(self.out, "Selected {path}")?;
                } else {
                    writeln!(self.out, "Deselected {path}")?;
                }
            }
            CommandAction::SelectAll(selected) => {
                self.display.select_all(selected);
                writeln!(self.out, "{} selected", self.display.selection_len())?;
            }
            CommandAction::Remove => {
                let removed = self.display.remove_selected();
                if removed == 0 {
                    self.notify(StatusLevel::Warning, "Nothing is selected")?;
                } else {
                    self.preview.close();
                    self.notify(
                        StatusLevel::Success,
                        &format!("Removed {removed} image(s)"),
                    )?;
                }
            }

            CommandAction::List => self.list()?,
            CommandAction::Search(term) => self.search(&term)?,
            CommandAction::Stats => {
                let line = render::stats(&self.display.format_stats());
                writeln!(self.out, "{line}")?;
            }
            CommandAction::Export(target) => self.export(target.as_deref())?,

            CommandAction::Open(path) => {
                let entries = self.display.preview_entries();
                let opened = self.preview.open(&path, entries).await.map(|_| ());
                match opened {
                    Ok(()) => self.show_preview()?,
                    Err(err) => self.notify(StatusLevel::Warning, &err.to_string())?,
                }
            }
            CommandAction::Next => {
                if !self.preview.is_open() {
                    self.notify(StatusLevel::Warning, "No preview is open")?;
                } else if self.preview.next().await.is_some() {
                    self.show_preview()?;
                } else {
                    writeln!(self.out, "Already at the last image")?;
                }
            }
            CommandAction::Previous => {
                if !self.preview.is_open() {
                    self.notify(StatusLevel::Warning, "No preview is open")?;
                } else if self.preview.previous().await.is_some() {
                    self.show_preview()?;
                } else {
                    writeln!(self.out, "Already at the first image")?;
                }
            }
            CommandAction::Close => {
                self.preview.close();
                writeln!(self.out, "Preview closed.")?;
            }
            CommandAction::Zoom(command) => {
                if !self.preview.is_open() {
                    self.notify(StatusLevel::Warning, "No preview is open")?;
                } else {
                    let viewport = self.preview.viewport_mut();
                    match command {
                        ZoomCommand::In => viewport.zoom_in(),
                        ZoomCommand::Out => viewport.zoom_out(),
                        ZoomCommand::Reset => viewport.reset(),
                    }
                    writeln!(self.out, "Zoom {:.0}%", viewport.zoom * 100.0)?;
                }
            }

            CommandAction::SetTheme(command) => {
                self.settings.theme = match command {
                    ThemeCommand::Set(variant) => variant,
                    ThemeCommand::Toggle => self.settings.theme.toggle(),
                };
                if self.styled {
                    self.theme = Theme::from_variant(self.settings.theme);
                }
                self.save_settings();
                writeln!(self.out, "Theme: {}", self.settings.theme)?;
            }
        }

        Ok(Flow::Continue)
    }

    /// Handle scan events until the running scan, if any, completes.
    pub async fn wait_for_scan(&mut self) -> io::Result<()> {
        loop {
            let event = match self.scan.as_mut() {
                Some(scan) => scan.events.recv().await,
                None => return Ok(()),
            };
            match event {
                Some(event) => self.handle_event(event)?,
                None => self.scan_lost()?,
            }
        }
    }

    /// The display owned by this session.
    pub fn display(&self) -> &ImageDisplay {
        &self.display
    }

    /// Whether a background scan is in flight.
    pub fn is_scanning(&self) -> bool {
        self.scan.is_some()
    }

    fn prompt(&mut self) -> io::Result<()> {
        if self.styled {
            write!(self.out, "imgsift> ")?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn notify(&mut self, level: StatusLevel, message: &str) -> io::Result<()> {
        let summary = ScanSummary {
            level,
            message: message.to_string(),
        };
        writeln!(self.out, "{}", render::summary_line(&self.theme, &summary))
    }

    fn save_settings(&self) {
        if let Some(path) = &self.settings_path {
            if let Err(err) = self.settings.save_to(path) {
                warn!(path = %path.display(), error = %err, "failed to save settings");
            }
        }
    }

    fn browse(&mut self, path: &Path) -> io::Result<()> {
        if self.scan.is_some() {
            return self.notify(StatusLevel::Warning, "A scan is already running");
        }
        match FsDirectory::open(path) {
            Ok(dir) => {
                self.root = Some(Arc::new(dir));
                self.begin_scan()
            }
            Err(err) => self.notify(StatusLevel::Error, &err.to_string()),
        }
    }

    fn begin_scan(&mut self) -> io::Result<()> {
        if self.scan.is_some() || self.scanner.is_busy() {
            return self.notify(StatusLevel::Warning, "A scan is already running");
        }
        let Some(root) = self.root.clone() else {
            return self.notify(StatusLevel::Warning, "Pick a folder first with 'browse DIR'");
        };

        let config = ScanConfig::new(self.formats.selected_formats());
        let cancel = CancellationToken::new();
        writeln!(self.out, "Scanning {}...", root.name())?;

        let events = start_scan(Arc::clone(&self.scanner), root, config, cancel.clone());
        self.display.begin_loading();
        self.scan = Some(RunningScan { events, cancel });
        Ok(())
    }

    fn handle_event(&mut self, event: ScanEvent) -> io::Result<()> {
        match event {
            ScanEvent::Progress(progress) => {
                debug!(
                    files = progress.files_seen,
                    dirs = progress.dirs_seen,
                    current = %progress.current_path,
                    "scan progress"
                );
                Ok(())
            }
            ScanEvent::Complete(outcome) => {
                self.scan = None;
                match outcome {
                    Ok(result) => {
                        let summary = result.summary();
                        let warnings = result.warnings.len();
                        self.preview.close();
                        self.display.set_result(result);

                        writeln!(self.out, "{}", render::summary_line(&self.theme, &summary))?;
                        if warnings > 0 {
                            self.notify(
                                StatusLevel::Warning,
                                &format!("{warnings} file(s) or folder(s) could not be read"),
                            )?;
                        }
                        if !self.display.is_empty() {
                            self.list()?;
                        }
                        Ok(())
                    }
                    Err(err) => self.scan_error(err),
                }
            }
        }
    }

    fn scan_error(&mut self, err: ScanError) -> io::Result<()> {
        self.display.scan_failed();
        match err {
            ScanError::Cancelled => self.notify(StatusLevel::Warning, "Scan cancelled"),
            ScanError::Busy => self.notify(StatusLevel::Warning, &err.to_string()),
            err if err.is_access_error() => self.notify(StatusLevel::Error, &err.to_string()),
            err => {
                warn!(error = %err, "scan failed");
                self.notify(StatusLevel::Error, "Something went wrong, please retry")
            }
        }
    }

    fn scan_lost(&mut self) -> io::Result<()> {
        warn!("scan task ended without a result");
        self.scan = None;
        self.display.scan_failed();
        self.notify(StatusLevel::Error, "Something went wrong, please retry")
    }

    fn formats_command(&mut self, command: FormatsCommand) -> io::Result<()> {
        match command {
            FormatsCommand::Show => {}
            FormatsCommand::All => self.formats.toggle_all(true),
            FormatsCommand::None => self.formats.toggle_all(false),
            FormatsCommand::Reset => self.formats.reset(),
            FormatsCommand::Set { format, checked } => {
                if !self.formats.set_checked(&format, checked) {
                    return self.notify(
                        StatusLevel::Warning,
                        &format!(
                            "Unknown format '{format}', choose from {}",
                            SUPPORTED_FORMATS.join(", ")
                        ),
                    );
                }
            }
        }
        self.settings.set_formats(&self.formats);
        self.save_settings();

        let dropped = self.display.filter_formats(&self.formats.selected_formats());
        if dropped > 0 {
            self.preview.close();
            writeln!(self.out, "Hid {dropped} image(s) of unchecked formats")?;
        }

        let line = SUPPORTED_FORMATS
            .iter()
            .map(|f| {
                let mark = if self.formats.is_checked(f) { "x" } else { " " };
                format!("[{mark}] {f}")
            })
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(self.out, "{line}")
    }

    fn list(&mut self) -> io::Result<()> {
        if let Some(message) = render::state_message(self.display.state()) {
            return writeln!(self.out, "{message}");
        }
        let table = render::table(&self.theme, &self.display.rows(), self.display.sort_state());
        writeln!(self.out, "{table}")
    }

    fn search(&mut self, term: &str) -> io::Result<()> {
        let hits: HashSet<&str> = self.display.search(term).iter().map(|f| f.path()).collect();
        let rows: Vec<_> = self
            .display
            .rows()
            .into_iter()
            .filter(|row| hits.contains(row.path.as_str()))
            .collect();

        if rows.is_empty() {
            return writeln!(self.out, "No match for '{term}'");
        }
        let table = render::table(&self.theme, &rows, self.display.sort_state());
        writeln!(self.out, "{table}")
    }

    fn export(&mut self, target: Option<&Path>) -> io::Result<()> {
        let snapshot = self.display.export();
        if snapshot.is_empty() {
            return self.notify(StatusLevel::Warning, "Nothing to export");
        }
        let json = snapshot.to_json().map_err(io::Error::other)?;

        match target {
            Some(path) => match std::fs::write(path, json) {
                Ok(()) => self.notify(
                    StatusLevel::Success,
                    &format!(
                        "Exported {} image(s) to {}",
                        snapshot.total_count,
                        path.display()
                    ),
                ),
                Err(err) => self.notify(
                    StatusLevel::Error,
                    &format!("Cannot write {}: {err}", path.display()),
                ),
            },
            None => writeln!(self.out, "{json}"),
        }
    }

    fn show_preview(&mut self) -> io::Result<()> {
        let pane = render::preview(&self.theme, &self.preview);
        writeln!(self.out, "{pane}")
    }
}

async fn next_event(scan: &mut Option<RunningScan>) -> Option<ScanEvent> {
    match scan {
        Some(scan) => scan.events.recv().await,
        None => std::future::pending().await,
    }
}
