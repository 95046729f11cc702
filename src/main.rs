//! imgsift - scan a folder for images, sort and prune the listing, and page
//! through previews.
//!
//! Usage:
//!   imgsift [DIR]                 Interactive session (scans DIR if given)
//!   imgsift scan DIR              Print the image listing
//!   imgsift export DIR [-o FILE]  Export the listing to JSON
//!   imgsift --help                Show help

mod commands;
mod render;
mod session;
mod settings;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use imgsift_core::{FormatFilterConfig, ScanConfig, ScanResult, StatusLevel};
use imgsift_display::{ImageDisplay, SortColumn, SortDirection, SortState};
use imgsift_scan::{DirectoryScanner, FsDirectory, ScanEvent, start_scan};

use crate::commands::CommandAction;
use crate::render::Theme;
use crate::session::Session;
use crate::settings::UserSettings;

#[derive(Parser)]
#[command(
    name = "imgsift",
    version,
    about = "Scan a folder for images and browse them",
    long_about = "imgsift finds the images in a folder tree, lists them with their sizes \
                  and lets you sort, prune, export and preview them.\n\n\
                  Start an interactive session with `imgsift [DIR]`, or use \
                  subcommands for one-shot listings."
)]
struct Cli {
    /// Folder to scan when the session starts
    dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a folder and print the image listing
    Scan {
        /// Folder to scan
        dir: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        /// Column to sort by: path, size, extension (defaults to the saved sort)
        #[arg(short, long)]
        sort: Option<SortColumn>,

        /// Sort in descending order
        #[arg(short, long)]
        desc: bool,
    },

    /// Scan a folder and export the listing as JSON
    Export {
        /// Folder to scan
        dir: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Formats to keep, e.g. "jpg,png" (defaults to the saved selection)
    #[arg(short, long, value_delimiter = ',')]
    formats: Option<Vec<String>>,

    /// Skip files and folders starting with a dot
    #[arg(long)]
    no_hidden: bool,

    /// Maximum folder depth to descend into
    #[arg(long)]
    max_depth: Option<u32>,

    /// Glob of entry names to skip (repeatable)
    #[arg(short, long)]
    ignore: Vec<String>,
}

impl FilterArgs {
    fn scan_config(self) -> Result<ScanConfig> {
        let formats = match self.formats {
            Some(formats) => FormatFilterConfig::new(formats),
            None => UserSettings::load().format_selection().selected_formats(),
        };
        ScanConfig::builder()
            .formats(formats)
            .include_hidden(!self.no_hidden)
            .max_depth(self.max_depth)
            .ignore_patterns(self.ignore)
            .build()
            .wrap_err("Invalid scan options")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Command::Scan {
            dir,
            filter,
            sort,
            desc,
        }) => {
            let sort = scan_sort(sort, desc, UserSettings::load().sort);
            run_scan(&dir, filter.scan_config()?, sort).await?;
        }
        Some(Command::Export {
            dir,
            output,
            filter,
        }) => {
            run_export(&dir, filter.scan_config()?, output).await?;
        }
        None => {
            run_session(cli.dir).await?;
        }
    }

    Ok(())
}

/// Sort for a one-shot listing. Without `--sort` the saved preference is
/// used, made descending by `--desc`.
fn scan_sort(column: Option<SortColumn>, desc: bool, saved: SortState) -> SortState {
    match column {
        Some(column) => {
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            SortState::new(column, direction)
        }
        None => {
            if desc {
                SortState::new(saved.column, SortDirection::Descending)
            } else {
                saved
            }
        }
    }
}

/// Install the log subscriber. `RUST_LOG` overrides the default filter.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "imgsift=debug,imgsift_core=debug,imgsift_scan=debug,imgsift_display=debug,warn"
    } else {
        "imgsift=info,imgsift_core=info,imgsift_scan=info,imgsift_display=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

/// Scan a folder in the background and wait for the result.
async fn scan_folder(dir: &Path, config: ScanConfig) -> Result<ScanResult> {
    let root = FsDirectory::open(dir).wrap_err("Invalid path")?;
    eprintln!("Scanning {}...", root.path().display());

    let scanner = Arc::new(DirectoryScanner::new());
    let mut events = start_scan(scanner, Arc::new(root), config, CancellationToken::new());

    while let Some(event) = events.recv().await {
        if let ScanEvent::Complete(result) = event {
            return result.wrap_err("Scan failed");
        }
    }
    Err(eyre!("scan ended without a result"))
}

/// Scan and print the listing.
async fn run_scan(dir: &Path, config: ScanConfig, sort: SortState) -> Result<()> {
    let result = scan_folder(dir, config).await?;
    let summary = result.summary();
    let warnings = result.warnings.len();

    let mut display = ImageDisplay::with_sort(sort);
    display.set_result(result);

    let theme = if std::io::stdout().is_terminal() {
        Theme::from_variant(UserSettings::load().theme)
    } else {
        Theme::plain()
    };

    eprintln!("{}", render::summary_line(&theme, &summary));
    if warnings > 0 {
        eprintln!("{warnings} file(s) or folder(s) could not be read");
    }
    if !display.is_empty() {
        println!("{}", render::table(&theme, &display.rows(), display.sort_state()));
        println!("{}", render::stats(&display.format_stats()));
    }

    Ok(())
}

/// Scan and export the listing to JSON.
async fn run_export(dir: &Path, config: ScanConfig, output: Option<PathBuf>) -> Result<()> {
    let result = scan_folder(dir, config).await?;
    let mut display = ImageDisplay::new();
    display.set_result(result);

    let snapshot = display.export();
    if snapshot.is_empty() {
        let summary = imgsift_core::ScanSummary {
            level: StatusLevel::Warning,
            message: "Nothing to export".to_string(),
        };
        eprintln!("{}", render::summary_line(&Theme::plain(), &summary));
    }
    let json = snapshot.to_json()?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)
                .wrap_err_with(|| format!("Cannot write {}", output_path.display()))?;
            eprintln!(
                "Exported {} image(s) to {}",
                snapshot.total_count,
                output_path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

/// Run the interactive session on stdin/stdout.
async fn run_session(dir: Option<PathBuf>) -> Result<()> {
    let styled = std::io::stdout().is_terminal();
    let mut session = Session::new(
        std::io::stdout(),
        UserSettings::load(),
        UserSettings::config_path(),
        styled,
    );
    info!("session started");

    if styled {
        println!("imgsift {} - type 'help' for commands", env!("CARGO_PKG_VERSION"));
    }
    if let Some(dir) = dir {
        session.execute(CommandAction::Browse(dir)).await?;
    }

    let stdin = BufReader::new(tokio::io::stdin());
    session.run(stdin).await?;
    Ok(())
}
