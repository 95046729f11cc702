//! Session command parsing.

use std::path::PathBuf;
use std::str::FromStr;

use imgsift_display::SortColumn;

use crate::settings::ThemeVariant;

/// Action to perform after parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// No action (blank line).
    None,
    /// Quit the session.
    Quit,
    /// Show help.
    ShowHelp,
    /// Pick a folder and scan it.
    Browse(PathBuf),
    /// Rescan the picked folder, or try the legacy path scan with the text.
    Scan(Option<String>),
    /// Change the format picker.
    Formats(FormatsCommand),
    /// Sort by a column.
    Sort(SortColumn),
    /// Toggle selection of one path.
    Select(String),
    /// Select or deselect every row.
    SelectAll(bool),
    /// Remove selected rows.
    Remove,
    /// Print the table.
    List,
    /// Print rows matching a term.
    Search(String),
    /// Print per-format counts.
    Stats,
    /// Export to a file, or stdout.
    Export(Option<PathBuf>),
    /// Open the preview at a path.
    Open(String),
    /// Next preview.
    Next,
    /// Previous preview.
    Previous,
    /// Close the preview.
    Close,
    /// Zoom the preview.
    Zoom(ZoomCommand),
    /// Set theme.
    SetTheme(ThemeCommand),
    /// Cancel a running scan.
    Cancel,
    /// The line could not be understood.
    Invalid(String),
}

/// Format picker command variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatsCommand {
    Show,
    All,
    None,
    Reset,
    Set { format: String, checked: bool },
}

/// Zoom command variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomCommand {
    In,
    Out,
    Reset,
}

/// Theme command variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeCommand {
    Set(ThemeVariant),
    Toggle,
}

/// Session help text.
pub const HELP: &str = "\
Commands:
  browse DIR           pick a folder and scan it
  scan                 rescan the picked folder
  cancel               stop a running scan
  formats [all|none|reset|FMT on|off]
                       show or change the formats to keep
  sort path|size|extension
                       sort (again to reverse)
  select PATH          toggle selection of a row
  select-all / select-none
  remove               remove selected rows
  list                 print the listing
  search TERM          print rows whose path contains TERM
  stats                count images per format
  export [FILE]        write the listing as JSON
  open PATH            preview an image
  next / prev / close  navigate the preview
  zoom in|out|reset    zoom the preview
  theme [dark|light]   switch theme
  help                 show this text
  quit                 leave";

/// Parse one command line.
pub fn parse_command(cmd: &str) -> CommandAction {
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    if parts.is_empty() {
        return CommandAction::None;
    }
    // Arguments after the command word, inner spacing intact.
    let rest = || {
        cmd.trim()
            .split_once(char::is_whitespace)
            .map_or("", |(_, rest)| rest.trim_start())
            .to_string()
    };

    match parts[0] {
        "q" | "quit" | "exit" => CommandAction::Quit,
        "help" | "?" => CommandAction::ShowHelp,

        "browse" | "cd" => {
            if parts.len() > 1 {
                CommandAction::Browse(PathBuf::from(rest()))
            } else {
                CommandAction::Invalid("browse needs a folder".into())
            }
        }
        "scan" | "rescan" | "r" => {
            if parts.len() > 1 {
                CommandAction::Scan(Some(rest()))
            } else {
                CommandAction::Scan(None)
            }
        }
        "cancel" => CommandAction::Cancel,

        "formats" | "format" | "f" => match parts.get(1..) {
            Some([]) | None => CommandAction::Formats(FormatsCommand::Show),
            Some(["all"]) => CommandAction::Formats(FormatsCommand::All),
            Some(["none"]) => CommandAction::Formats(FormatsCommand::None),
            Some(["reset"]) => CommandAction::Formats(FormatsCommand::Reset),
            Some([format, "on"]) => CommandAction::Formats(FormatsCommand::Set {
                format: format.to_string(),
                checked: true,
            }),
            Some([format, "off"]) => CommandAction::Formats(FormatsCommand::Set {
                format: format.to_string(),
                checked: false,
            }),
            _ => CommandAction::Invalid("usage: formats [all|none|reset|FMT on|off]".into()),
        },

        "sort" | "s" => match parts.get(1).map(|c| SortColumn::from_str(c)) {
            Some(Ok(column)) => CommandAction::Sort(column),
            _ => CommandAction::Invalid("usage: sort path|size|extension".into()),
        },

        "select" | "x" => {
            if parts.len() > 1 {
                CommandAction::Select(rest())
            } else {
                CommandAction::Invalid("select needs a path".into())
            }
        }
        "select-all" => CommandAction::SelectAll(true),
        "select-none" | "unselect" => CommandAction::SelectAll(false),
        "remove" | "rm" => CommandAction::Remove,
        "list" | "ls" => CommandAction::List,
        "search" | "/" => CommandAction::Search(rest()),
        "stats" => CommandAction::Stats,
        "export" => {
            if parts.len() > 1 {
                CommandAction::Export(Some(PathBuf::from(rest())))
            } else {
                CommandAction::Export(None)
            }
        }

        "open" | "o" | "view" => {
            if parts.len() > 1 {
                CommandAction::Open(rest())
            } else {
                CommandAction::Invalid("open needs a path".into())
            }
        }
        "next" | "n" => CommandAction::Next,
        "prev" | "previous" | "p" => CommandAction::Previous,
        "close" => CommandAction::Close,
        "zoom" | "z" => match parts.get(1).copied() {
            Some("in" | "+") => CommandAction::Zoom(ZoomCommand::In),
            Some("out" | "-") => CommandAction::Zoom(ZoomCommand::Out),
            Some("reset" | "0") => CommandAction::Zoom(ZoomCommand::Reset),
            _ => CommandAction::Invalid("usage: zoom in|out|reset".into()),
        },

        "theme" | "t" => match parts.get(1).map(|t| ThemeVariant::from_str(t)) {
            None => CommandAction::SetTheme(ThemeCommand::Toggle),
            Some(Ok(variant)) => CommandAction::SetTheme(ThemeCommand::Set(variant)),
            Some(Err(_)) => CommandAction::Invalid("usage: theme [dark|light]".into()),
        },
        "dark" => CommandAction::SetTheme(ThemeCommand::Set(ThemeVariant::Dark)),
        "light" => CommandAction::SetTheme(ThemeCommand::Set(ThemeVariant::Light)),

        other => CommandAction::Invalid(format!("unknown command '{other}', try 'help'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse_command("q"), CommandAction::Quit);
        assert_eq!(parse_command("  quit  "), CommandAction::Quit);
        assert_eq!(parse_command(""), CommandAction::None);
    }

    #[test]
    fn test_parse_paths_keep_spaces() {
        assert_eq!(
            parse_command("browse /home/me/My Pictures"),
            CommandAction::Browse(PathBuf::from("/home/me/My Pictures"))
        );
        assert_eq!(
            parse_command("select trips/day one.png"),
            CommandAction::Select("trips/day one.png".into())
        );
    }

    #[test]
    fn test_parse_paths_keep_repeated_spaces() {
        assert_eq!(
            parse_command("  select a  b.png  "),
            CommandAction::Select("a  b.png".into())
        );
        assert_eq!(
            parse_command("open\tdir/x   y.jpg"),
            CommandAction::Open("dir/x   y.jpg".into())
        );
    }

    #[test]
    fn test_parse_scan() {
        assert_eq!(parse_command("scan"), CommandAction::Scan(None));
        assert_eq!(
            parse_command("scan /tmp/pics"),
            CommandAction::Scan(Some("/tmp/pics".into()))
        );
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(
            parse_command("formats"),
            CommandAction::Formats(FormatsCommand::Show)
        );
        assert_eq!(
            parse_command("formats webp on"),
            CommandAction::Formats(FormatsCommand::Set {
                format: "webp".into(),
                checked: true,
            })
        );
        assert!(matches!(
            parse_command("formats webp maybe"),
            CommandAction::Invalid(_)
        ));
    }

    #[test]
    fn test_parse_sort_and_theme() {
        assert_eq!(parse_command("sort SIZE"), CommandAction::Sort(SortColumn::Size));
        assert!(matches!(parse_command("sort date"), CommandAction::Invalid(_)));
        assert_eq!(
            parse_command("theme light"),
            CommandAction::SetTheme(ThemeCommand::Set(ThemeVariant::Light))
        );
        assert_eq!(
            parse_command("theme"),
            CommandAction::SetTheme(ThemeCommand::Toggle)
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert!(matches!(parse_command("frobnicate"), CommandAction::Invalid(_)));
    }
}
