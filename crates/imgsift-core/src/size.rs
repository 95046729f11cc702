//! Human-readable byte sizes.

use humansize::{FormatSizeOptions, WINDOWS};

/// Format a byte count with 1024-based `B`/`KB`/`MB`/`GB`/`TB` units, one
/// decimal at most (`1 KB`, `6.8 KB`).
pub fn format_size(bytes: u64) -> String {
    let options: FormatSizeOptions = WINDOWS.decimal_places(1);
    let formatted = humansize::format_size(bytes, options);

    let Some((value, unit)) = formatted.split_once(' ') else {
        return formatted;
    };
    let value = value.strip_suffix(".0").unwrap_or(value);
    let unit = if unit == "kB" { "KB" } else { unit };
    format!("{value} {unit}")
}
