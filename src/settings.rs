//! Persistent user settings.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use imgsift_core::FormatSelection;
use imgsift_display::SortState;

/// Color theme of the terminal output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    pub fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

/// Persistent user settings stored in config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Output theme.
    pub theme: ThemeVariant,
    /// Formats checked in the format picker.
    pub formats: Vec<String>,
    /// Last sort column and direction.
    pub sort: SortState,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: ThemeVariant::default(),
            formats: FormatSelection::default()
                .checked_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            sort: SortState::default(),
        }
    }
}

impl UserSettings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("imgsift").join("settings.toml"))
    }

    /// Load settings from the default location, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or unparsable.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Save settings to `path`.
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        std::fs::write(path, content)
    }

    /// The format picker restored from these settings.
    pub fn format_selection(&self) -> FormatSelection {
        FormatSelection::with_checked(&self.formats)
    }

    /// Remember the checked formats of `selection`.
    pub fn set_formats(&mut self, selection: &FormatSelection) {
        self.formats = selection
            .checked_names()
            .into_iter()
            .map(str::to_string)
            .collect();
    }
}
