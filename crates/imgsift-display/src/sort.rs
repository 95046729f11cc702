//! Column sorting for the image listing.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use imgsift_core::ScannedFile;

/// Column the listing can be sorted by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    #[default]
    Path,
    Size,
    Extension,
}

/// Sort direction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[strum(serialize = "asc", serialize = "ascending")]
    Ascending,
    #[strum(serialize = "desc", serialize = "descending")]
    Descending,
}

impl SortDirection {
    /// The other direction.
    pub fn reverse(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Arrow shown next to the active column header.
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "↑",
            Self::Descending => "↓",
        }
    }
}

/// The active sort column and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortState {
    /// Create a sort state.
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Apply a user's request to sort by `column`.
    ///
    /// The active column flips direction; any other column becomes active
    /// in ascending order.
    pub fn request(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.reverse();
        } else {
            self.column = column;
            self.direction = SortDirection::Ascending;
        }
    }

    /// Reorder `files` in place.
    ///
    /// The sort is stable with respect to the current order, and descending
    /// order is the exact reverse of the ascending arrangement.
    pub fn apply(&self, files: &mut [ScannedFile]) {
        files.sort_by_cached_key(|file| SortKey::of(file, self.column));
        if self.direction == SortDirection::Descending {
            files.reverse();
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Text(String),
    Size(u64),
}

impl SortKey {
    fn of(file: &ScannedFile, column: SortColumn) -> Self {
        match column {
            SortColumn::Path => Self::Text(file.path().to_lowercase()),
            SortColumn::Extension => Self::Text(file.extension().to_lowercase()),
            SortColumn::Size => Self::Size(file.size_bytes()),
        }
    }
}

/// Compare two files by a column, ascending.
pub fn compare(a: &ScannedFile, b: &ScannedFile, column: SortColumn) -> Ordering {
    SortKey::of(a, column).cmp(&SortKey::of(b, column))
}
