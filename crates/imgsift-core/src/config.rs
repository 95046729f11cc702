//! Scan configuration types.

use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::format::FormatFilterConfig;

/// Configuration for scanning operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Formats to keep (empty = every supported image format).
    #[builder(default)]
    #[serde(default)]
    pub formats: FormatFilterConfig,

    /// Maximum depth to traverse (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Patterns to ignore (glob syntax, matched against entry names).
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,
}

fn default_true() -> bool {
    true
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref patterns) = self.ignore_patterns {
            for pattern in patterns {
                Glob::new(pattern).map_err(|e| format!("Invalid ignore pattern {pattern:?}: {e}"))?;
            }
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a config keeping the given formats.
    pub fn new(formats: FormatFilterConfig) -> Self {
        Self {
            formats,
            max_depth: None,
            ignore_patterns: Vec::new(),
            include_hidden: true,
        }
    }

    /// Compile the ignore patterns.
    pub fn ignore_set(&self) -> Result<GlobSet, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.ignore_patterns {
            builder.add(Glob::new(pattern)?);
        }
        builder.build()
    }

    /// Check if hidden files should be skipped.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        !self.include_hidden && name.starts_with('.')
    }

    /// Whether an entry at `depth` (root children are depth 1) is too deep.
    pub fn exceeds_depth(&self, depth: u32) -> bool {
        self.max_depth.is_some_and(|max| depth > max)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(FormatFilterConfig::any())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .formats(FormatFilterConfig::new(["png"]))
            .max_depth(Some(2u32))
            .build()
            .unwrap();

        assert_eq!(config.max_depth, Some(2));
        assert!(config.include_hidden);
        assert!(config.formats.allows_extension("png"));
    }

    #[test]
    fn test_config_rejects_bad_glob() {
        let result = ScanConfig::builder()
            .ignore_patterns(vec!["[unclosed".to_string()])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_ignore_set() {
        let config = ScanConfig::builder()
            .ignore_patterns(vec!["thumbs".to_string(), "*.tmp.png".to_string()])
            .build()
            .unwrap();
        let set = config.ignore_set().unwrap();

        assert!(set.is_match("thumbs"));
        assert!(set.is_match("x.tmp.png"));
        assert!(!set.is_match("x.png"));
    }

    #[test]
    fn test_should_skip_hidden() {
        let mut config = ScanConfig::default();

        // By default, hidden files are included
        assert!(!config.should_skip_hidden(".cache"));

        config.include_hidden = false;
        assert!(config.should_skip_hidden(".cache"));
        assert!(!config.should_skip_hidden("photos"));
    }

    #[test]
    fn test_depth_limit() {
        let mut config = ScanConfig::default();
        assert!(!config.exceeds_depth(100));
        config.max_depth = Some(1);
        assert!(!config.exceeds_depth(1));
        assert!(config.exceeds_depth(2));
    }
}
