use std::io;
use std::path::PathBuf;
use std::time::Duration;

use imgsift_core::{
    FormatFilterConfig, PreviewRegistry, PreviewSource, ScanConfig, ScanError, ScanResult,
    ScanWarning, ScannedFile, StatusLevel, WarningKind, filter_by_format, format_stats,
};

fn files(registry: &PreviewRegistry, paths: &[&str]) -> Vec<ScannedFile> {
    paths
        .iter()
        .map(|p| {
            let handle = registry.allocate(PreviewSource::Path(PathBuf::from(p)));
            ScannedFile::new(*p, 100, "", handle)
        })
        .collect()
}

fn paths(files: &[ScannedFile]) -> Vec<&str> {
    files.iter().map(|f| f.path()).collect()
}

#[test]
fn test_filter_preserves_order_and_releases_dropped() {
    let registry = PreviewRegistry::new();
    let all = files(&registry, &["z.png", "a.txt", "m.JPEG", "b.gif", "c.jpg"]);

    let kept = filter_by_format(all, &FormatFilterConfig::new(["jpg", "png"]));

    assert_eq!(paths(&kept), vec!["z.png", "m.JPEG", "c.jpg"]);
    assert_eq!(registry.live_count(), 3);
}

#[test]
fn test_empty_allow_list_passes_everything() {
    let registry = PreviewRegistry::new();
    let all = files(&registry, &["a.png", "notes.txt", "README"]);

    let kept = filter_by_format(all, &FormatFilterConfig::any());

    assert_eq!(paths(&kept), vec!["a.png", "notes.txt", "README"]);
    assert_eq!(registry.live_count(), 3);
}

#[test]
fn test_format_stats_fold_jpeg_into_jpg() {
    let registry = PreviewRegistry::new();
    let all = files(&registry, &["a.jpg", "b.JPEG", "c.png", "d.jpeg"]);

    let stats = format_stats(&all);
    assert_eq!(stats.get("jpg"), Some(&3));
    assert_eq!(stats.get("png"), Some(&1));
    assert_eq!(stats.len(), 2);
}

#[test]
fn test_summary_cases() {
    let registry = PreviewRegistry::new();

    let nothing = ScanResult::empty("root");
    assert_eq!(nothing.summary().level, StatusLevel::Warning);
    assert_eq!(nothing.summary().message, "No image files found");

    let none_match = ScanResult::new("root", Vec::new(), 5, 3, Duration::ZERO, Vec::new());
    assert_eq!(none_match.summary().level, StatusLevel::Warning);
    assert!(none_match.summary().message.contains("none match"));

    let all_match = ScanResult::new(
        "root",
        files(&registry, &["a.png", "b.png"]),
        4,
        2,
        Duration::ZERO,
        Vec::new(),
    );
    assert_eq!(all_match.summary().level, StatusLevel::Success);
    assert_eq!(all_match.summary().message, "Scanned 2 images");

    let some_match = ScanResult::new(
        "root",
        files(&registry, &["a.png"]),
        4,
        3,
        Duration::ZERO,
        Vec::new(),
    );
    assert_eq!(some_match.summary().message, "Scanned 1 images (3 in total)");
}

#[test]
fn test_dropping_result_releases_all_handles() {
    let registry = PreviewRegistry::new();
    let result = ScanResult::new(
        "root",
        files(&registry, &["a.png", "b.png", "c.png"]),
        3,
        3,
        Duration::ZERO,
        Vec::new(),
    );
    let views: Vec<_> = result.files.iter().map(|f| f.preview_ref()).collect();
    assert_eq!(registry.live_count(), 3);

    drop(result);
    assert_eq!(registry.live_count(), 0);
    assert!(views.iter().all(|v| v.source().is_none()));
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: ScanConfig = serde_json::from_str(r#"{ "formats": ["JPEG", "png"] }"#).unwrap();

    assert!(config.include_hidden);
    assert_eq!(config.max_depth, None);
    assert!(config.ignore_patterns.is_empty());
    assert_eq!(config.formats, FormatFilterConfig::new(["jpg", "png"]));
}

#[test]
fn test_builder_rejects_bad_glob() {
    let err = ScanConfig::builder()
        .ignore_patterns(vec!["[unclosed".to_string()])
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("[unclosed"));
}

#[test]
fn test_io_errors_map_to_variants() {
    let denied = ScanError::io("/root", io::Error::from(io::ErrorKind::PermissionDenied));
    assert!(matches!(denied, ScanError::AccessDenied { .. }));

    let missing = ScanError::io("/gone", io::Error::from(io::ErrorKind::NotFound));
    assert!(matches!(missing, ScanError::NotFound { .. }));

    let other = ScanError::io("/x", io::Error::other("boom"));
    assert!(matches!(other, ScanError::Io { .. }));
    assert!(other.is_access_error());
    assert!(!ScanError::Busy.is_access_error());
}

#[test]
fn test_warning_constructors() {
    let err = io::Error::from(io::ErrorKind::PermissionDenied);
    let warning = ScanWarning::file_unreadable("a/b.png", &err);
    assert_eq!(warning.kind, WarningKind::FileUnreadable);
    assert_eq!(warning.path, PathBuf::from("a/b.png"));
    assert!(!warning.message.is_empty());
}
