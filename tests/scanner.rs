//! Scanner Integration Tests
//!
//! Discovery and classification against a real directory tree.

use std::collections::HashSet;
use std::path::PathBuf;

use modmover::workshop::{ScanIssue, ScannerConfig, WorkshopScanner};
use modmover::ModId;
use tempfile::TempDir;

fn make_mod(root: &std::path::Path, dir_name: &str, files: &[&str]) -> PathBuf {
    let dir = root.join(dir_name);
    std::fs::create_dir_all(&dir).unwrap();
    for file in files {
        std::fs::write(dir.join(file), b"data").unwrap();
    }
    dir
}

#[tokio::test]
async fn test_scan_discovers_valid_mods() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let dir = make_mod(root, "5001", &["contents.pak", "extra.pak", "readme.txt"]);
    make_mod(root, "7002", &["a.pak", "b.txt"]);

    let outcome = WorkshopScanner::new(root).scan().await.unwrap();
    assert_eq!(outcome.len(), 2);
    assert!(outcome.skipped.is_empty());

    let entry = outcome.get(ModId::new(5001).unwrap()).unwrap();
    assert_eq!(entry.primary_content_path, Some(dir.join("contents.pak")));
    assert_eq!(entry.auxiliary_paths, vec![dir.join("extra.pak")]);
    assert_eq!(entry.title, "5001");
    assert_eq!(entry.source_dir, dir);

    let entry = outcome.get(ModId::new(7002).unwrap()).unwrap();
    assert_eq!(entry.primary_content_path, None);
    assert_eq!(entry.auxiliary_paths.len(), 2);
}

#[tokio::test]
async fn test_scan_skips_invalid_names() {
    let temp = TempDir::new().unwrap();
    let bad = make_mod(temp.path(), "notanumber", &["contents.pak"]);
    make_mod(temp.path(), "0", &["contents.pak"]);
    make_mod(temp.path(), "-5", &["contents.pak"]);

    let outcome = WorkshopScanner::new(temp.path()).scan().await.unwrap();
    assert!(outcome.is_empty());
    assert_eq!(outcome.skipped.len(), 3);
    assert!(outcome
        .skipped
        .iter()
        .all(|i| matches!(i, ScanIssue::InvalidModDirectoryName { .. })));
    assert!(outcome.skipped.iter().any(|i| i.path() == bad));
}

#[tokio::test]
async fn test_scan_skips_empty_folders() {
    let temp = TempDir::new().unwrap();
    let empty = make_mod(temp.path(), "123", &[]);

    let outcome = WorkshopScanner::new(temp.path()).scan().await.unwrap();
    assert!(outcome.is_empty());
    assert_eq!(
        outcome.skipped,
        vec![ScanIssue::EmptyModDirectory { path: empty }]
    );
}

#[tokio::test]
async fn test_empty_check_runs_before_name_check() {
    let temp = TempDir::new().unwrap();
    make_mod(temp.path(), "not-a-number", &[]);

    let outcome = WorkshopScanner::new(temp.path()).scan().await.unwrap();
    assert!(matches!(
        outcome.skipped.as_slice(),
        [ScanIssue::EmptyModDirectory { .. }]
    ));
}

#[tokio::test]
async fn test_scan_ignores_plain_files_in_root() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("12345"), b"not a dir").unwrap();
    make_mod(temp.path(), "1", &["contents.pak"]);

    let outcome = WorkshopScanner::new(temp.path()).scan().await.unwrap();
    assert_eq!(outcome.ids(), vec![ModId::new(1).unwrap()]);
    assert!(outcome.skipped.is_empty());
}

#[tokio::test]
async fn test_scan_ids_are_unique() {
    let temp = TempDir::new().unwrap();
    make_mod(temp.path(), "7", &["contents.pak"]);
    make_mod(temp.path(), "007", &["contents.pak"]);
    for id in 100..120 {
        make_mod(temp.path(), &id.to_string(), &["x.pak"]);
    }

    let outcome = WorkshopScanner::new(temp.path()).scan().await.unwrap();
    let ids = outcome.ids();
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(ids.len(), unique.len());
    assert_eq!(ids.len(), 21);
    let [ScanIssue::DuplicateModId { id, path, first }] = outcome.skipped.as_slice() else {
        panic!("expected one duplicate, got {:?}", outcome.skipped);
    };
    // Listing order decides which spelling wins; the loser is never moved
    let kept = &outcome.get(*id).unwrap().source_dir;
    assert_eq!(first, kept);
    assert_ne!(path, kept);
    assert!(path.ends_with("7") || path.ends_with("007"));
}

#[tokio::test]
async fn test_scan_missing_root_is_error() {
    let temp = TempDir::new().unwrap();
    let result = WorkshopScanner::new(temp.path().join("missing")).scan().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_custom_noise_patterns() {
    let temp = TempDir::new().unwrap();
    let dir = make_mod(temp.path(), "55", &["mod.pak", "Thumbs.db", "desktop.ini"]);

    let config = ScannerConfig {
        noise_patterns: vec!["Thumbs.db".to_string(), "*.ini".to_string()],
        ..Default::default()
    };
    let outcome = WorkshopScanner::with_config(temp.path(), config)
        .scan()
        .await
        .unwrap();

    let entry = outcome.get(ModId::new(55).unwrap()).unwrap();
    assert_eq!(entry.auxiliary_paths, vec![dir.join("mod.pak")]);
}
