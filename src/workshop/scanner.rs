//! Workshop content cache scanner.
//!
//! Walks the immediate children of the cache root and turns every
//! `<id>/` directory into a [`ModEntry`]. A bad directory never aborts
//! the scan; it is recorded as a [`ScanIssue`] and skipped.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{ModEntry, ModId};

/// Reasons a cache subdirectory was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanIssue {
    #[error("Empty mod folder: {}", path.display())]
    EmptyModDirectory { path: PathBuf },

    #[error("Invalid mod folder name: '{}'", path.display())]
    InvalidModDirectoryName { path: PathBuf },

    #[error("Mod folder '{}' duplicates id {id} from '{}'", path.display(), first.display())]
    DuplicateModId {
        id: ModId,
        path: PathBuf,
        first: PathBuf,
    },

    #[error("Couldn't read mod folder '{}': {reason}", path.display())]
    UnreadableModDirectory { path: PathBuf, reason: String },
}

impl ScanIssue {
    /// Directory the issue refers to
    pub fn path(&self) -> &Path {
        match self {
            ScanIssue::EmptyModDirectory { path }
            | ScanIssue::InvalidModDirectoryName { path }
            | ScanIssue::DuplicateModId { path, .. }
            | ScanIssue::UnreadableModDirectory { path, .. } => path,
        }
    }
}

/// How package files are recognised
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Exact (case-sensitive) names of a package's main archive
    #[serde(default = "default_primary_filenames")]
    pub primary_filenames: Vec<String>,

    /// Extension of package archives, without the dot
    #[serde(default = "default_archive_extension")]
    pub archive_extension: String,

    /// Glob patterns for platform junk that never moves
    #[serde(default = "default_noise_patterns")]
    pub noise_patterns: Vec<String>,

    /// Log every directory as it is visited
    #[serde(default)]
    pub verbose: bool,
}

fn default_primary_filenames() -> Vec<String> {
    vec!["contents.pak".to_string(), "content.pak".to_string()]
}
fn default_archive_extension() -> String {
    "pak".to_string()
}
fn default_noise_patterns() -> Vec<String> {
    vec![".DS_Store".to_string()]
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            primary_filenames: default_primary_filenames(),
            archive_extension: default_archive_extension(),
            noise_patterns: default_noise_patterns(),
            verbose: false,
        }
    }
}

/// A noise pattern that is not a valid glob
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid noise pattern '{pattern}': {reason}")]
pub struct InvalidNoisePattern {
    pub pattern: String,
    pub reason: String,
}

impl ScannerConfig {
    /// Reject noise patterns that don't compile as globs
    pub fn validate(&self) -> std::result::Result<(), InvalidNoisePattern> {
        for pattern in &self.noise_patterns {
            Pattern::new(pattern).map_err(|e| InvalidNoisePattern {
                pattern: pattern.clone(),
                reason: e.msg.to_string(),
            })?;
        }
        Ok(())
    }

    /// Check a file name against the noise patterns.
    ///
    /// A pattern that isn't a valid glob only matches its own literal text.
    pub fn is_noise(&self, file_name: &str) -> bool {
        self.noise_patterns.iter().any(|p| match Pattern::new(p) {
            Ok(glob) => glob.matches(file_name),
            Err(_) => p == file_name,
        })
    }

    fn is_primary(&self, file_name: &str) -> bool {
        self.primary_filenames.iter().any(|p| p == file_name)
    }

    fn is_archive(&self, file_name: &str) -> bool {
        file_name.ends_with(&format!(".{}", self.archive_extension))
    }
}

/// Files of one package directory, sorted into roles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub primary: Option<PathBuf>,
    pub auxiliary: Vec<PathBuf>,
    /// Further primary-named files after the first one; left where they are
    pub ignored_primaries: Vec<PathBuf>,
}

/// Sort the contents of a package directory.
///
/// With a primary archive present only other archives travel along; without
/// one, everything except noise does. When both primary spellings exist the
/// first in listing order wins.
pub fn classify(dir: &Path, names: &[OsString], config: &ScannerConfig) -> Classified {
    let mut classified = Classified::default();
    let mut remaining = Vec::with_capacity(names.len());

    for name in names {
        let lossy = name.to_string_lossy();
        if config.is_primary(&lossy) {
            let path = dir.join(name);
            if classified.primary.is_none() {
                classified.primary = Some(path);
            } else {
                classified.ignored_primaries.push(path);
            }
        } else {
            remaining.push(name);
        }
    }

    let has_primary = classified.primary.is_some();
    classified.auxiliary = remaining
        .into_iter()
        .filter(|name| {
            let lossy = name.to_string_lossy();
            if has_primary {
                config.is_archive(&lossy)
            } else {
                !config.is_noise(&lossy)
            }
        })
        .map(|name| dir.join(name))
        .collect();

    classified
}

/// Everything a scan found, in discovery order
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    entries: Vec<ModEntry>,
    index: HashMap<ModId, usize>,
    /// Directories that were skipped, and why
    pub skipped: Vec<ScanIssue>,
}

impl ScanOutcome {
    /// Add an entry. Hands it back if the id is already taken.
    pub fn insert(&mut self, entry: ModEntry) -> std::result::Result<(), ModEntry> {
        if self.index.contains_key(&entry.id) {
            return Err(entry);
        }
        self.index.insert(entry.id, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[ModEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ModEntry> {
        self.entries
    }

    pub fn get(&self, id: ModId) -> Option<&ModEntry> {
        self.index.get(&id).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, id: ModId) -> Option<&mut ModEntry> {
        self.index.get(&id).map(|&i| &mut self.entries[i])
    }

    /// Ids in discovery order
    pub fn ids(&self) -> Vec<ModId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scanner over a workshop content cache root
pub struct WorkshopScanner {
    root: PathBuf,
    config: ScannerConfig,
}

impl WorkshopScanner {
    /// Create a scanner with default recognition rules
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, ScannerConfig::default())
    }

    /// Create a scanner with custom recognition rules
    pub fn with_config(root: impl Into<PathBuf>, config: ScannerConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Scan the cache root once.
    ///
    /// Only failing to list the root itself is an error.
    pub async fn scan(&self) -> Result<ScanOutcome> {
        info!("Loading mods from {}", self.root.display());

        let mut outcome = ScanOutcome::default();

        let mut children = tokio::fs::read_dir(&self.root)
            .await
            .with_context(|| format!("Failed to read workshop folder: {}", self.root.display()))?;

        while let Some(child) = children
            .next_entry()
            .await
            .with_context(|| format!("Failed to read workshop folder: {}", self.root.display()))?
        {
            let path = child.path();
            let dir_name = child.file_name();

            if self.config.verbose {
                info!("Loading {}", dir_name.to_string_lossy());
            } else {
                debug!("Loading {}", dir_name.to_string_lossy());
            }

            match tokio::fs::metadata(&path).await {
                Ok(m) if m.is_dir() => {}
                _ => continue,
            }

            let names = match list_names(&path).await {
                Ok(names) => names,
                Err(e) => {
                    record(
                        &mut outcome,
                        ScanIssue::UnreadableModDirectory {
                            path,
                            reason: e.to_string(),
                        },
                    );
                    continue;
                }
            };

            if names.is_empty() {
                record(&mut outcome, ScanIssue::EmptyModDirectory { path });
                continue;
            }

            let id = match dir_name.to_str().and_then(|s| s.parse::<ModId>().ok()) {
                Some(id) => id,
                None => {
                    record(&mut outcome, ScanIssue::InvalidModDirectoryName { path });
                    continue;
                }
            };

            let classified = classify(&path, &names, &self.config);
            let ignored = classified.ignored_primaries;
            let entry = ModEntry::new(id, path, classified.primary, classified.auxiliary);

            if let Err(rejected) = outcome.insert(entry) {
                let first = outcome
                    .get(id)
                    .map(|e| e.source_dir.clone())
                    .unwrap_or_default();
                let issue = ScanIssue::DuplicateModId {
                    id,
                    path: rejected.source_dir,
                    first,
                };
                record(&mut outcome, issue);
                continue;
            }

            for extra in &ignored {
                warn!(
                    "Mod {} has more than one main archive; '{}' is left in place",
                    id,
                    extra.display()
                );
            }
        }

        info!(
            mods = outcome.len(),
            skipped = outcome.skipped.len(),
            "Finished loading mods"
        );
        Ok(outcome)
    }
}

fn record(outcome: &mut ScanOutcome, issue: ScanIssue) {
    warn!("{}. Skipping this one.", issue);
    outcome.skipped.push(issue);
}

async fn list_names(dir: &Path) -> std::io::Result<Vec<OsString>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name());
    }
    Ok(names)
}
