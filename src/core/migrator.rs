//! Migration executor.
//!
//! Moves each package's files from the workshop cache into the mods folder.
//! The main archive is renamed to `<title>.<ext>`; every other file keeps its
//! base name. Optionally the emptied cache directory is removed afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{ModEntry, ModId};

/// What to do when a file can't be moved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelocationPolicy {
    /// Record the failure for that mod and carry on with the next one
    #[default]
    Isolate,

    /// Stop the whole run at the first failure. Mods already moved stay moved.
    FailFast,
}

/// A file that could not be moved
#[derive(Debug, Error)]
pub enum RelocationError {
    #[error("Target already exists: {}", to.display())]
    TargetExists { from: PathBuf, to: PathBuf },

    #[error("Failed to move '{}' to '{}': {source}", from.display(), to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One move the executor will perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub id: ModId,
    pub from: PathBuf,
    pub to: PathBuf,
    /// True for the main archive, which gets the title as its name
    pub renamed: bool,
}

/// A mod whose files could not all be moved
#[derive(Debug)]
pub struct EntryFailure {
    pub id: ModId,
    pub title: String,
    pub error: RelocationError,
}

/// A cache directory that was left behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupWarning {
    pub id: ModId,
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of [`Migrator::migrate`]
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Mods whose files were all moved
    pub migrated: Vec<ModId>,
    pub files_moved: usize,
    pub dirs_removed: usize,
    pub cleanup_warnings: Vec<CleanupWarning>,
    pub failures: Vec<EntryFailure>,
    /// Mods never attempted because a fail-fast run stopped early
    pub not_processed: Vec<ModId>,
}

impl MigrationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn halted(&self) -> bool {
        !self.not_processed.is_empty()
    }
}

/// Settings for the executor
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    /// Mods folder that receives the files; must already exist
    pub target_dir: PathBuf,
    /// Extension given to the renamed main archive, without the dot
    pub archive_extension: String,
    /// Remove each mod's cache directory after moving its files
    pub remove_empty_dirs: bool,
    pub policy: RelocationPolicy,
}

impl MigratorConfig {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            archive_extension: "pak".to_string(),
            remove_empty_dirs: true,
            policy: RelocationPolicy::default(),
        }
    }
}

/// Moves scanned, titled entries into the target directory
pub struct Migrator {
    config: MigratorConfig,
}

impl Migrator {
    pub fn new(config: MigratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Moves for one entry, main archive first
    pub fn plan_entry(&self, entry: &ModEntry) -> Vec<PlannedMove> {
        let mut moves = Vec::with_capacity(entry.file_count());

        if let Some(primary) = &entry.primary_content_path {
            let file_name = format!("{}.{}", entry.title, self.config.archive_extension);
            moves.push(PlannedMove {
                id: entry.id,
                from: primary.clone(),
                to: self.config.target_dir.join(file_name),
                renamed: true,
            });
        }

        for path in &entry.auxiliary_paths {
            let Some(base_name) = path.file_name() else {
                warn!("Mod {}: '{}' has no file name, skipping", entry.id, path.display());
                continue;
            };
            moves.push(PlannedMove {
                id: entry.id,
                from: path.clone(),
                to: self.config.target_dir.join(base_name),
                renamed: false,
            });
        }

        moves
    }

    /// Every move a migration of `entries` would perform, without touching disk
    pub fn plan(&self, entries: &[ModEntry]) -> Vec<PlannedMove> {
        entries.iter().flat_map(|e| self.plan_entry(e)).collect()
    }

    /// Move all entries according to the configured policy
    pub async fn migrate(&self, entries: &[ModEntry]) -> MigrationReport {
        let mut report = MigrationReport::default();

        for (idx, entry) in entries.iter().enumerate() {
            debug!("Moving {}", entry);

            match self.migrate_entry(entry, &mut report).await {
                Ok(()) => {
                    report.migrated.push(entry.id);
                    if self.config.remove_empty_dirs {
                        self.remove_source_dir(entry, &mut report).await;
                    }
                }
                Err(e) => {
                    error!("Couldn't move {}: {}", entry, e);
                    report.failures.push(EntryFailure {
                        id: entry.id,
                        title: entry.title.clone(),
                        error: e,
                    });

                    if self.config.policy == RelocationPolicy::FailFast {
                        report.not_processed = entries[idx + 1..].iter().map(|e| e.id).collect();
                        warn!(
                            remaining = report.not_processed.len(),
                            "Stopping migration after first failure"
                        );
                        break;
                    }
                }
            }
        }

        info!(
            migrated = report.migrated.len(),
            files = report.files_moved,
            failed = report.failures.len(),
            "Migration finished"
        );
        report
    }

    async fn migrate_entry(
        &self,
        entry: &ModEntry,
        report: &mut MigrationReport,
    ) -> Result<(), RelocationError> {
        for planned in self.plan_entry(entry) {
            move_file(&planned.from, &planned.to).await?;
            report.files_moved += 1;
        }
        Ok(())
    }

    async fn remove_source_dir(&self, entry: &ModEntry, report: &mut MigrationReport) {
        match tokio::fs::remove_dir(&entry.source_dir).await {
            Ok(()) => report.dirs_removed += 1,
            Err(e) => {
                warn!(
                    "Couldn't remove dir '{}'. Error: {}",
                    entry.source_dir.display(),
                    e
                );
                report.cleanup_warnings.push(CleanupWarning {
                    id: entry.id,
                    path: entry.source_dir.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Rename `from` to `to`, refusing to replace an existing file
pub async fn move_file(from: &Path, to: &Path) -> Result<(), RelocationError> {
    if tokio::fs::symlink_metadata(to).await.is_ok() {
        return Err(RelocationError::TargetExists {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
    }

    tokio::fs::rename(from, to)
        .await
        .map_err(|source| RelocationError::Io {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })?;

    debug!("Moved '{}' -> '{}'", from.display(), to.display());
    Ok(())
}
