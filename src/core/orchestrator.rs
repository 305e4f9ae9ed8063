//! Main orchestrator for a migration run.
//!
//! Runs the stages strictly in order: scan the cache, resolve every title
//! in one metadata request, sanitize, then move files. Nothing on disk is
//! touched before the metadata request has succeeded.

use std::path::PathBuf;

use anyhow::Result;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::adapters::{MetadataClient, MetadataError, SteamMetadataClient, TitleMap};
use crate::config::ResolvedConfig;
use crate::domain::ModId;
use crate::workshop::{ScanIssue, ScanOutcome, WorkshopScanner};

use super::migrator::{MigrationReport, Migrator, MigratorConfig, PlannedMove};
use super::sanitize::SanitizeOptions;

/// Run-level failures; each one stops the run before any file moves
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Mods folder does not exist: {}", .0.display())]
    TargetMissing(PathBuf),

    #[error("{0:#}")]
    Scan(anyhow::Error),

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Title resolution results
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Mods that got a title from the service
    pub resolved: usize,
    /// Mods left with their id as title
    pub missing: Vec<ModId>,
}

/// Everything that happened in one run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub discovered: usize,
    pub skipped: Vec<ScanIssue>,
    pub resolution: Resolution,
    /// Moves computed for the run; in a dry run nothing else happens
    pub plan: Vec<PlannedMove>,
    /// `None` for dry runs
    pub report: Option<MigrationReport>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.report.as_ref().is_some_and(|r| !r.is_success())
    }
}

/// Scanner, metadata client and executor for one configuration
pub struct Orchestrator {
    scanner: WorkshopScanner,
    client: Box<dyn MetadataClient>,
    sanitize: SanitizeOptions,
    migrator: Migrator,
}

impl Orchestrator {
    /// Create an orchestrator talking to the configured Steam endpoint
    pub fn new(config: &ResolvedConfig) -> Result<Self> {
        let client = SteamMetadataClient::new(config.api_url.clone(), config.request_timeout())?;
        Ok(Self::with_client(config, Box::new(client)))
    }

    /// Create an orchestrator with a custom metadata client
    pub fn with_client(config: &ResolvedConfig, client: Box<dyn MetadataClient>) -> Self {
        let migrator = Migrator::new(MigratorConfig {
            target_dir: config.mods_dir.clone(),
            archive_extension: config.scanner.archive_extension.clone(),
            remove_empty_dirs: config.remove_empty_mod_dirs,
            policy: config.relocation_policy,
        });

        Self {
            scanner: WorkshopScanner::with_config(config.workshop_dir.clone(), config.scanner.clone()),
            client,
            sanitize: config.sanitize,
            migrator,
        }
    }

    /// Scan the workshop cache
    pub async fn scan(&self) -> Result<ScanOutcome, RunError> {
        self.scanner.scan().await.map_err(RunError::Scan)
    }

    /// Fetch titles for every scanned mod and write them onto the entries
    pub async fn resolve(&self, outcome: &mut ScanOutcome) -> Result<Resolution, RunError> {
        let ids = outcome.ids();
        let titles = self.client.resolve_titles(&ids).await?;
        Ok(apply_titles(outcome, &ids, &titles, &self.sanitize))
    }

    /// Run the full pipeline. With `dry_run` the moves are only planned.
    #[instrument(skip(self), fields(client = %self.client.name()))]
    pub async fn run(&self, dry_run: bool) -> Result<RunSummary, RunError> {
        let target = &self.migrator.config().target_dir;
        if !tokio::fs::metadata(target).await.is_ok_and(|m| m.is_dir()) {
            return Err(RunError::TargetMissing(target.clone()));
        }

        let mut outcome = self.scan().await?;
        let mut summary = RunSummary {
            discovered: outcome.len(),
            skipped: outcome.skipped.clone(),
            ..Default::default()
        };

        if outcome.is_empty() {
            info!("No mods found, nothing to do");
            return Ok(summary);
        }

        summary.resolution = match self.resolve(&mut outcome).await {
            Ok(resolution) => resolution,
            Err(e) => {
                error!("Unable to resolve mod titles, nothing was moved: {}", e);
                return Err(e);
            }
        };

        let entries = outcome.into_entries();
        summary.plan = self.migrator.plan(&entries);

        if dry_run {
            info!(moves = summary.plan.len(), "Dry run, no files moved");
            return Ok(summary);
        }

        summary.report = Some(self.migrator.migrate(&entries).await);
        info!("Done!");
        Ok(summary)
    }
}

/// Overwrite default titles with sanitized service titles.
///
/// Ids without a usable title are logged and fall back to their id, cut
/// to the same maximum length.
pub fn apply_titles(
    outcome: &mut ScanOutcome,
    ids: &[ModId],
    titles: &TitleMap,
    options: &SanitizeOptions,
) -> Resolution {
    let mut resolution = Resolution::default();

    for &id in ids {
        let Some(entry) = outcome.get_mut(id) else {
            continue;
        };

        let applied = titles
            .get(&id)
            .is_some_and(|raw| entry.apply_title(raw, options));

        if applied {
            resolution.resolved += 1;
        } else {
            entry.apply_default_title(options);
            error!(
                "Couldn't get title for mod id: '{}'. Defaulting to its id for filename (if applicable)",
                id
            );
            resolution.missing.push(id);
        }
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModEntry;

    fn id(raw: u64) -> ModId {
        ModId::new(raw).unwrap()
    }

    #[test]
    fn test_apply_titles_marks_missing() {
        let mut outcome = ScanOutcome::default();
        outcome.insert(ModEntry::new(id(5001), "/c/5001", None, vec![])).unwrap();
        outcome.insert(ModEntry::new(id(7002), "/c/7002", None, vec![])).unwrap();
        outcome.insert(ModEntry::new(id(8003), "/c/8003", None, vec![])).unwrap();

        let mut titles = TitleMap::new();
        titles.insert(id(5001), "A/B".to_string());
        titles.insert(id(8003), String::new());

        let ids = outcome.ids();
        let resolution = apply_titles(&mut outcome, &ids, &titles, &SanitizeOptions::default());

        assert_eq!(resolution.resolved, 1);
        assert_eq!(resolution.missing, vec![id(7002), id(8003)]);
        assert_eq!(outcome.get(id(5001)).unwrap().title, "A_B");
        assert_eq!(outcome.get(id(7002)).unwrap().title, "7002");
        assert_eq!(outcome.get(id(8003)).unwrap().title, "8003");
    }

    #[test]
    fn test_fallback_title_is_truncated() {
        let mut outcome = ScanOutcome::default();
        outcome.insert(ModEntry::new(id(123456), "/c/123456", None, vec![])).unwrap();

        let options = SanitizeOptions {
            max_length: 3,
            replacement_char: '_',
        };
        let ids = outcome.ids();
        let resolution = apply_titles(&mut outcome, &ids, &TitleMap::new(), &options);

        assert_eq!(resolution.missing, vec![id(123456)]);
        assert_eq!(outcome.get(id(123456)).unwrap().title, "123");
    }
}
