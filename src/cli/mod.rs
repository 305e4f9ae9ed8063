//! Command-line interface for modmover.
//!
//! Provides commands for migrating workshop mods, previewing what the
//! scanner finds, and showing the resolved configuration.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::{self, ConfigOverrides, ResolvedConfig};
use crate::core::{Orchestrator, RunError, RunSummary};
use crate::workshop::WorkshopScanner;

/// Exit status of a run where every mod was moved
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status when the metadata service can't be used (nothing was moved)
pub const EXIT_METADATA_FAILURE: u8 = 1;

/// Exit status when at least one mod could not be moved
pub const EXIT_RELOCATION_FAILURE: u8 = 2;

/// modmover - move Steam Workshop mods into Starbound's mods folder
#[derive(Parser, Debug)]
#[command(name = "modmover")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Move and rename all workshop mods
    Migrate {
        /// Resolve titles and print the planned moves without moving anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List what is in the workshop folder (no network access)
    Scan,

    /// Show resolved configuration (debug)
    Config,
}

/// Flags that override config file values. Path and endpoint flags can also
/// be given through `MODMOVER_*` environment variables.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Starbound install directory
    #[arg(long, global = true, env = "MODMOVER_GAME_DIR")]
    pub game_dir: Option<PathBuf>,

    /// Workshop content folder to read mods from
    #[arg(long, global = true, env = "MODMOVER_WORKSHOP_DIR")]
    pub workshop_dir: Option<PathBuf>,

    /// Mods folder to move mods into
    #[arg(long, global = true, env = "MODMOVER_MODS_DIR")]
    pub mods_dir: Option<PathBuf>,

    /// Metadata endpoint
    #[arg(long, global = true, env = "MODMOVER_API_URL")]
    pub api_url: Option<String>,

    /// Max characters in a mod's file name (extension not included)
    #[arg(long, global = true)]
    pub max_name_length: Option<usize>,

    /// Character that replaces forbidden filename characters
    #[arg(long, global = true)]
    pub replacement_char: Option<char>,

    /// Metadata request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Leave emptied workshop folders in place
    #[arg(long, global = true)]
    pub keep_empty_dirs: bool,

    /// Stop at the first mod that can't be moved
    #[arg(long, global = true)]
    pub fail_fast: bool,

    /// Log every mod folder as it is loaded
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl From<ConfigArgs> for ConfigOverrides {
    fn from(args: ConfigArgs) -> Self {
        Self {
            game_dir: args.game_dir,
            workshop_dir: args.workshop_dir,
            mods_dir: args.mods_dir,
            api_url: args.api_url,
            max_name_length: args.max_name_length,
            replacement_char: args.replacement_char,
            timeout_seconds: args.timeout,
            keep_empty_dirs: args.keep_empty_dirs,
            fail_fast: args.fail_fast,
            verbose: args.verbose,
        }
    }
}

impl Cli {
    /// Execute the CLI command, returning the process exit status
    pub async fn execute(self) -> Result<u8> {
        let config = config::load_config(&self.config.into())?;

        match self.command {
            Commands::Migrate { dry_run } => migrate(&config, dry_run).await,
            Commands::Scan => scan(&config).await,
            Commands::Config => show_config(&config),
        }
    }
}

/// Run the full migration
async fn migrate(config: &ResolvedConfig, dry_run: bool) -> Result<u8> {
    let orchestrator = Orchestrator::new(config)?;
    migrate_with(&orchestrator, dry_run).await
}

/// Run a migration with a prepared orchestrator and map the outcome to an
/// exit status
pub async fn migrate_with(orchestrator: &Orchestrator, dry_run: bool) -> Result<u8> {
    eprintln!("Working, please wait!");

    let summary = match orchestrator.run(dry_run).await {
        Ok(summary) => summary,
        Err(RunError::Metadata(e)) => {
            eprintln!("Errored while connecting to the metadata service: {}", e);
            eprintln!("No files were moved.");
            return Ok(EXIT_METADATA_FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if dry_run {
        print_plan(&summary);
        return Ok(EXIT_SUCCESS);
    }

    print_summary(&summary);

    if summary.has_failures() {
        Ok(EXIT_RELOCATION_FAILURE)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

fn print_plan(summary: &RunSummary) {
    if summary.plan.is_empty() {
        println!("Nothing to move");
        return;
    }

    for planned in &summary.plan {
        println!("{} -> {}", planned.from.display(), planned.to.display());
    }
    eprintln!(
        "\n[Dry run: {} files from {} mods, {} without a title]",
        summary.plan.len(),
        summary.discovered,
        summary.resolution.missing.len()
    );
}

fn print_summary(summary: &RunSummary) {
    let Some(report) = &summary.report else {
        println!("Done! No mods found.");
        return;
    };

    println!(
        "Done! Moved {} files from {} mods ({} skipped, {} without a title, {} folders removed)",
        report.files_moved,
        report.migrated.len(),
        summary.skipped.len(),
        summary.resolution.missing.len(),
        report.dirs_removed
    );

    if !report.cleanup_warnings.is_empty() {
        eprintln!("{} workshop folders could not be removed, see log", report.cleanup_warnings.len());
    }

    if !report.failures.is_empty() {
        eprintln!("\nFailed to move {} mods:", report.failures.len());
        for failure in &report.failures {
            eprintln!("  {} '{}': {}", failure.id, failure.title, failure.error);
        }
    }

    if report.halted() {
        eprintln!("Stopped early; {} mods were not processed", report.not_processed.len());
    }
}

/// List discovered mods without contacting the metadata service
async fn scan(config: &ResolvedConfig) -> Result<u8> {
    let scanner = WorkshopScanner::with_config(&config.workshop_dir, config.scanner.clone());
    let outcome = scanner.scan().await?;

    if outcome.is_empty() {
        println!("No mods found in {}", config.workshop_dir.display());
    } else {
        println!("{:<14} {:<6} {:<14}", "MOD ID", "FILES", "MAIN ARCHIVE");
        println!("{}", "-".repeat(36));

        for entry in outcome.entries() {
            let primary = entry
                .primary_content_path
                .as_deref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("{:<14} {:<6} {:<14}", entry.id, entry.file_count(), primary);
        }
    }

    if !outcome.skipped.is_empty() {
        println!("\nSkipped:");
        for issue in &outcome.skipped {
            println!("  {}", issue);
        }
    }

    Ok(EXIT_SUCCESS)
}

/// Show resolved configuration
fn show_config(config: &ResolvedConfig) -> Result<u8> {
    println!("modmover configuration\n");

    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none found, using defaults)"),
    }

    println!("\nPaths:");
    println!("  game:      {}", config.game_dir.display());
    println!("  workshop:  {}", config.workshop_dir.display());
    println!("  mods:      {}", config.mods_dir.display());

    println!("\nMetadata:");
    println!("  url:       {}", config.api_url);
    println!("  timeout:   {}s", config.request_timeout_seconds);

    println!("\nNaming:");
    println!("  max length:  {}", config.sanitize.max_length);
    println!("  replacement: '{}'", config.sanitize.replacement_char);

    println!("\nMigration:");
    println!("  remove empty dirs: {}", config.remove_empty_mod_dirs);
    println!("  on failure:        {:?}", config.relocation_policy);
    println!("  main archives:     {}", config.scanner.primary_filenames.join(", "));
    println!("  ignored files:     {}", config.scanner.noise_patterns.join(", "));

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_migrate_flags() {
        let cli = Cli::parse_from([
            "modmover",
            "migrate",
            "--dry-run",
            "--mods-dir",
            "/tmp/mods",
            "--replacement-char",
            "-",
            "--fail-fast",
        ]);

        assert!(matches!(cli.command, Commands::Migrate { dry_run: true }));
        let overrides: ConfigOverrides = cli.config.into();
        assert_eq!(overrides.mods_dir, Some(PathBuf::from("/tmp/mods")));
        assert_eq!(overrides.replacement_char, Some('-'));
        assert!(overrides.fail_fast);
        assert!(!overrides.keep_empty_dirs);
    }
}
