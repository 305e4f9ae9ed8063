//! Configuration for modmover.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags, or their environment variables (MODMOVER_GAME_DIR,
//!    MODMOVER_WORKSHOP_DIR, MODMOVER_MODS_DIR, MODMOVER_API_URL) which clap
//!    reads when the flag is absent
//! 2. Config file (.modmover/config.yaml)
//! 3. Defaults (Steam's standard Starbound install)
//!
//! Config file discovery:
//! - Searches current directory and parents for .modmover/config.yaml
//! - Paths in config file are relative to the project root (parent of .modmover/)
//!
//! Everything is resolved once into a [`ResolvedConfig`] that is handed to
//! each component and never changes during a run.

pub mod paths;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::adapters::steam::DEFAULT_ENDPOINT;
use crate::core::migrator::RelocationPolicy;
use crate::core::sanitize::{is_forbidden, SanitizeOptions};
use crate::workshop::{InvalidNoisePattern, ScannerConfig};

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub naming: Option<NamingConfig>,
    #[serde(default)]
    pub migration: Option<MigrationConfig>,
    #[serde(default)]
    pub scanner: Option<ScannerConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Starbound install directory
    pub game: Option<String>,
    /// Workshop content cache (defaults to the game's Steam library)
    pub workshop: Option<String>,
    /// Mods folder (defaults to <game>/mods)
    pub mods: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamingConfig {
    pub max_name_length: Option<usize>,
    pub replacement_char: Option<char>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MigrationConfig {
    pub remove_empty_mod_dirs: Option<bool>,
    pub relocation_policy: Option<RelocationPolicy>,
    pub extensive_log: Option<bool>,
}

/// Command-line overrides; `None`/`false` means "not given"
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub game_dir: Option<PathBuf>,
    pub workshop_dir: Option<PathBuf>,
    pub mods_dir: Option<PathBuf>,
    pub api_url: Option<String>,
    pub max_name_length: Option<usize>,
    pub replacement_char: Option<char>,
    pub timeout_seconds: Option<u64>,
    pub keep_empty_dirs: bool,
    pub fail_fast: bool,
    pub verbose: bool,
}

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max_name_length must be at least 1")]
    InvalidMaxNameLength,

    #[error("replacement_char '{0}' is itself a forbidden filename character")]
    ForbiddenReplacementChar(char),

    #[error("timeout_seconds must be at least 1")]
    InvalidTimeout,

    #[error(transparent)]
    InvalidNoisePattern(#[from] InvalidNoisePattern),
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Starbound install directory
    pub game_dir: PathBuf,
    /// Workshop content cache to migrate from
    pub workshop_dir: PathBuf,
    /// Mods folder to migrate into
    pub mods_dir: PathBuf,
    /// Metadata endpoint
    pub api_url: String,
    pub request_timeout_seconds: u64,
    pub sanitize: SanitizeOptions,
    pub remove_empty_mod_dirs: bool,
    pub relocation_policy: RelocationPolicy,
    pub scanner: ScannerConfig,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Defaults for a given game directory
    pub fn for_game_dir(game_dir: impl Into<PathBuf>) -> Self {
        let game_dir = game_dir.into();
        Self {
            workshop_dir: paths::workshop_dir(&game_dir, paths::STARBOUND_APP_ID),
            mods_dir: paths::mods_dir(&game_dir),
            game_dir,
            api_url: DEFAULT_ENDPOINT.to_string(),
            request_timeout_seconds: 30,
            sanitize: SanitizeOptions::default(),
            remove_empty_mod_dirs: true,
            relocation_policy: RelocationPolicy::default(),
            scanner: ScannerConfig::default(),
            config_file: None,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Check values that would break sanitization or scanning
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sanitize.max_length == 0 {
            return Err(ConfigError::InvalidMaxNameLength);
        }
        if is_forbidden(self.sanitize.replacement_char) {
            return Err(ConfigError::ForbiddenReplacementChar(
                self.sanitize.replacement_char,
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        self.scanner.validate()?;
        Ok(())
    }
}

/// Find config file by searching `start` and its parents
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".modmover").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources, starting discovery at the current directory
pub fn load_config(overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let file = match find_config_file(&cwd) {
        Some(path) => {
            let parsed = load_config_file(&path)?;
            Some((path, parsed))
        }
        None => None,
    };

    let config = resolve(file, overrides);
    config.validate()?;
    Ok(config)
}

/// Merge all sources. Precedence: overrides, file, defaults.
pub fn resolve(file: Option<(PathBuf, ConfigFile)>, overrides: &ConfigOverrides) -> ResolvedConfig {
    let (config_path, file) = match file {
        Some((path, parsed)) => (Some(path), Some(parsed)),
        None => (None, None),
    };

    // Base directory is the parent of .modmover/ (i.e., grandparent of config.yaml)
    let base_dir = config_path
        .as_deref()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let file_paths = file.as_ref().map(|f| f.paths.clone()).unwrap_or_default();
    let pick_path = |cli: &Option<PathBuf>, file: &Option<String>| {
        cli.clone()
            .or_else(|| file.as_deref().map(|p| resolve_path(&base_dir, p)))
    };

    let game_dir = pick_path(&overrides.game_dir, &file_paths.game)
        .unwrap_or_else(paths::default_game_dir);

    let mut config = ResolvedConfig::for_game_dir(game_dir);
    config.config_file = config_path;

    if let Some(dir) = pick_path(&overrides.workshop_dir, &file_paths.workshop) {
        config.workshop_dir = dir;
    }
    if let Some(dir) = pick_path(&overrides.mods_dir, &file_paths.mods) {
        config.mods_dir = dir;
    }

    if let Some(file) = &file {
        if let Some(api) = &file.api {
            if let Some(url) = &api.url {
                config.api_url = url.clone();
            }
            if let Some(timeout) = api.timeout_seconds {
                config.request_timeout_seconds = timeout;
            }
        }
        if let Some(naming) = &file.naming {
            if let Some(len) = naming.max_name_length {
                config.sanitize.max_length = len;
            }
            if let Some(c) = naming.replacement_char {
                config.sanitize.replacement_char = c;
            }
        }
        if let Some(migration) = &file.migration {
            if let Some(remove) = migration.remove_empty_mod_dirs {
                config.remove_empty_mod_dirs = remove;
            }
            if let Some(policy) = migration.relocation_policy {
                config.relocation_policy = policy;
            }
            if let Some(verbose) = migration.extensive_log {
                config.scanner.verbose = verbose;
            }
        }
        if let Some(scanner) = &file.scanner {
            let verbose = config.scanner.verbose || scanner.verbose;
            config.scanner = scanner.clone();
            config.scanner.verbose = verbose;
        }
    }

    if let Some(url) = &overrides.api_url {
        config.api_url = url.clone();
    }
    if let Some(len) = overrides.max_name_length {
        config.sanitize.max_length = len;
    }
    if let Some(c) = overrides.replacement_char {
        config.sanitize.replacement_char = c;
    }
    if let Some(timeout) = overrides.timeout_seconds {
        config.request_timeout_seconds = timeout;
    }
    if overrides.keep_empty_dirs {
        config.remove_empty_mod_dirs = false;
    }
    if overrides.fail_fast {
        config.relocation_policy = RelocationPolicy::FailFast;
    }
    if overrides.verbose {
        config.scanner.verbose = true;
    }

    config
}
