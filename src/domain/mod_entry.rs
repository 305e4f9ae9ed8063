//! A single workshop package discovered in the content cache.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::sanitize::SanitizeOptions;

/// Workshop item id (the numeric directory name in the content cache)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModId(u64);

impl ModId {
    /// Wrap a raw id. Returns `None` for zero, which the workshop never assigns.
    pub fn new(raw: u64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// Get the raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ModId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let raw: u64 = s
            .parse()
            .map_err(|e| anyhow::anyhow!("'{}' is not a workshop id: {}", s, e))?;
        Self::new(raw).ok_or_else(|| anyhow::anyhow!("workshop id must be positive"))
    }
}

/// One content package found under the workshop cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModEntry {
    /// Workshop id
    pub id: ModId,

    /// Directory the package was discovered in
    pub source_dir: PathBuf,

    /// The package's main archive, renamed on migration
    pub primary_content_path: Option<PathBuf>,

    /// Everything else that moves with the package under its own name
    pub auxiliary_paths: Vec<PathBuf>,

    /// Display name; the id until metadata says otherwise
    pub title: String,
}

impl ModEntry {
    /// Create an entry whose title defaults to its id
    pub fn new(
        id: ModId,
        source_dir: impl Into<PathBuf>,
        primary_content_path: Option<PathBuf>,
        auxiliary_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            id,
            source_dir: source_dir.into(),
            primary_content_path,
            auxiliary_paths,
            title: id.to_string(),
        }
    }

    /// Replace the default title with a sanitized version of `raw_title`.
    ///
    /// Returns `false` (and keeps the current title) if nothing is left after
    /// sanitizing.
    pub fn apply_title(&mut self, raw_title: &str, options: &SanitizeOptions) -> bool {
        let title = options.apply(raw_title);
        if title.is_empty() {
            return false;
        }
        self.title = title;
        true
    }

    /// Fall back to the id as title, held to the same length limit as real titles
    pub fn apply_default_title(&mut self, options: &SanitizeOptions) {
        self.title = options.apply(&self.id.to_string());
    }

    /// Number of files this entry will move
    pub fn file_count(&self) -> usize {
        self.auxiliary_paths.len() + usize::from(self.primary_content_path.is_some())
    }
}

impl fmt::Display for ModEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mod {} '{}'", self.id, self.title)
    }
}
