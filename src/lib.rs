//! modmover - Steam Workshop mod mover and renamer
//!
//! Moves Starbound mods downloaded through the Steam Workshop out of the
//! workshop content cache and into the game's own `mods` folder, naming
//! each main archive after the mod's workshop title.
//!
//! # Pipeline
//!
//! Each run is one linear pass:
//! 1. Scan the workshop cache and classify each mod's files
//! 2. Resolve all titles with a single metadata request
//! 3. Sanitize titles into safe file names
//! 4. Move files and optionally remove the emptied cache folders
//!
//! If the metadata request fails, nothing on disk is touched.
//!
//! # Modules
//!
//! - `adapters`: Metadata service integration (Steam Web API)
//! - `core`: Sanitizer, Migrator, Orchestrator
//! - `domain`: Data structures (ModId, ModEntry)
//! - `workshop`: Content cache scanner
//! - `config`: Configuration loading
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Preview what would happen
//! modmover migrate --dry-run
//!
//! # Move everything
//! modmover migrate
//!
//! # Just list the workshop folder
//! modmover scan
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod workshop;

// Re-export main types at crate root for convenience
pub use adapters::{MetadataClient, MetadataError, SteamMetadataClient, TitleMap};
pub use config::ResolvedConfig;
pub use crate::core::{sanitize, Migrator, Orchestrator, RelocationPolicy, RunSummary, SanitizeOptions};
pub use domain::{ModEntry, ModId};
pub use workshop::{ScanIssue, ScanOutcome, WorkshopScanner};
