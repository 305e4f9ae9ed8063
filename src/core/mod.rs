//! Core migration logic.
//!
//! This module contains:
//! - Sanitize: raw title to filesystem-safe name
//! - Migrator: file relocation and cache cleanup
//! - Orchestrator: runs scan, title resolution and migration in order

pub mod migrator;
pub mod orchestrator;
pub mod sanitize;

// Re-export commonly used types
pub use migrator::{
    move_file, CleanupWarning, EntryFailure, MigrationReport, Migrator, MigratorConfig,
    PlannedMove, RelocationError, RelocationPolicy,
};
pub use orchestrator::{apply_titles, Orchestrator, Resolution, RunError, RunSummary};
pub use sanitize::{is_forbidden, sanitize, SanitizeOptions, FORBIDDEN_CHARS};
