//! Domain types for modmover.
//!
//! - ModId: workshop item identifier
//! - ModEntry: one package discovered in the workshop cache

pub mod mod_entry;

pub use mod_entry::{ModEntry, ModId};
