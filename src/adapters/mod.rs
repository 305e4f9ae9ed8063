//! Adapter interfaces for external systems.
//!
//! The only external system is the workshop metadata service, which maps
//! item ids to their human-readable titles.

pub mod steam;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ModId;

// Re-export the Steam adapter
pub use steam::{BatchQuery, SteamMetadataClient};

/// Raw (unsanitized) titles keyed by id. Ids the service didn't know are absent.
pub type TitleMap = HashMap<ModId, String>;

/// Errors from the metadata service. All of them are fatal for a run.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Unable to connect to the metadata service: {0}")]
    ServiceUnavailable(#[source] reqwest::Error),

    #[error("Metadata service returned HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed metadata response: {0}")]
    MalformedResponse(String),
}

/// Trait for title lookups
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Human-readable client name
    fn name(&self) -> &str;

    /// Look up titles for all `ids` in a single request
    async fn resolve_titles(&self, ids: &[ModId]) -> Result<TitleMap, MetadataError>;
}
