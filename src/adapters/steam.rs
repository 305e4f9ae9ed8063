//! Steam Web API adapter for workshop item titles.
//!
//! Endpoint: POST ISteamRemoteStorage/GetPublishedFileDetails/v1/
//! Body: form-encoded `itemcount` plus `publishedfileids[i]` for i in 0..n
//!
//! All ids go out in one request no matter how many mods were found.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{MetadataClient, MetadataError, TitleMap};
use crate::domain::ModId;

/// Default endpoint for published file details
pub const DEFAULT_ENDPOINT: &str =
    "https://api.steampowered.com/ISteamRemoteStorage/GetPublishedFileDetails/v1/";

/// The one batched request of a run: ids in discovery order, each at its
/// zero-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchQuery {
    ids: Vec<ModId>,
}

impl BatchQuery {
    pub fn new(ids: &[ModId]) -> Self {
        Self { ids: ids.to_vec() }
    }

    /// Number of ids in the batch
    pub fn item_count(&self) -> usize {
        self.ids.len()
    }

    /// `(index, id)` pairs; indices are exactly `0..item_count()`
    pub fn indexed(&self) -> impl Iterator<Item = (usize, ModId)> + '_ {
        self.ids.iter().copied().enumerate()
    }

    /// Flat form fields using the service's array encoding
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::with_capacity(self.ids.len() + 1);
        fields.push(("itemcount".to_string(), self.item_count().to_string()));
        fields.extend(
            self.indexed()
                .map(|(i, id)| (format!("publishedfileids[{}]", i), id.to_string())),
        );
        fields
    }

    pub fn contains(&self, id: ModId) -> bool {
        self.ids.contains(&id)
    }
}

/// Top-level response wrapper
#[derive(Debug, Deserialize)]
struct DetailsEnvelope {
    response: DetailsResponse,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    /// Kept as raw values so one odd entry doesn't sink the rest
    #[serde(default)]
    publishedfiledetails: Vec<serde_json::Value>,
}

/// One item of `publishedfiledetails`
#[derive(Debug, Deserialize)]
struct PublishedFileDetails {
    publishedfileid: IdField,
    #[serde(default)]
    title: Option<String>,
}

/// The service sends ids as strings, but accept bare numbers too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdField {
    Text(String),
    Number(u64),
}

impl IdField {
    fn to_mod_id(&self) -> Option<ModId> {
        match self {
            IdField::Text(s) => s.parse().ok(),
            IdField::Number(n) => ModId::new(*n),
        }
    }
}

/// Parse a response body into raw titles for the requested ids.
///
/// Entries without a title, with an unreadable id, or for ids that were not
/// requested are left out. Only a body that isn't the expected envelope is
/// an error.
pub fn parse_titles(body: &str, query: &BatchQuery) -> Result<TitleMap, MetadataError> {
    let envelope: DetailsEnvelope = serde_json::from_str(body)
        .map_err(|e| MetadataError::MalformedResponse(e.to_string()))?;

    let mut titles = TitleMap::new();
    for raw in envelope.response.publishedfiledetails {
        let details: PublishedFileDetails = match serde_json::from_value(raw) {
            Ok(d) => d,
            Err(e) => {
                warn!("Ignoring unreadable item in metadata response: {}", e);
                continue;
            }
        };

        let Some(id) = details.publishedfileid.to_mod_id() else {
            warn!("Ignoring metadata entry with invalid id: {:?}", details.publishedfileid);
            continue;
        };

        if !query.contains(id) {
            warn!("Metadata service returned unrequested id {}", id);
            continue;
        }

        match details.title {
            Some(title) => {
                debug!(%id, %title, "Resolved title");
                titles.insert(id, title);
            }
            None => debug!(%id, "No title in metadata entry"),
        }
    }

    Ok(titles)
}

/// HTTP client for the Steam metadata endpoint
pub struct SteamMetadataClient {
    endpoint: String,
    client: reqwest::Client,
}

impl SteamMetadataClient {
    /// Create a client against `endpoint` with a request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[async_trait]
impl MetadataClient for SteamMetadataClient {
    fn name(&self) -> &str {
        "steam"
    }

    async fn resolve_titles(&self, ids: &[ModId]) -> Result<TitleMap, MetadataError> {
        let query = BatchQuery::new(ids);
        info!(items = query.item_count(), "Making api call");

        let response = self
            .client
            .post(&self.endpoint)
            .form(&query.form_fields())
            .send()
            .await
            .map_err(MetadataError::ServiceUnavailable)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(MetadataError::ServiceUnavailable)?;

        if !status.is_success() {
            return Err(MetadataError::HttpStatus { status, body });
        }

        let titles = parse_titles(&body, &query)?;
        info!(resolved = titles.len(), "Successfully called api");
        Ok(titles)
    }
}
