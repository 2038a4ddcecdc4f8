//! HTTP client for an archive server
//!
//! Status codes carry the store's error kinds: `409 Conflict` is a duplicate
//! archive and `404 Not Found` a missing one. Everything else that is not a
//! success is a communication error.

use super::types::{
    AddTagsRequest, ApiResponse, CreateArchiveRequest, VersionManifest, VersionResponse,
};
use super::{endpoints, Archive, ArchiveStore, ArchiveUpdate};
use crate::checksum::compute_checksum;
use crate::error::{CliError, StoreError};
use crate::pipeline::{ArchiveName, FileMetadata, TagSet};
use archup_common::types::Version;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

// ============================================================================
// API Client Constants
// ============================================================================

/// Default timeout for API requests in seconds.
/// Can be overridden via ARCHUP_API_TIMEOUT_SECS environment variable.
/// Large data files need the headroom.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// API client for an archive server
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Result<Self, CliError> {
        let timeout_secs = std::env::var("ARCHUP_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Map status codes to store errors and unwrap the response envelope
async fn read_envelope<T: DeserializeOwned>(
    response: Response,
    name: &ArchiveName,
) -> Result<ApiResponse<T>, StoreError> {
    let status = response.status();
    match status {
        StatusCode::CONFLICT => return Err(StoreError::AlreadyExists(name.to_string())),
        StatusCode::NOT_FOUND => return Err(StoreError::NotFound(name.to_string())),
        _ => {}
    }

    let body = response.text().await?;
    let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => {
            return Err(StoreError::communication(format!(
                "malformed response for '{}': {}",
                name, e
            )));
        }
        Err(_) => {
            return Err(StoreError::communication(format!(
                "HTTP {} for '{}': {}",
                status,
                name,
                body.trim()
            )));
        }
    };

    if !status.is_success() || !envelope.success {
        return Err(StoreError::communication(envelope.error.clone().unwrap_or_else(
            || format!("HTTP {} for '{}'", status, name),
        )));
    }

    Ok(envelope)
}

fn require_data<T>(envelope: ApiResponse<T>, name: &ArchiveName) -> Result<T, StoreError> {
    envelope
        .data
        .ok_or_else(|| StoreError::communication(format!("empty response for '{}'", name)))
}

#[async_trait]
impl ArchiveStore for ApiClient {
    async fn create(
        &self,
        name: &ArchiveName,
        metadata: &FileMetadata,
        tags: &TagSet,
    ) -> Result<Archive, StoreError> {
        let url = endpoints::archives_url(&self.base_url);
        debug!(archive = %name, url = %url, "Creating archive");

        let response = self
            .client
            .post(&url)
            .json(&CreateArchiveRequest {
                name,
                metadata,
                tags,
            })
            .send()
            .await?;

        require_data(read_envelope(response, name).await?, name)
    }

    async fn get(&self, name: &ArchiveName) -> Result<Archive, StoreError> {
        let url = endpoints::archive_url(&self.base_url, name.as_str());
        debug!(archive = %name, "Fetching archive");

        let response = self.client.get(&url).send().await?;
        require_data(read_envelope(response, name).await?, name)
    }

    async fn add_tags(&self, archive: &Archive, tags: &TagSet) -> Result<(), StoreError> {
        let url = endpoints::archive_tags_url(&self.base_url, archive.name.as_str());
        debug!(archive = %archive.name, count = tags.len(), "Attaching tags");

        let response = self
            .client
            .post(&url)
            .json(&AddTagsRequest { tags })
            .send()
            .await?;

        read_envelope::<serde_json::Value>(response, &archive.name).await?;
        Ok(())
    }

    async fn update(
        &self,
        archive: &Archive,
        update: ArchiveUpdate<'_>,
    ) -> Result<Version, StoreError> {
        let url = endpoints::archive_versions_url(&self.base_url, archive.name.as_str());
        let bytes = tokio::fs::read(update.local_path).await?;

        let manifest = serde_json::to_string(&VersionManifest {
            metadata: update.metadata,
            dependencies: update.dependencies,
            bump: update.bump,
            cache: update.cache,
            checksum: compute_checksum(&bytes),
        })
        .map_err(|e| StoreError::communication(format!("failed to encode manifest: {}", e)))?;

        let file_name = update
            .local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        debug!(
            archive = %archive.name,
            bytes = bytes.len(),
            bump = %update.bump,
            cache = update.cache,
            "Uploading version"
        );

        let form = Form::new()
            .part("manifest", Part::text(manifest).mime_str("application/json")?)
            .part("file", Part::bytes(bytes).file_name(file_name));

        let response = self.client.post(&url).multipart(form).send().await?;
        let envelope = read_envelope::<VersionResponse>(response, &archive.name).await?;

        Ok(require_data(envelope, &archive.name)?.version)
    }
}
