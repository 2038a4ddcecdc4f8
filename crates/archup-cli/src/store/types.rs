//! API request and response types

use crate::pipeline::{ArchiveName, DependencySet, FileMetadata, TagSet};
use archup_common::types::{BumpPolicy, Version};
use serde::{Deserialize, Serialize};

/// Standard API response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Request to create an archive
#[derive(Debug, Clone, Serialize)]
pub struct CreateArchiveRequest<'a> {
    pub name: &'a ArchiveName,
    pub metadata: &'a FileMetadata,
    pub tags: &'a TagSet,
}

/// Request to attach tags to an archive
#[derive(Debug, Clone, Serialize)]
pub struct AddTagsRequest<'a> {
    pub tags: &'a TagSet,
}

/// JSON part of a version upload
#[derive(Debug, Clone, Serialize)]
pub struct VersionManifest<'a> {
    pub metadata: &'a FileMetadata,
    pub dependencies: &'a DependencySet,
    pub bump: BumpPolicy,
    pub cache: bool,
    /// SHA-256 of the uploaded bytes
    pub checksum: String,
}

/// Response to a version upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: Version,
}
