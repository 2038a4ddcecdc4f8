//! Remote archive store
//!
//! The pipeline drives the store only through [`ArchiveStore`]. Two
//! implementations ship with the crate:
//!
//! - [`ApiClient`]: HTTP client for an archive server
//! - [`MemoryStore`]: in-process store with the same semantics

pub mod client;
pub mod endpoints;
pub mod memory;
pub mod types;

pub use client::ApiClient;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::pipeline::{ArchiveName, DependencySet, FileMetadata, TagSet};
use archup_common::types::{BumpPolicy, Version};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An archive as reported by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    pub name: ArchiveName,

    /// `None` until the first version is pushed
    #[serde(default)]
    pub version: Option<Version>,

    #[serde(default)]
    pub metadata: FileMetadata,

    #[serde(default)]
    pub tags: TagSet,
}

/// A new version to push to an existing archive
#[derive(Debug, Clone, Copy)]
pub struct ArchiveUpdate<'a> {
    pub local_path: &'a Path,
    pub metadata: &'a FileMetadata,
    pub dependencies: &'a DependencySet,
    pub bump: BumpPolicy,
    pub cache: bool,
}

/// Operations the upload pipeline needs from a versioned archive store
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Create an empty archive; fails with [`StoreError::AlreadyExists`] on a name collision
    async fn create(
        &self,
        name: &ArchiveName,
        metadata: &FileMetadata,
        tags: &TagSet,
    ) -> Result<Archive, StoreError>;

    /// Fetch an existing archive
    async fn get(&self, name: &ArchiveName) -> Result<Archive, StoreError>;

    /// Attach tags; existing tags are kept
    async fn add_tags(&self, archive: &Archive, tags: &TagSet) -> Result<(), StoreError>;

    /// Upload the local file as the next version and return that version
    async fn update(&self, archive: &Archive, update: ArchiveUpdate<'_>)
        -> Result<Version, StoreError>;
}
