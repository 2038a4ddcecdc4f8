//! In-process archive store
//!
//! Keeps archives, their version history, and a log of every call in memory.
//! Versions start at `0.0.0`, so the first `major` push yields `1.0.0`.

use super::{Archive, ArchiveStore, ArchiveUpdate};
use crate::checksum::compute_file_checksum;
use crate::error::StoreError;
use crate::pipeline::{ArchiveName, DependencySet, FileMetadata, TagSet};
use archup_common::types::Version;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::trace;

/// One pushed version of an archive
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRecord {
    pub version: Version,
    pub checksum: String,
    pub dependencies: DependencySet,
    pub cached: bool,
    pub pushed_at: DateTime<Utc>,
}

/// An archive plus its version history
#[derive(Debug, Clone)]
pub struct StoredArchive {
    pub archive: Archive,
    pub history: Vec<VersionRecord>,
}

/// A store operation, in the order it was issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create(ArchiveName),
    Get(ArchiveName),
    AddTags(ArchiveName),
    Update(ArchiveName),
}

#[derive(Default)]
struct State {
    archives: BTreeMap<ArchiveName, StoredArchive>,
    calls: Vec<StoreCall>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one archive
    pub async fn archive(&self, name: &ArchiveName) -> Option<StoredArchive> {
        self.state.lock().await.archives.get(name).cloned()
    }

    /// Names of all archives, sorted
    pub async fn names(&self) -> Vec<ArchiveName> {
        self.state.lock().await.archives.keys().cloned().collect()
    }

    /// Every call issued so far
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().await.calls.clone()
    }
}

#[async_trait]
impl ArchiveStore for MemoryStore {
    async fn create(
        &self,
        name: &ArchiveName,
        metadata: &FileMetadata,
        tags: &TagSet,
    ) -> Result<Archive, StoreError> {
        let mut state = self.state.lock().await;
        state.calls.push(StoreCall::Create(name.clone()));

        if state.archives.contains_key(name) {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }

        let archive = Archive {
            name: name.clone(),
            version: None,
            metadata: metadata.clone(),
            tags: tags.clone(),
        };
        state.archives.insert(
            name.clone(),
            StoredArchive {
                archive: archive.clone(),
                history: Vec::new(),
            },
        );

        trace!(archive = %name, "Created archive");
        Ok(archive)
    }

    async fn get(&self, name: &ArchiveName) -> Result<Archive, StoreError> {
        let mut state = self.state.lock().await;
        state.calls.push(StoreCall::Get(name.clone()));

        state
            .archives
            .get(name)
            .map(|stored| stored.archive.clone())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn add_tags(&self, archive: &Archive, tags: &TagSet) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.calls.push(StoreCall::AddTags(archive.name.clone()));

        let stored = state
            .archives
            .get_mut(&archive.name)
            .ok_or_else(|| StoreError::NotFound(archive.name.to_string()))?;
        stored.archive.tags.extend(tags.iter().cloned());

        Ok(())
    }

    async fn update(
        &self,
        archive: &Archive,
        update: ArchiveUpdate<'_>,
    ) -> Result<Version, StoreError> {
        let local_path = update.local_path.to_path_buf();
        let checksum = tokio::task::spawn_blocking(move || compute_file_checksum(local_path))
            .await
            .map_err(|e| StoreError::communication(format!("checksum task failed: {}", e)))??;

        let mut state = self.state.lock().await;
        state.calls.push(StoreCall::Update(archive.name.clone()));

        let stored = state
            .archives
            .get_mut(&archive.name)
            .ok_or_else(|| StoreError::NotFound(archive.name.to_string()))?;

        let next = stored
            .archive
            .version
            .unwrap_or_default()
            .bump(update.bump);

        stored.archive.version = Some(next);
        stored.archive.metadata.merge(update.metadata.clone());
        stored.history.push(VersionRecord {
            version: next,
            checksum,
            dependencies: update.dependencies.clone(),
            cached: update.cache,
            pushed_at: Utc::now(),
        });

        trace!(archive = %archive.name, version = %next, "Pushed version");
        Ok(next)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use archup_common::types::BumpPolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn data_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"301.2,302.8").unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_create_then_duplicate() {
        let store = MemoryStore::new();
        let name = ArchiveName::from("GCP/a.nc");

        store.create(&name, &FileMetadata::new(), &TagSet::new()).await.unwrap();
        let err = store
            .create(&name, &FileMetadata::new(), &TagSet::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists(ref n) if n == "GCP/a.nc"));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemoryStore::new();
        let err = store.get(&ArchiveName::from("nope")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_bumps_and_records_history() {
        let store = MemoryStore::new();
        let file = data_file();
        let name = ArchiveName::from("GCP/a.nc");
        let archive = store.create(&name, &FileMetadata::new(), &TagSet::new()).await.unwrap();

        let metadata: FileMetadata = [("units", "K")].into_iter().collect();
        let dependencies = DependencySet::new();
        let update = ArchiveUpdate {
            local_path: file.path(),
            metadata: &metadata,
            dependencies: &dependencies,
            bump: BumpPolicy::Major,
            cache: true,
        };

        assert_eq!(store.update(&archive, update).await.unwrap(), Version::new(1, 0, 0));
        let update = ArchiveUpdate {
            bump: BumpPolicy::Minor,
            ..update
        };
        assert_eq!(store.update(&archive, update).await.unwrap(), Version::new(1, 1, 0));

        let stored = store.archive(&name).await.unwrap();
        assert_eq!(stored.history.len(), 2);
        assert!(stored.history[0].cached);
        assert_eq!(stored.history[0].checksum, crate::checksum::compute_checksum(b"301.2,302.8"));
        assert_eq!(stored.archive.metadata.get_str("units").as_deref(), Some("K"));
    }

    #[tokio::test]
    async fn test_add_tags_is_additive() {
        let store = MemoryStore::new();
        let name = ArchiveName::from("a");
        let initial: TagSet = ["x".to_string(), "y".to_string()].into_iter().collect();
        let archive = store.create(&name, &FileMetadata::new(), &initial).await.unwrap();

        let more: TagSet = ["y".to_string(), "z".to_string()].into_iter().collect();
        store.add_tags(&archive, &more).await.unwrap();

        let tags = store.archive(&name).await.unwrap().archive.tags;
        assert_eq!(tags.len(), 3);
        assert_eq!(
            store.calls().await,
            vec![StoreCall::Create(name.clone()), StoreCall::AddTags(name)]
        );
    }

    #[tokio::test]
    async fn test_update_unreadable_file() {
        let store = MemoryStore::new();
        let archive = store
            .create(&ArchiveName::from("a"), &FileMetadata::new(), &TagSet::new())
            .await
            .unwrap();

        let err = store
            .update(
                &archive,
                ArchiveUpdate {
                    local_path: std::path::Path::new("/nonexistent/archup.nc"),
                    metadata: &FileMetadata::new(),
                    dependencies: &DependencySet::new(),
                    bump: BumpPolicy::Patch,
                    cache: false,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Io(_)));
    }
}
