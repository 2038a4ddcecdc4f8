//! Idempotent create-or-update of one archive
//!
//! ```text
//! create ──ok──────────────────────────────┐
//!    │                                     ▼
//!    └─AlreadyExists─┬─recreate─► get ─► add_tags ─► update
//!                    └─otherwise─► DuplicateArchive
//! ```
//!
//! Any other create failure propagates unchanged.

use super::{ArchiveName, PreparedUpload};
use crate::error::{PipelineError, StoreError};
use crate::store::{ArchiveStore, ArchiveUpdate};
use archup_common::types::{BumpPolicy, Version};
use tracing::{debug, info};

/// How the store should be driven for one upload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOptions {
    /// Treat an existing archive as something to add a version to
    pub recreate: bool,
    /// Ask the store to keep a local cache of the file
    pub cache: bool,
    pub bump: BumpPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertResult {
    pub name: ArchiveName,
    pub version: Version,
    /// False when the archive already existed
    pub created: bool,
}

/// Drives create-or-update against an [`ArchiveStore`]
pub struct ArchiveUploader<'s, S: ArchiveStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: ArchiveStore + ?Sized> ArchiveUploader<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub async fn upsert(
        &self,
        upload: &PreparedUpload,
        options: UpsertOptions,
    ) -> Result<UpsertResult, PipelineError> {
        let name = &upload.name;

        let (archive, created) = match self
            .store
            .create(name, &upload.metadata, &upload.tags)
            .await
        {
            Ok(archive) => {
                debug!(archive = %name, "Archive created");
                (archive, true)
            }
            Err(StoreError::AlreadyExists(_)) if options.recreate => {
                debug!(archive = %name, "Archive exists, merging into it");
                let archive = self.store.get(name).await?;
                self.store.add_tags(&archive, &upload.tags).await?;
                (archive, false)
            }
            Err(StoreError::AlreadyExists(_)) => {
                return Err(PipelineError::DuplicateArchive(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let version = self
            .store
            .update(
                &archive,
                ArchiveUpdate {
                    local_path: &upload.path,
                    metadata: &upload.metadata,
                    dependencies: &upload.dependencies,
                    bump: options.bump,
                    cache: options.cache,
                },
            )
            .await?;

        info!(archive = %name, version = %version, created, "Archive uploaded");

        Ok(UpsertResult {
            name: name.clone(),
            version,
            created,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pipeline::{DependencySet, FileMetadata, TagSet};
    use crate::store::memory::StoreCall;
    use crate::store::MemoryStore;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn prepared(file: &NamedTempFile, tags: &[&str]) -> PreparedUpload {
        PreparedUpload {
            path: file.path().to_path_buf(),
            metadata: [("year", "2050")].into_iter().collect::<FileMetadata>(),
            name: ArchiveName::from("GCP/climate/2050/DJF.nc"),
            tags: tags.iter().map(|t| t.to_string()).collect::<TagSet>(),
            dependencies: DependencySet::new(),
        }
    }

    fn data_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"data").unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_fresh_archive_is_created_and_updated() {
        let store = MemoryStore::new();
        let file = data_file();
        let upload = prepared(&file, &["2050", "DJF"]);

        let result = ArchiveUploader::new(&store)
            .upsert(&upload, UpsertOptions::default())
            .await
            .unwrap();

        assert!(result.created);
        assert_eq!(result.version, Version::new(1, 0, 0));
        assert_eq!(
            store.calls().await,
            vec![
                StoreCall::Create(upload.name.clone()),
                StoreCall::Update(upload.name.clone())
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_without_recreate_fails_before_mutation() {
        let store = MemoryStore::new();
        let file = data_file();
        let upload = prepared(&file, &["2050"]);
        let uploader = ArchiveUploader::new(&store);
        uploader.upsert(&upload, UpsertOptions::default()).await.unwrap();

        let again = prepared(&file, &["2050", "extra"]);
        let err = uploader
            .upsert(&again, UpsertOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::DuplicateArchive(_)));
        let stored = store.archive(&upload.name).await.unwrap();
        assert!(!stored.archive.tags.contains("extra"));
        assert_eq!(stored.history.len(), 1);
        assert_eq!(
            store.calls().await.last(),
            Some(&StoreCall::Create(upload.name.clone()))
        );
    }

    #[tokio::test]
    async fn test_recreate_merges_tags_and_bumps() {
        let store = MemoryStore::new();
        let file = data_file();
        let uploader = ArchiveUploader::new(&store);
        let options = UpsertOptions {
            recreate: true,
            cache: false,
            bump: BumpPolicy::Minor,
        };

        let first = uploader.upsert(&prepared(&file, &["a", "b"]), options).await.unwrap();
        let second = uploader.upsert(&prepared(&file, &["b", "c"]), options).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.version, Version::new(0, 1, 0));
        assert_eq!(second.version, Version::new(0, 2, 0));

        let stored = store.archive(&second.name).await.unwrap();
        let tags: Vec<&str> = stored.archive.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["a", "b", "c"]);
    }
}
