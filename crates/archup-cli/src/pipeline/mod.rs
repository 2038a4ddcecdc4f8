//! Per-file upload pipeline
//!
//! Each discovered file runs through the same stages, with no state carried
//! between files:
//!
//! ```text
//! MetadataResolver -> Namer -> Tagger -> DependencyResolver -> ArchiveUploader
//! ```
//!
//! The four derivation stages are traits so a project can swap in its own
//! rules; [`Pipeline::from_config`] wires the stock implementations.

pub mod batch;
pub mod dependencies;
pub mod metadata;
pub mod naming;
pub mod tagging;
pub mod upsert;

pub use batch::{BatchReport, BatchRunner, FileOutcome, RunOptions, UploadOutcome};
pub use dependencies::{DependencyResolver, NoDependencies, StaticDependencies};
pub use metadata::{
    FilenameFields, MetaCsvHeader, MetadataResolver, MetadataSource, MetadataSourceKind,
    NoContentMetadata,
};
pub use naming::{Namer, TemplateNamer};
pub use tagging::{PathTagger, Tagger};
pub use upsert::{ArchiveUploader, UpsertOptions, UpsertResult};

use crate::config::UploadConfig;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Search tags for an archive; duplicates collapse
pub type TagSet = BTreeSet<String>;

/// Upstream archive name -> version constraint (`None` means latest)
pub type DependencySet = BTreeMap<String, Option<String>>;

/// Flat key-value metadata describing one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMetadata(BTreeMap<String, Value>);

impl FileMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Render a value as plain text: strings unquoted, scalars via `Display`,
    /// `null` as absent.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(render_value)
    }

    /// Overlay `other` onto `self`; `other` wins on key collision
    pub fn merge(&mut self, other: FileMetadata) {
        self.0.extend(other.0);
    }

    /// All values rendered as text, in key order
    pub fn rendered_values(&self) -> impl Iterator<Item = String> + '_ {
        self.0.values().filter_map(render_value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FileMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// '/'-delimited hierarchical archive identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveName(String);

impl ArchiveName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArchiveName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Everything derived for one file, ready to hand to the store
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedUpload {
    pub path: PathBuf,
    pub metadata: FileMetadata,
    pub name: ArchiveName,
    pub tags: TagSet,
    pub dependencies: DependencySet,
}

/// The derivation stages for one project
pub struct Pipeline {
    metadata: MetadataResolver,
    namer: Box<dyn Namer>,
    tagger: Box<dyn Tagger>,
    dependencies: Box<dyn DependencyResolver>,
}

impl Pipeline {
    pub fn new(
        metadata: MetadataResolver,
        namer: Box<dyn Namer>,
        tagger: Box<dyn Tagger>,
        dependencies: Box<dyn DependencyResolver>,
    ) -> Self {
        Self {
            metadata,
            namer,
            tagger,
            dependencies,
        }
    }

    /// Wire the stock stages from project configuration
    pub fn from_config(config: &UploadConfig) -> Result<Self> {
        let overrides = config.additional_metadata.clone();

        let metadata = MetadataResolver::new(
            config.metadata_source.build(),
            FilenameFields::new(
                config.filename_fields.clone(),
                config.filename_delimiter.clone(),
                config.strict_filename_fields,
            ),
            overrides.clone(),
        );
        let namer = TemplateNamer::new(&config.name_template)?;
        let tagger = PathTagger::new(config.ignore_prefix.clone(), &overrides);
        let dependencies: Box<dyn DependencyResolver> = if config.dependencies.is_empty() {
            Box::new(NoDependencies)
        } else {
            Box::new(StaticDependencies::new(config.dependencies.clone()))
        };

        Ok(Self::new(metadata, Box::new(namer), Box::new(tagger), dependencies))
    }

    /// Run metadata, naming, tagging, and dependency resolution for one file
    pub fn prepare(&self, path: &Path) -> std::result::Result<PreparedUpload, PipelineError> {
        let metadata = self.metadata.resolve(path)?;
        let name = self.namer.name(path, &metadata)?;
        let tags = self.tagger.tags(path, &metadata, &name);
        let dependencies = self.dependencies.dependencies(path, &metadata);

        debug!(
            path = %path.display(),
            name = %name,
            tags = tags.len(),
            dependencies = dependencies.len(),
            "Prepared upload"
        );

        Ok(PreparedUpload {
            path: path.to_path_buf(),
            metadata,
            name,
            tags,
            dependencies,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_later_wins() {
        let mut base: FileMetadata = [("variable", "tas"), ("year", "2050")].into_iter().collect();
        let overlay: FileMetadata = [("variable", "tasmax")].into_iter().collect();
        base.merge(overlay);

        assert_eq!(base.get_str("variable").as_deref(), Some("tasmax"));
        assert_eq!(base.get_str("year").as_deref(), Some("2050"));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_get_str_renders_scalars() {
        let mut metadata = FileMetadata::new();
        metadata.insert("year", json!(2050));
        metadata.insert("bias_corrected", json!(true));
        metadata.insert("note", Value::Null);

        assert_eq!(metadata.get_str("year").as_deref(), Some("2050"));
        assert_eq!(metadata.get_str("bias_corrected").as_deref(), Some("true"));
        assert_eq!(metadata.get_str("note"), None);
        assert_eq!(metadata.get_str("absent"), None);
    }

    #[test]
    fn test_metadata_serializes_flat() {
        let metadata: FileMetadata = [("team", "climate")].into_iter().collect();
        assert_eq!(serde_json::to_value(&metadata).unwrap(), json!({"team": "climate"}));
    }
}
