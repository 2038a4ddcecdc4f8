//! Metadata resolution
//!
//! A file's metadata is built from three layers, later layers overwriting
//! earlier ones on key collision:
//!
//! 1. content attributes read by a [`MetadataSource`]
//! 2. positional filename components zipped against declared field names
//! 3. static overrides from the project config

use super::FileMetadata;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads content-level attributes from a file
pub trait MetadataSource: Send + Sync {
    fn extract(&self, path: &Path) -> Result<FileMetadata, PipelineError>;
}

/// Source for formats without a readable header
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContentMetadata;

impl MetadataSource for NoContentMetadata {
    fn extract(&self, _path: &Path) -> Result<FileMetadata, PipelineError> {
        Ok(FileMetadata::new())
    }
}

/// Reads the YAML header block of a metaCSV file.
///
/// The header sits between two `---` lines at the top of the file. Top-level
/// scalars become metadata, and the entries of an `attrs` mapping are lifted
/// to the top level. A file that does not start with `---` has no header.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaCsvHeader;

const HEADER_FENCE: &str = "---";

impl MetadataSource for MetaCsvHeader {
    fn extract(&self, path: &Path) -> Result<FileMetadata, PipelineError> {
        let fail = |reason: String| {
            PipelineError::metadata_extraction(path.display().to_string(), reason)
        };

        let file = File::open(path).map_err(|e| fail(e.to_string()))?;
        let mut lines = BufReader::new(file).lines();

        match lines.next() {
            Some(Ok(first)) if first.trim_end() == HEADER_FENCE => {}
            Some(Err(e)) => return Err(fail(e.to_string())),
            _ => return Ok(FileMetadata::new()),
        }

        let mut header = String::new();
        let mut closed = false;
        for line in lines {
            let line = line.map_err(|e| fail(e.to_string()))?;
            if line.trim_end() == HEADER_FENCE {
                closed = true;
                break;
            }
            header.push_str(&line);
            header.push('\n');
        }

        if !closed {
            return Err(fail("header block is not terminated by '---'".to_string()));
        }

        let parsed: serde_yaml::Value =
            serde_yaml::from_str(&header).map_err(|e| fail(e.to_string()))?;

        let mapping = match parsed {
            serde_yaml::Value::Mapping(mapping) => mapping,
            serde_yaml::Value::Null => return Ok(FileMetadata::new()),
            _ => return Err(fail("header is not a key-value mapping".to_string())),
        };

        let mut metadata = FileMetadata::new();
        for (key, value) in mapping {
            let Some(key) = yaml_key(&key) else { continue };

            match value {
                serde_yaml::Value::Mapping(attrs) if key == "attrs" => {
                    for (attr_key, attr_value) in attrs {
                        if let Some(attr_key) = yaml_key(&attr_key) {
                            insert_scalar(&mut metadata, attr_key, attr_value);
                        }
                    }
                }
                value => insert_scalar(&mut metadata, key, value),
            }
        }

        Ok(metadata)
    }
}

fn yaml_key(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// Nested structures (coords, variables) are table layout, not archive metadata.
fn insert_scalar(metadata: &mut FileMetadata, key: String, value: serde_yaml::Value) {
    let json = match value {
        serde_yaml::Value::String(s) => serde_json::Value::String(s),
        serde_yaml::Value::Bool(b) => serde_json::Value::Bool(b),
        serde_yaml::Value::Number(n) => match serde_json::to_value(&n) {
            Ok(v) => v,
            Err(_) => serde_json::Value::String(n.to_string()),
        },
        _ => return,
    };
    metadata.insert(key, json);
}

/// Which [`MetadataSource`] a project uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetadataSourceKind {
    #[default]
    None,
    Metacsv,
}

impl MetadataSourceKind {
    pub fn build(self) -> Box<dyn MetadataSource> {
        match self {
            MetadataSourceKind::None => Box::new(NoContentMetadata),
            MetadataSourceKind::Metacsv => Box::new(MetaCsvHeader),
        }
    }
}

/// Positional filename parsing rules
#[derive(Debug, Clone)]
pub struct FilenameFields {
    names: Vec<String>,
    delimiter: String,
    strict: bool,
}

impl FilenameFields {
    pub fn new(names: Vec<String>, delimiter: impl Into<String>, strict: bool) -> Self {
        Self {
            names,
            delimiter: delimiter.into(),
            strict,
        }
    }

    /// No filename parsing at all
    pub fn none() -> Self {
        Self::new(Vec::new(), "_", true)
    }

    /// Split the file stem and zip it against the declared names.
    ///
    /// In strict mode a component count that differs from the declared list
    /// is an error; otherwise extras are dropped and missing trailing fields
    /// stay absent.
    pub fn parse(&self, path: &Path) -> Result<FileMetadata, PipelineError> {
        if self.names.is_empty() {
            return Ok(FileMetadata::new());
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let components: Vec<&str> = stem.split(self.delimiter.as_str()).collect();

        if self.strict && components.len() != self.names.len() {
            return Err(PipelineError::FilenameFields {
                file: stem.clone(),
                expected: self.names.len(),
                found: components.len(),
            });
        }

        Ok(self
            .names
            .iter()
            .zip(components)
            .map(|(name, value)| (name.clone(), value))
            .collect())
    }
}

/// Merges content, filename, and override metadata for a file
pub struct MetadataResolver {
    source: Box<dyn MetadataSource>,
    filename: FilenameFields,
    overrides: FileMetadata,
}

impl MetadataResolver {
    pub fn new(
        source: Box<dyn MetadataSource>,
        filename: FilenameFields,
        overrides: FileMetadata,
    ) -> Self {
        Self {
            source,
            filename,
            overrides,
        }
    }

    pub fn resolve(&self, path: &Path) -> Result<FileMetadata, PipelineError> {
        let mut metadata = self.source.extract(path)?;
        metadata.merge(self.filename.parse(path)?);
        metadata.merge(self.overrides.clone());
        Ok(metadata)
    }
}
