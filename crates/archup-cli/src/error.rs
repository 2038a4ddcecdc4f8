//! Error types for archup
//!
//! Three layers of failure, matching how far each one reaches:
//!
//! - [`CliError`]: the run cannot start or finish (bad config, invalid pattern).
//! - [`PipelineError`]: one file failed; the batch records it and moves on.
//! - [`StoreError`]: a remote store call failed; wrapped by `PipelineError`.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Run-level error type
///
/// All errors are designed to be user-facing with clear messages and suggestions.
#[derive(Error, Debug)]
pub enum CliError {
    /// Required file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// Project config (archup.yml) is missing a value or has an invalid one
    #[error("Configuration error: {0}. Check archup.yml and your ARCHUP_* environment variables.")]
    Config(String),

    /// Glob pattern could not be compiled
    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// `archup init` target already has a config file
    #[error("Project already initialized: {0}. Use --force to overwrite.")]
    AlreadyInitialized(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("Network setup failed: {0}")]
    Http(#[from] reqwest::Error),

    /// YAML parsing failed
    #[error("Failed to parse YAML: {0}. Check the file syntax at the indicated line/column.")]
    YamlParse(#[from] serde_yaml::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// Failure reported by an [`ArchiveStore`](crate::store::ArchiveStore)
#[derive(Error, Debug)]
pub enum StoreError {
    /// An archive with this name already exists
    #[error("Archive '{0}' already exists")]
    AlreadyExists(String),

    /// No archive with this name exists
    #[error("Archive '{0}' not found")]
    NotFound(String),

    /// The store answered but rejected the request
    #[error("Store error: {0}")]
    Communication(String),

    /// The request never completed
    #[error("Network request failed: {0}. Check your connection and server URL.")]
    Http(#[from] reqwest::Error),

    /// The local file could not be read for upload
    #[error("Failed to read local file: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn communication(msg: impl Into<String>) -> Self {
        Self::Communication(msg.into())
    }
}

/// Failure of the per-file pipeline; fatal to that file only
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Content-level metadata could not be read
    #[error("Failed to extract metadata from '{path}': {reason}")]
    MetadataExtraction { path: String, reason: String },

    /// Filename components do not line up with the declared field list
    #[error("Filename '{file}' has {found} component(s) but {expected} field(s) are declared")]
    FilenameFields {
        file: String,
        expected: usize,
        found: usize,
    },

    /// The name template references a key the metadata lacks
    #[error("Name template references '{key}' but the file metadata has no such key")]
    MissingMetadata { key: String },

    /// Create hit an existing archive and recreate is off
    #[error("Archive '{0}' already exists. Re-run with --recreate to push a new version to it.")]
    DuplicateArchive(String),

    /// Any other store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    pub fn metadata_extraction(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MetadataExtraction {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable kind, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::MetadataExtraction { .. } => "metadata_extraction",
            PipelineError::FilenameFields { .. } => "filename_fields",
            PipelineError::MissingMetadata { .. } => "missing_metadata",
            PipelineError::DuplicateArchive(_) => "duplicate_archive",
            PipelineError::Store(_) => "store_communication",
        }
    }
}
