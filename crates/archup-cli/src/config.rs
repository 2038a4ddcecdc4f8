//! Project configuration (archup.yml)
//!
//! Loaded once per run. Environment variables override the file, and CLI
//! flags override both.

use crate::error::{CliError, Result};
use crate::pipeline::{DependencySet, FileMetadata, MetadataSourceKind};
use archup_common::types::BumpPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "archup.yml";

/// Default archive server URL
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Project upload configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadConfig {
    /// Glob pattern selecting files to upload
    #[serde(default)]
    pub pattern: String,

    /// Path prefix excluded from tag derivation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_prefix: Option<PathBuf>,

    /// Default for the store-side cache flag
    #[serde(default)]
    pub cache: bool,

    #[serde(default)]
    pub bump: BumpPolicy,

    /// Static metadata; overrides anything read from content or filename
    #[serde(default)]
    pub additional_metadata: FileMetadata,

    /// Field names zipped against '_'-separated filename components
    #[serde(default)]
    pub filename_fields: Vec<String>,

    #[serde(default = "default_delimiter")]
    pub filename_delimiter: String,

    /// Reject filenames whose component count differs from `filename_fields`
    #[serde(default = "default_true")]
    pub strict_filename_fields: bool,

    /// Archive name template with `{key}` placeholders
    pub name_template: String,

    #[serde(default)]
    pub metadata_source: MetadataSourceKind,

    /// Upstream archives every file depends on
    #[serde(default)]
    pub dependencies: DependencySet,

    #[serde(default = "default_server_url")]
    pub server_url: String,
}

fn default_delimiter() -> String {
    "_".to_string()
}

fn default_true() -> bool {
    true
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl UploadConfig {
    /// Parse a config file without applying overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `ARCHUP_SERVER_URL` and `ARCHUP_PATTERN`
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("ARCHUP_SERVER_URL") {
            self.server_url = url;
        }

        if let Ok(pattern) = std::env::var("ARCHUP_PATTERN") {
            self.pattern = pattern;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(CliError::config(
                "no file pattern set; add 'pattern' to archup.yml or pass --pattern",
            ));
        }

        if self.name_template.trim().is_empty() {
            return Err(CliError::config("'name_template' must not be empty"));
        }

        if self.filename_delimiter.is_empty() && !self.filename_fields.is_empty() {
            return Err(CliError::config(
                "'filename_delimiter' must not be empty when 'filename_fields' is set",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL: &str = r#"
pattern: "/scratch/SMME/*/*.nc"
ignore_prefix: /scratch
cache: true
bump: minor
additional_metadata:
  project: GCP
  team: climate
filename_fields: [variable, source, model, scenario, experiment, season, year]
name_template: "{project}/{team}/{variable}/{scenario}/{model}/{year}/{season}.nc"
metadata_source: metacsv
dependencies:
  GCP/climate/baseline.nc: null
  GCP/climate/weights.nc: "1.2.0"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = UploadConfig::from_yaml(FULL).unwrap();

        assert_eq!(config.pattern, "/scratch/SMME/*/*.nc");
        assert_eq!(config.ignore_prefix, Some(PathBuf::from("/scratch")));
        assert!(config.cache);
        assert_eq!(config.bump, BumpPolicy::Minor);
        assert_eq!(config.additional_metadata.get_str("team").as_deref(), Some("climate"));
        assert_eq!(config.filename_fields.len(), 7);
        assert_eq!(config.metadata_source, MetadataSourceKind::Metacsv);
        assert_eq!(config.dependencies.get("GCP/climate/baseline.nc"), Some(&None));
        assert_eq!(
            config.dependencies.get("GCP/climate/weights.nc"),
            Some(&Some("1.2.0".to_string()))
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let config = UploadConfig::from_yaml("pattern: '*.nc'\nname_template: '{a}'\n").unwrap();

        assert!(!config.cache);
        assert_eq!(config.bump, BumpPolicy::Major);
        assert_eq!(config.filename_delimiter, "_");
        assert!(config.strict_filename_fields);
        assert_eq!(config.metadata_source, MetadataSourceKind::None);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert!(config.dependencies.is_empty());
    }

    #[test]
    fn test_validate_requires_pattern() {
        let config = UploadConfig::from_yaml("name_template: '{a}'\n").unwrap();
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_invalid_bump_rejected() {
        let err =
            UploadConfig::from_yaml("pattern: x\nname_template: y\nbump: huge\n").unwrap_err();
        assert!(matches!(err, CliError::YamlParse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = UploadConfig::load("/nonexistent/archup.yml").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = UploadConfig::load(file.path()).unwrap();
        assert_eq!(config.bump, BumpPolicy::Minor);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = UploadConfig::from_yaml(FULL).unwrap();
        std::env::set_var("ARCHUP_SERVER_URL", "http://archive.example.com");
        std::env::set_var("ARCHUP_PATTERN", "/other/*.nc");

        config.apply_env();
        std::env::remove_var("ARCHUP_SERVER_URL");
        std::env::remove_var("ARCHUP_PATTERN");

        assert_eq!(config.server_url, "http://archive.example.com");
        assert_eq!(config.pattern, "/other/*.nc");
    }
}
