//! Archive naming
//!
//! The archive name is the idempotency key for the whole pipeline: the same
//! metadata must always produce the same name.

use super::{ArchiveName, FileMetadata};
use crate::error::{CliError, PipelineError, Result};
use regex::Regex;
use std::path::Path;

/// Derives a unique, hierarchical archive name for a file
pub trait Namer: Send + Sync {
    fn name(
        &self,
        path: &Path,
        metadata: &FileMetadata,
    ) -> std::result::Result<ArchiveName, PipelineError>;
}

/// Formats `{key}` placeholders from metadata into a fixed template, e.g.
/// `{project}/{team}/{variable}/{scenario}/{model}/{year}/{season}.nc`
#[derive(Debug, Clone)]
pub struct TemplateNamer {
    template: String,
    placeholder: Regex,
}

impl TemplateNamer {
    pub fn new(template: &str) -> Result<Self> {
        if template.trim().is_empty() {
            return Err(CliError::config("name_template must not be empty"));
        }

        let placeholder = Regex::new(r"\{([A-Za-z0-9_]+)\}").map_err(anyhow::Error::from)?;

        let stripped = placeholder.replace_all(template, "");
        if stripped.contains('{') || stripped.contains('}') {
            return Err(CliError::config(format!(
                "name_template '{}' has a malformed placeholder; use {{key}} with letters, digits, or underscores",
                template
            )));
        }

        Ok(Self {
            template: template.to_string(),
            placeholder,
        })
    }

    /// Placeholder keys in template order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.placeholder
            .captures_iter(&self.template)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
    }
}

impl Namer for TemplateNamer {
    fn name(
        &self,
        _path: &Path,
        metadata: &FileMetadata,
    ) -> std::result::Result<ArchiveName, PipelineError> {
        if let Some(missing) = self.keys().find(|key| metadata.get_str(key).is_none()) {
            return Err(PipelineError::MissingMetadata {
                key: missing.to_string(),
            });
        }

        let name = self.placeholder.replace_all(&self.template, |caps: &regex::Captures<'_>| {
            metadata.get_str(&caps[1]).unwrap_or_default()
        });

        Ok(ArchiveName::new(name))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const CLIMATE_TEMPLATE: &str = "{project}/{team}/{probability_method}/{variable}/{geography}/{frequency}/{scenario}/{model}/{year}/{season}.nc";

    fn climate_metadata() -> FileMetadata {
        [
            ("project", "GCP"),
            ("team", "climate"),
            ("probability_method", "SMME"),
            ("variable", "tasmax"),
            ("geography", "grid025"),
            ("frequency", "daily"),
            ("scenario", "rcp85"),
            ("model", "GFDL"),
            ("year", "2050"),
            ("season", "DJF"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_template_name() {
        let namer = TemplateNamer::new(CLIMATE_TEMPLATE).unwrap();
        let name = namer.name(Path::new("x.nc"), &climate_metadata()).unwrap();

        assert_eq!(
            name.as_str(),
            "GCP/climate/SMME/tasmax/grid025/daily/rcp85/GFDL/2050/DJF.nc"
        );
    }

    #[test]
    fn test_name_is_deterministic() {
        let namer = TemplateNamer::new(CLIMATE_TEMPLATE).unwrap();
        let metadata = climate_metadata();

        let first = namer.name(Path::new("a.nc"), &metadata).unwrap();
        for _ in 0..5 {
            assert_eq!(namer.name(Path::new("a.nc"), &metadata).unwrap(), first);
        }
    }

    #[test]
    fn test_missing_key() {
        let namer = TemplateNamer::new("{project}/{year}/{season}.nc").unwrap();
        let metadata: FileMetadata = [("project", "GCP"), ("season", "DJF")].into_iter().collect();

        let err = namer.name(Path::new("a.nc"), &metadata).unwrap_err();
        assert!(matches!(err, PipelineError::MissingMetadata { ref key } if key == "year"));
    }

    #[test]
    fn test_non_string_values() {
        let namer = TemplateNamer::new("{run}/{year}").unwrap();
        let mut metadata = FileMetadata::new();
        metadata.insert("run", serde_json::json!(3));
        metadata.insert("year", serde_json::json!(2050));

        assert_eq!(namer.name(Path::new("a"), &metadata).unwrap().as_str(), "3/2050");
    }

    #[test]
    fn test_keys_in_order() {
        let namer = TemplateNamer::new("{a}/{b}/x/{c}.nc").unwrap();
        assert_eq!(namer.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_malformed_template() {
        assert!(TemplateNamer::new("").is_err());
        assert!(TemplateNamer::new("{project/{year}").is_err());
        assert!(TemplateNamer::new("{bad key}/x").is_err());
    }
}
