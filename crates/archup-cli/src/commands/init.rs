//! `archup init` command implementation
//!
//! Writes a commented starter archup.yml for a new upload project.

use crate::config::DEFAULT_CONFIG_FILE;
use crate::error::{CliError, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Starter project config; every key is documented inline
pub const STARTER_CONFIG: &str = r#"# archup project configuration
#
# Preview names and tags with `archup upload --dry-run` before a live run.

# Files to upload (glob syntax, `**` matches nested directories)
pattern: "/data/project/**/*.nc"

# Leading path stripped before path segments become tags
ignore_prefix: "/data"

# Ask the store to keep a local cache of uploaded files
cache: false

# Version segment bumped on every upload: major, minor, or patch
bump: major

# Static metadata attached to every archive. Wins over content and filename
# metadata, and every value also becomes a tag.
additional_metadata:
  project: my-project
  team: my-team

# Names for the '_'-separated parts of each file name, in order
# e.g. tasmax_NASA_GFDL_rcp85_r1_DJF_2050.nc
filename_fields: [variable, source, model, scenario, experiment, season, year]
filename_delimiter: "_"

# Fail a file whose name has a different number of parts than filename_fields
strict_filename_fields: true

# Archive name built from metadata keys; must be unique per dataset
name_template: "{project}/{team}/{variable}/{scenario}/{model}/{year}/{season}.nc"

# Header reader for file content: none or metacsv
metadata_source: none

# Upstream archives every file depends on (null = latest version)
dependencies: {}

server_url: "http://localhost:8000"
"#;

/// Write a starter config into `path`
pub async fn run(path: PathBuf, force: bool) -> Result<()> {
    let config_path = write_starter(&path, force)?;

    println!("{} Created {}", "✓".green(), config_path.display());
    println!("  Edit the pattern, fields, and name template, then preview with:");
    println!("  archup upload --dry-run");

    Ok(())
}

fn write_starter(project_dir: &Path, force: bool) -> Result<PathBuf> {
    if !project_dir.exists() {
        fs::create_dir_all(project_dir)?;
    }

    let config_path = project_dir.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !force {
        return Err(CliError::AlreadyInitialized(config_path.display().to_string()));
    }

    fs::write(&config_path, STARTER_CONFIG)?;
    Ok(config_path)
}
