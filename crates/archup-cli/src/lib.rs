//! Archup CLI Library
//!
//! Batch uploader for a versioned archive store. Every file matching a glob
//! pattern gets metadata, a canonical archive name, search tags, and
//! dependencies derived from it, and is then created or updated as an archive.
//!
//! - **Uploading**: run the batch against the store (`archup upload`)
//! - **Dry runs**: preview archive names without touching the store (`archup upload -d`)
//! - **Project setup**: write a starter `archup.yml` (`archup init`)
//!
//! # Example
//!
//! ```no_run
//! use archup_cli::config::UploadConfig;
//! use archup_cli::pipeline::{BatchRunner, Pipeline, RunOptions};
//! use archup_cli::store::ApiClient;
//!
//! # async fn demo() -> archup_cli::Result<()> {
//! let config = UploadConfig::load("archup.yml")?;
//! let store = ApiClient::new(config.server_url.clone())?;
//! let runner = BatchRunner::new(Pipeline::from_config(&config)?, &store, config.pattern.clone());
//!
//! let report = runner.run(RunOptions::default()).await?;
//! println!("{} failed", report.failed());
//! # Ok(())
//! # }
//! ```

pub mod checksum;
pub mod commands;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod store;

// Re-export commonly used types
pub use error::{CliError, PipelineError, Result, StoreError};

use archup_common::types::BumpPolicy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Every matched file was uploaded or parsed
pub const EXIT_SUCCESS: i32 = 0;

/// The run could not start or finish
pub const EXIT_FAILURE: i32 = 1;

/// The run finished but at least one file failed
pub const EXIT_PARTIAL_FAILURE: i32 = 3;

/// Archup - batch uploader for versioned archives
#[derive(Parser, Debug)]
#[command(name = "archup")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Archive server URL (overrides archup.yml and ARCHUP_SERVER_URL)
    #[arg(long, global = true)]
    pub server_url: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload every file matching the configured pattern
    Upload(UploadArgs),

    /// Write a starter archup.yml
    Init {
        /// Project directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing archup.yml
        #[arg(short, long)]
        force: bool,
    },
}

/// Flags for `archup upload`
#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// Project config file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Derive names and tags only; do not contact the store
    #[arg(short, long)]
    pub dry_run: bool,

    /// Add a new version to archives that already exist instead of failing
    #[arg(short, long)]
    pub recreate: bool,

    /// Ask the store to cache uploaded files
    #[arg(long, conflicts_with = "no_cache")]
    pub cache: bool,

    /// Disable caching even if archup.yml enables it
    #[arg(long)]
    pub no_cache: bool,

    /// Override the file pattern from archup.yml
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Override the version bump policy (major, minor, patch)
    #[arg(short, long)]
    pub bump: Option<BumpPolicy>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_upload_flags() {
        let cli = Cli::try_parse_from([
            "archup", "upload", "-d", "-r", "--cache", "--bump", "minor", "-p", "/data/*.nc",
        ])
        .unwrap();

        let Commands::Upload(args) = cli.command else {
            panic!("expected upload");
        };
        assert!(args.dry_run);
        assert!(args.recreate);
        assert!(args.cache);
        assert_eq!(args.bump, Some(BumpPolicy::Minor));
        assert_eq!(args.pattern.as_deref(), Some("/data/*.nc"));
        assert_eq!(args.config, PathBuf::from("archup.yml"));
    }

    #[test]
    fn test_cache_flags_conflict() {
        assert!(Cli::try_parse_from(["archup", "upload", "--cache", "--no-cache"]).is_err());
    }
}
