//! Batch execution
//!
//! Files are processed one at a time in discovery order. A per-file failure
//! is logged and recorded as [`UploadOutcome::Failed`]; it never stops the
//! batch. Only problems that prevent the run from starting (an invalid glob
//! pattern) are returned as errors.

use super::upsert::{ArchiveUploader, UpsertOptions};
use super::{ArchiveName, Pipeline};
use crate::error::{CliError, PipelineError, Result};
use crate::progress::{self, BatchProgress};
use crate::store::ArchiveStore;
use crate::{EXIT_PARTIAL_FAILURE, EXIT_SUCCESS};
use archup_common::types::{BumpPolicy, Version};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Flags for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Derive names and tags only; never touch the store
    pub dry_run: bool,
    pub recreate: bool,
    pub cache: bool,
    pub bump: BumpPolicy,
    pub show_progress: bool,
}

impl RunOptions {
    fn upsert(&self) -> UpsertOptions {
        UpsertOptions {
            recreate: self.recreate,
            cache: self.cache,
            bump: self.bump,
        }
    }
}

/// Result for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Dry run: name derived, nothing uploaded
    Parsed { name: ArchiveName },
    Uploaded { name: ArchiveName, version: Version },
    Failed { reason: String },
}

impl UploadOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            UploadOutcome::Parsed { .. } => "parsed",
            UploadOutcome::Uploaded { .. } => "uploaded",
            UploadOutcome::Failed { .. } => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, UploadOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub outcome: UploadOutcome,
}

impl FileOutcome {
    /// Archive name (with the new version once uploaded), or the path on failure
    pub fn subject(&self) -> String {
        match &self.outcome {
            UploadOutcome::Parsed { name } => name.to_string(),
            UploadOutcome::Uploaded { name, version } => format!("{} ({})", name, version),
            UploadOutcome::Failed { .. } => self.path.display().to_string(),
        }
    }
}

/// Outcomes of a whole run, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn uploaded(&self) -> usize {
        self.count(|o| matches!(o, UploadOutcome::Uploaded { .. }))
    }

    pub fn parsed(&self) -> usize {
        self.count(|o| matches!(o, UploadOutcome::Parsed { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(UploadOutcome::is_failure)
    }

    /// Process exit code: success only when no file failed
    pub fn exit_code(&self) -> i32 {
        if self.failed() == 0 {
            EXIT_SUCCESS
        } else {
            EXIT_PARTIAL_FAILURE
        }
    }

    fn count(&self, pred: impl Fn(&UploadOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|f| pred(&f.outcome)).count()
    }
}

/// Expand a glob pattern into regular files, in the order the walk yields them
pub fn discover(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries =
        glob::glob(pattern).map_err(|e| CliError::invalid_pattern(pattern, e.msg))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!(path = %e.path().display(), error = %e, "Skipping unreadable path"),
        }
    }

    Ok(files)
}

/// Runs the pipeline over every file matching a pattern
pub struct BatchRunner<'s, S: ArchiveStore + ?Sized> {
    pipeline: Pipeline,
    store: &'s S,
    pattern: String,
}

impl<'s, S: ArchiveStore + ?Sized> BatchRunner<'s, S> {
    pub fn new(pipeline: Pipeline, store: &'s S, pattern: impl Into<String>) -> Self {
        Self {
            pipeline,
            store,
            pattern: pattern.into(),
        }
    }

    pub async fn run(&self, options: RunOptions) -> Result<BatchReport> {
        let files = discover(&self.pattern)?;
        let total = files.len();

        info!(
            pattern = %self.pattern,
            files = total,
            dry_run = options.dry_run,
            recreate = options.recreate,
            "Starting batch"
        );

        let reporter = BatchProgress::new(total, options.show_progress);
        let mut report = BatchReport {
            outcomes: Vec::with_capacity(total),
        };

        for (index, path) in files.into_iter().enumerate() {
            reporter.start_file(&path);

            let outcome = match self.process_file(&path, options).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    reporter.suspend(|| {
                        error!(
                            path = %path.display(),
                            kind = e.kind(),
                            error = %e,
                            detail = ?e,
                            "Failed to process file"
                        )
                    });
                    UploadOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            let file = FileOutcome { path, outcome };
            reporter.file_done(index + 1, file.outcome.label(), &file.subject());
            info!(
                progress = %progress::counter(index + 1, total),
                path = %file.path.display(),
                outcome = file.outcome.label(),
                "File processed"
            );

            report.outcomes.push(file);
        }

        reporter.finish();
        info!(
            total,
            uploaded = report.uploaded(),
            parsed = report.parsed(),
            failed = report.failed(),
            "Batch complete"
        );

        Ok(report)
    }

    /// Full pipeline for one file; the store is never touched on a dry run
    pub async fn process_file(
        &self,
        path: &Path,
        options: RunOptions,
    ) -> std::result::Result<UploadOutcome, PipelineError> {
        let upload = self.pipeline.prepare(path)?;

        if options.dry_run {
            return Ok(UploadOutcome::Parsed { name: upload.name });
        }

        let result = ArchiveUploader::new(self.store)
            .upsert(&upload, options.upsert())
            .await?;

        Ok(UploadOutcome::Uploaded {
            name: result.name,
            version: result.version,
        })
    }
}
