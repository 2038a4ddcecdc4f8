//! `archup upload` command implementation
//!
//! Loads the project config, runs the batch against the archive server, and
//! prints a summary. Per-file failure detail goes to the log stream.

use crate::config::UploadConfig;
use crate::error::Result;
use crate::pipeline::{BatchReport, BatchRunner, Pipeline, RunOptions, UploadOutcome};
use crate::store::ApiClient;
use crate::UploadArgs;
use colored::Colorize;

/// Run an upload batch and return its report
pub async fn run(args: &UploadArgs, server_url: Option<&str>) -> Result<BatchReport> {
    let mut config = UploadConfig::load(&args.config)?;
    config.apply_env();
    apply_overrides(&mut config, args, server_url);
    config.validate()?;

    let options = RunOptions {
        dry_run: args.dry_run,
        recreate: args.recreate,
        cache: config.cache,
        bump: config.bump,
        show_progress: !args.no_progress,
    };

    let pipeline = Pipeline::from_config(&config)?;
    let store = ApiClient::new(config.server_url.clone())?;
    let report = BatchRunner::new(pipeline, &store, config.pattern.clone())
        .run(options)
        .await?;

    print_report(&report, options.dry_run);
    Ok(report)
}

/// CLI flags win over the config file and the environment
fn apply_overrides(config: &mut UploadConfig, args: &UploadArgs, server_url: Option<&str>) {
    if let Some(pattern) = &args.pattern {
        config.pattern = pattern.clone();
    }

    if let Some(url) = server_url {
        config.server_url = url.to_string();
    }

    if let Some(bump) = args.bump {
        config.bump = bump;
    }

    if args.cache {
        config.cache = true;
    } else if args.no_cache {
        config.cache = false;
    }
}

fn print_report(report: &BatchReport, dry_run: bool) {
    if dry_run {
        for file in &report.outcomes {
            if let UploadOutcome::Parsed { name } = &file.outcome {
                println!("{} {} -> {}", "•".cyan(), file.path.display(), name);
            }
        }
        println!();
    }

    if report.total() == 0 {
        println!("No files matched the pattern.");
        return;
    }

    let done = if dry_run {
        format!("{} parsed", report.parsed())
    } else {
        format!("{} uploaded", report.uploaded())
    };

    if report.failed() == 0 {
        println!("{} {} of {} file(s)", "✓".green().bold(), done, report.total());
    } else {
        println!(
            "{} {}, {} failed of {} file(s)",
            "✗".red().bold(),
            done,
            report.failed(),
            report.total()
        );
        for file in report.outcomes.iter().filter(|f| f.outcome.is_failure()) {
            println!("  {} {}", "-".red(), file.path.display());
        }
        println!("See the log output for failure details.");
    }
}
