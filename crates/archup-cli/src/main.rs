//! Archup CLI - Main entry point

use archup_cli::{Cli, Commands, EXIT_FAILURE, EXIT_SUCCESS};
use archup_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Verbose mode shows progress lines; otherwise only warnings and failures
    let log_config = LogConfig::builder()
        .level(if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        })
        .output(LogOutput::Console)
        .log_file_prefix("archup")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging; failure detail is then only in the summary
    let guard = match init_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };

    let code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    };

    // Flush file logs before exiting
    drop(guard);
    process::exit(code);
}

/// Execute the CLI command and return the process exit code
async fn execute_command(cli: &Cli) -> archup_cli::Result<i32> {
    match &cli.command {
        Commands::Upload(args) => {
            let report =
                archup_cli::commands::upload::run(args, cli.server_url.as_deref()).await?;
            Ok(report.exit_code())
        }

        Commands::Init { path, force } => {
            archup_cli::commands::init::run(path.clone(), *force).await?;
            Ok(EXIT_SUCCESS)
        }
    }
}
