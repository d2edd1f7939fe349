//! BioDataFuse CLI - Main entry point

use bdf_cli::{Cli, Commands};
use bdf_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    let Some(command) = cli.command else {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    };

    // Warnings only unless --verbose; LOG_* variables take precedence
    let level = if cli.verbose { LogLevel::Debug } else { LogLevel::Warn };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("bdf-cli")
        .build();
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging
    let guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(command).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        // Flush file logs before exiting
        drop(guard);
        process::exit(1);
    }
}

async fn execute_command(command: Commands) -> bdf_cli::Result<()> {
    match command {
        Commands::Query(args) => bdf_cli::commands::query::run(args).await,
        Commands::Sources => bdf_cli::commands::sources::run(),
        Commands::IdTypes => bdf_cli::commands::id_types::run(),
    }
}
