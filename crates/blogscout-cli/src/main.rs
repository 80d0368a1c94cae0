//! BlogScout CLI
//!
//! Ask questions about a blog index in plain language.

use anyhow::Result;
use blogscout_core::error::exit_codes;
use blogscout_core::{BlogScoutError, Config, SearchPipeline};
use clap::Parser;

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    // stdout carries results (and JSON-RPC in mcp mode)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        let code = e
            .downcast_ref::<BlogScoutError>()
            .map(BlogScoutError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        eprintln!("Error: {:#}", e);
        std::process::exit(code);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Ask(args) => commands::ask::run(args, &pipeline(&config)?, cli.format).await,
        Commands::Query(args) => commands::query::run(args, &pipeline(&config)?, cli.format).await,
        Commands::Validate(args) => {
            commands::query::run_validate(args, &pipeline(&config)?, cli.format).await
        }
        Commands::Indices => commands::status::run_indices(&pipeline(&config)?, cli.format).await,
        Commands::Health => commands::status::run_health(&pipeline(&config)?, cli.format).await,
        Commands::Schema(args) => commands::schema::run(args, &config, cli.format),
        Commands::Examples => commands::schema::run_examples(cli.format),
        Commands::Mcp => blogscout_mcp::start_server(pipeline(&config)?).await,
    }
}

fn pipeline(config: &Config) -> Result<SearchPipeline> {
    Ok(SearchPipeline::from_config(config)?)
}
