//! CLI argument definitions

use blogscout_core::Collection;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blogscout")]
#[command(
    author,
    version,
    about = "Ask questions about a blog index in plain language"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: <config dir>/blogscout/config.yml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Natural-language search with analysis
    Ask(AskArgs),

    /// Run an Elasticsearch request body directly
    Query(QueryArgs),

    /// Check a query without running it
    Validate(ValidateArgs),

    /// Show blog indices with document counts
    Indices,

    /// Check search engine and LLM connectivity
    Health,

    /// Show the field cheatsheet given to the model
    Schema(SchemaArgs),

    /// List example questions
    Examples,

    /// Start MCP server
    Mcp,
}

#[derive(Args)]
pub struct AskArgs {
    /// Question in plain language
    pub query: Vec<String>,

    /// Number of results
    #[arg(short = 'n', long)]
    pub size: Option<usize>,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Index to search
    #[arg(short, long)]
    pub index: String,

    /// Number of results (a "size" in the body takes precedence)
    #[arg(short = 'n', long)]
    pub size: Option<usize>,

    /// Request body as JSON, or @path to read it from a file
    pub body: String,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Index to validate against
    #[arg(short, long)]
    pub index: Option<String>,

    /// Query (or request body) as JSON, or @path
    pub body: String,
}

#[derive(Args)]
pub struct SchemaArgs {
    /// Only this collection
    #[arg(short, long)]
    pub collection: Option<Collection>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
    Md,
}
