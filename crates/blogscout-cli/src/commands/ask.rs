//! Natural-language search command

use crate::app::{AskArgs, OutputFormat};
use crate::output::format_search_response;
use anyhow::Result;
use blogscout_core::SearchPipeline;

pub async fn run(args: AskArgs, pipeline: &SearchPipeline, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    let response = pipeline.natural_search(&query, args.size).await?;

    print!("{}", format_search_response(&response, format));
    Ok(())
}
