//! Raw query and validation commands

use super::read_body;
use crate::app::{OutputFormat, QueryArgs, ValidateArgs};
use crate::output::format_search_response;
use anyhow::Result;
use blogscout_core::SearchPipeline;

pub async fn run(args: QueryArgs, pipeline: &SearchPipeline, format: OutputFormat) -> Result<()> {
    let body = read_body(&args.body)?;
    let response = pipeline.raw_search(&args.index, &body, args.size).await?;

    print!("{}", format_search_response(&response, format));
    Ok(())
}

pub async fn run_validate(
    args: ValidateArgs,
    pipeline: &SearchPipeline,
    format: OutputFormat,
) -> Result<()> {
    let body = read_body(&args.body)?;
    let valid = pipeline.validate(args.index.as_deref(), &body).await;

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({ "valid": valid, "index": args.index });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ => {
            if valid {
                println!("Query is valid");
            } else {
                println!("Query is NOT valid");
            }
        }
    }
    Ok(())
}
