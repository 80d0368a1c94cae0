//! Index listing and health commands

use crate::app::OutputFormat;
use anyhow::Result;
use blogscout_core::SearchPipeline;

pub async fn run_indices(pipeline: &SearchPipeline, format: OutputFormat) -> Result<()> {
    let indices = pipeline.collections_info().await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&indices)?);
        }
        OutputFormat::Md => {
            println!("| Index | Documents |");
            println!("|-------|-----------|");
            for (name, info) in &indices {
                println!("| {} | {} |", name, info.document_count);
            }
        }
        OutputFormat::Cli => {
            if indices.is_empty() {
                println!("No indices found.");
            }
            for (name, info) in &indices {
                println!("{:<24} {:>10} docs", name, info.document_count);
            }
        }
    }
    Ok(())
}

pub async fn run_health(pipeline: &SearchPipeline, format: OutputFormat) -> Result<()> {
    let report = pipeline.health().await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("Status:          {}", report.status);
            println!();
            println!("Services:");
            println!("  Elasticsearch: {}", up_down(report.services.elasticsearch));
            println!("  LLM:           {}", up_down(report.services.llm));
            if !report.indices.is_empty() {
                println!();
                println!("Indices:");
                for (name, info) in &report.indices {
                    println!("  {:<22} {}", name, info.document_count);
                }
            }
        }
    }
    Ok(())
}

fn up_down(up: bool) -> &'static str {
    if up {
        "up"
    } else {
        "down"
    }
}
