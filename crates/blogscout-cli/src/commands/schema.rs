//! Field cheatsheet and example query commands

use crate::app::{OutputFormat, SchemaArgs};
use anyhow::Result;
use blogscout_core::{Collection, Config, SchemaDigest, EXAMPLE_QUERIES};
use std::collections::BTreeMap;

pub fn run(args: SchemaArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let schema = SchemaDigest::load(&config.mappings_dir);
    let collections: Vec<Collection> = match args.collection {
        Some(c) => vec![c],
        None => Collection::ALL.to_vec(),
    };

    match format {
        OutputFormat::Json => {
            let fields: BTreeMap<&str, _> = collections
                .iter()
                .map(|c| (c.index_name(), schema.get(*c).fields()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
        OutputFormat::Md => {
            for c in &collections {
                println!("## {}\n", c);
                println!("| Field | Type |");
                println!("|-------|------|");
                for (field, ty) in schema.get(*c).fields() {
                    println!("| `{}` | {} |", field, ty);
                }
                println!();
            }
        }
        OutputFormat::Cli => {
            for c in &collections {
                println!("{}", schema.render(*c));
            }
        }
    }
    Ok(())
}

pub fn run_examples(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let map: BTreeMap<&str, &[&str]> = EXAMPLE_QUERIES.iter().copied().collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        _ => {
            for (category, queries) in EXAMPLE_QUERIES {
                println!("{}:", category);
                for q in *queries {
                    println!("  {}", q);
                }
                println!();
            }
        }
    }
    Ok(())
}
