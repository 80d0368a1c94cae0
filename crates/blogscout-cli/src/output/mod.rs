//! Output formatters

pub mod json;
pub mod markdown;
pub mod terminal;

use crate::app::OutputFormat;
use blogscout_core::NaturalSearchResponse;

/// Format a search envelope
pub fn format_search_response(response: &NaturalSearchResponse, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_response(response),
        OutputFormat::Md => markdown::format_response(response),
        OutputFormat::Cli => terminal::format_response(response),
    }
}
