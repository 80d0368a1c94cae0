//! JSON output formatter

use blogscout_core::NaturalSearchResponse;

pub fn format_response(response: &NaturalSearchResponse) -> String {
    serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string()) + "\n"
}
