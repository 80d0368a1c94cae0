//! Markdown output formatter

use blogscout_core::NaturalSearchResponse;

pub fn format_response(response: &NaturalSearchResponse) -> String {
    let mut output = format!("# Search: {}\n\n", response.query);

    if let Some(ref error) = response.error {
        output.push_str(&format!("> **Error**: {}\n", error));
        return output;
    }

    if let Some(ref analysis) = response.analysis {
        output.push_str(analysis);
        output.push_str("\n\n");
    }

    output.push_str(&format!("**Total hits**: {}\n\n", response.total_hits));

    for (i, hit) in response.results.iter().enumerate() {
        output.push_str(&format!(
            "## {}. {}\n\n",
            i + 1,
            hit.title().unwrap_or("(untitled)")
        ));
        if let Some(score) = hit.meta.score {
            output.push_str(&format!("- **Score**: {:.2}\n", score));
        }
        if let Some(ref index) = hit.meta.index {
            output.push_str(&format!("- **Index**: {}\n", index));
        }
        if let Some(ref id) = hit.meta.id {
            output.push_str(&format!("- **ID**: `{}`\n", id));
        }
        output.push_str("\n---\n\n");
    }

    if response.results.is_empty() {
        output.push_str("*No results found*\n");
    }

    output
}
