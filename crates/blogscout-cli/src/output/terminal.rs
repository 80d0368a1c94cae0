//! Terminal output formatter

use blogscout_core::NaturalSearchResponse;

pub fn format_response(response: &NaturalSearchResponse) -> String {
    let mut output = String::new();

    if let Some(ref error) = response.error {
        output.push_str(&format!("Error: {}\n", error));
        return output;
    }

    if let Some(ref analysis) = response.analysis {
        output.push_str(analysis);
        output.push_str("\n\n");
    }

    output.push_str(&format!("{} total hits\n", response.total_hits));
    for (i, hit) in response.results.iter().enumerate() {
        let title = hit.title().unwrap_or("(untitled)");
        let score = hit
            .meta
            .score
            .map(|s| format!("{:>6.2}", s))
            .unwrap_or_else(|| "     -".to_string());
        output.push_str(&format!(
            "{:>3}. {} {} #{}\n",
            i + 1,
            score,
            title,
            hit.meta.id.as_deref().unwrap_or("?")
        ));
    }

    output
}
