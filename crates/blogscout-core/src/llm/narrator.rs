//! Prose summaries of search results

use super::client::{complete, CompletionMode, LLMClient};
use super::prompts::{build_narration_prompt, messages, NARRATION_SYSTEM_PROMPT};
use crate::error::Result;
use crate::search::SearchResponse;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::Instrument;

/// Result documents included in the narration prompt
pub const MAX_NARRATED_RESULTS: usize = 5;
/// Character cap for string fields
pub const MAX_STRING_CHARS: usize = 200;
/// Character cap for each string in a list, and for stringified values
pub const MAX_LIST_ITEM_CHARS: usize = 100;
/// Items kept from a list of strings
pub const MAX_LIST_ITEMS: usize = 10;

/// Bound a value's size for prompt inclusion.
///
/// Strings are cut to [`MAX_STRING_CHARS`]; lists of strings keep
/// [`MAX_LIST_ITEMS`] items of at most [`MAX_LIST_ITEM_CHARS`]; any other
/// list or nested object is stringified and cut to [`MAX_LIST_ITEM_CHARS`].
pub fn truncate_for_prompt(value: &Value) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
        Value::String(s) => Value::String(truncate_chars(s, MAX_STRING_CHARS)),
        Value::Array(items) if items.iter().all(Value::is_string) => Value::Array(
            items
                .iter()
                .take(MAX_LIST_ITEMS)
                .filter_map(Value::as_str)
                .map(|s| Value::String(truncate_chars(s, MAX_LIST_ITEM_CHARS)))
                .collect(),
        ),
        Value::Array(_) | Value::Object(_) => {
            Value::String(truncate_chars(&value.to_string(), MAX_LIST_ITEM_CHARS))
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Remove wrapping quotes and literal escape artifacts from model prose.
/// Already-clean text comes back unchanged.
pub fn clean_narration(text: &str) -> String {
    let mut text = text.trim();

    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            text = &text[1..text.len() - 1];
            break;
        }
    }

    text.replace("\"\"", "\"")
        .replace("''", "'")
        .replace("\\\"", "\"")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}

/// Writes the analysis text returned with search results
pub struct ResultNarrator {
    client: Arc<dyn LLMClient>,
    span: tracing::Span,
}

impl ResultNarrator {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client,
            span: tracing::info_span!("result_narrator"),
        }
    }

    /// Narrate `response` for `query`. Never fails: with no hits this is
    /// the fixed no-results message (no model call); on any fault a
    /// fallback reporting the hit count.
    pub async fn narrate(&self, query: &str, response: &SearchResponse) -> String {
        if response.total_hits == 0 {
            return messages::NO_RESULTS.to_string();
        }

        match self
            .try_narrate(query, response)
            .instrument(self.span.clone())
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::error!("Result narration failed: {}", e);
                let reason: String = e.to_string().chars().take(100).collect();
                format!(
                    "Found {} results for your query. LLM analysis unavailable due to processing error: {}",
                    response.total_hits, reason
                )
            }
        }
    }

    async fn try_narrate(&self, query: &str, response: &SearchResponse) -> Result<String> {
        let sample: Vec<Value> = response
            .results
            .iter()
            .take(MAX_NARRATED_RESULTS)
            .map(|hit| Value::Object(truncate_document(&hit.source)))
            .collect();
        let results_json = serde_json::to_string_pretty(&sample)?;
        tracing::debug!("Narrating {} of {} results", sample.len(), response.total_hits);

        let prompt = build_narration_prompt(query, &results_json, response.total_hits);
        let raw = complete(
            self.client.as_ref(),
            NARRATION_SYSTEM_PROMPT,
            &prompt,
            CompletionMode::Free,
        )
        .await?;

        Ok(clean_narration(&raw))
    }
}

/// Truncated copy of one document, as sent to the model
pub fn truncate_document(doc: &Map<String, Value>) -> Map<String, Value> {
    doc.iter()
        .map(|(k, v)| (k.clone(), truncate_for_prompt(v)))
        .collect()
}
