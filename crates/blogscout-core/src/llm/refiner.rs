//! Free text to structured search request

use super::client::{complete, CompletionMode, LLMClient};
use super::extract::extract_json_object;
use super::prompts::{build_refinement_prompt, REFINEMENT_SYSTEM_PROMPT};
use crate::error::Result;
use crate::schema::SchemaDigest;
use crate::search::StructuredSearchRequest;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::Instrument;

/// Outcome of refining one query
#[derive(Debug, Clone, PartialEq)]
pub enum Refinement {
    /// The structured-output call returned a usable object
    Structured(StructuredSearchRequest),
    /// The free-text fallback contained a usable object
    Extracted(StructuredSearchRequest),
    /// Neither attempt produced a usable request
    Unresolvable(String),
}

/// Which stage of refinement produced the outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementStage {
    Structured,
    Extracted,
    Unresolvable,
}

impl Refinement {
    pub fn stage(&self) -> RefinementStage {
        match self {
            Self::Structured(_) => RefinementStage::Structured,
            Self::Extracted(_) => RefinementStage::Extracted,
            Self::Unresolvable(_) => RefinementStage::Unresolvable,
        }
    }

    pub fn request(&self) -> Option<&StructuredSearchRequest> {
        match self {
            Self::Structured(req) | Self::Extracted(req) => Some(req),
            Self::Unresolvable(_) => None,
        }
    }

    pub fn into_request(self) -> Option<StructuredSearchRequest> {
        match self {
            Self::Structured(req) | Self::Extracted(req) => Some(req),
            Self::Unresolvable(_) => None,
        }
    }
}

/// Turns natural-language queries into structured search requests
pub struct QueryRefiner {
    client: Arc<dyn LLMClient>,
    schema: Arc<SchemaDigest>,
    span: tracing::Span,
}

impl QueryRefiner {
    pub fn new(client: Arc<dyn LLMClient>, schema: Arc<SchemaDigest>) -> Self {
        Self {
            client,
            schema,
            span: tracing::info_span!("query_refiner"),
        }
    }

    /// Refine `query`: one structured-mode call, then at most one free-mode
    /// call whose text goes through JSON extraction. Never fails.
    pub async fn refine(&self, query: &str) -> Refinement {
        self.run(query.trim()).instrument(self.span.clone()).await
    }

    async fn run(&self, query: &str) -> Refinement {
        if query.is_empty() {
            return Refinement::Unresolvable("query is empty".to_string());
        }

        tracing::info!("Refining query: '{}'", query);
        let prompt = build_refinement_prompt(
            &self.schema.render_all(),
            &self.schema.render_time_fields(),
            query,
        );

        match complete(
            self.client.as_ref(),
            REFINEMENT_SYSTEM_PROMPT,
            &prompt,
            CompletionMode::Structured,
        )
        .await
        {
            Ok(raw) => match serde_json::from_str::<Value>(raw.trim()) {
                Ok(Value::Object(obj)) => match self.accept(obj) {
                    Ok(request) => {
                        tracing::info!("Query refined (structured): {}", request.target_collection);
                        return Refinement::Structured(request);
                    }
                    Err(e) => tracing::info!("Structured output unusable: {}", e),
                },
                _ => tracing::info!("Structured output was not a JSON object, falling back"),
            },
            Err(e) => tracing::info!("Structured call failed: {}. Falling back to text", e),
        }

        let raw = match complete(
            self.client.as_ref(),
            REFINEMENT_SYSTEM_PROMPT,
            &prompt,
            CompletionMode::Free,
        )
        .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("LLM call failed: {}", e);
                return Refinement::Unresolvable(e.to_string());
            }
        };

        let Some(obj) = extract_json_object(&raw) else {
            tracing::warn!("No JSON object in completion");
            return Refinement::Unresolvable("no JSON object in completion".to_string());
        };

        match self.accept(obj) {
            Ok(request) => {
                tracing::info!("Query refined (extracted): {}", request.target_collection);
                Refinement::Extracted(request)
            }
            Err(e) => {
                tracing::warn!("Extracted request unusable: {}", e);
                Refinement::Unresolvable(e.to_string())
            }
        }
    }

    fn accept(&self, obj: Map<String, Value>) -> Result<StructuredSearchRequest> {
        let mut request = StructuredSearchRequest::from_object(obj)?;
        let dropped = request.apply_sort_guard(self.schema.get(request.target_collection));
        if !dropped.is_empty() {
            tracing::warn!("Dropped sort on non-sortable fields: {:?}", dropped);
        }
        Ok(request)
    }
}
