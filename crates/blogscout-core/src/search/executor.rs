//! Search execution: safe defaults, engine call, response normalization

use super::engine::SearchEngine;
use super::request::StructuredSearchRequest;
use super::response::SearchResponse;
use crate::error::{BlogScoutError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::Instrument;

/// One entry of a multi-search
#[derive(Debug, Clone)]
pub struct MultiSearchItem {
    pub index: String,
    pub body: Map<String, Value>,
    pub size: usize,
}

/// Per-item outcome of a multi-search
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MultiSearchOutcome {
    Ok(SearchResponse),
    Err { error: Value },
}

/// Document count and definition of one index
#[derive(Debug, Clone, Serialize)]
pub struct CollectionInfo {
    pub document_count: u64,
    pub mappings: Value,
    pub settings: Value,
}

/// Executes structured requests against the search engine
pub struct SearchExecutor {
    engine: Arc<dyn SearchEngine>,
    span: tracing::Span,
}

impl SearchExecutor {
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self {
            engine,
            span: tracing::info_span!("search_executor"),
        }
    }

    /// Effective body: caller's keys kept, `track_total_hits` defaulted to
    /// true, and `size` taken from the body when present, else `requested_size`
    pub fn effective_body(body: &Map<String, Value>, requested_size: usize) -> Map<String, Value> {
        let mut effective = body.clone();
        effective
            .entry("track_total_hits")
            .or_insert(Value::Bool(true));
        effective
            .entry("size")
            .or_insert_with(|| Value::from(requested_size));
        effective
    }

    /// Search one index with a raw body
    pub async fn search(
        &self,
        index: &str,
        body: &Map<String, Value>,
        requested_size: usize,
    ) -> Result<SearchResponse> {
        self.run_search(index, body, requested_size)
            .instrument(self.span.clone())
            .await
    }

    async fn run_search(
        &self,
        index: &str,
        body: &Map<String, Value>,
        requested_size: usize,
    ) -> Result<SearchResponse> {
        let effective = Self::effective_body(body, requested_size);
        tracing::debug!(
            index,
            size = %effective["size"],
            keys = ?effective.keys().collect::<Vec<_>>(),
            "Executing search"
        );

        let raw = self
            .engine
            .search(index, &Value::Object(effective))
            .await
            .map_err(|e| {
                tracing::warn!("Search on {} failed: {}", index, e);
                e
            })?;

        let response = SearchResponse::from_engine(&raw);
        tracing::info!(
            "Total hits: {} | Returned: {} | Max score: {:?}",
            response.total_hits,
            response.results.len(),
            response.max_score
        );
        Ok(response)
    }

    /// Search with a refined request; its body never carries pagination
    pub async fn search_request(
        &self,
        request: &StructuredSearchRequest,
        requested_size: usize,
    ) -> Result<SearchResponse> {
        self.search(
            request.target_collection.index_name(),
            &request.to_body(),
            requested_size,
        )
        .await
    }

    /// Dry-run the query clause of `body` (or `body` itself when it has no
    /// `query` key). Any fault counts as invalid.
    pub async fn validate(&self, index: Option<&str>, body: &Map<String, Value>) -> bool {
        match self.try_validate(index, body).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!("Query validation failed: {}", e);
                false
            }
        }
    }

    /// Like [`validate`](Self::validate), but engine faults are returned
    /// instead of being read as an invalid query
    pub async fn try_validate(&self, index: Option<&str>, body: &Map<String, Value>) -> Result<bool> {
        let query = body
            .get("query")
            .cloned()
            .unwrap_or_else(|| Value::Object(body.clone()));

        self.engine
            .validate_query(index, &query)
            .instrument(self.span.clone())
            .await
    }

    /// Several searches in one engine round trip
    pub async fn multi_search(&self, items: &[MultiSearchItem]) -> Result<Vec<MultiSearchOutcome>> {
        let searches: Vec<(String, Value)> = items
            .iter()
            .map(|item| {
                (
                    item.index.clone(),
                    Value::Object(Self::effective_body(&item.body, item.size)),
                )
            })
            .collect();

        let responses = self
            .engine
            .msearch(&searches)
            .instrument(self.span.clone())
            .await
            .map_err(|e| match e {
                BlogScoutError::InvalidQuery(_) | BlogScoutError::CollectionNotFound(_) => e,
                other => BlogScoutError::EngineUnavailable(format!("Multi-search failed: {}", other)),
            })?;

        Ok(responses
            .iter()
            .map(|r| match r.get("error") {
                Some(error) => MultiSearchOutcome::Err {
                    error: error.clone(),
                },
                None => MultiSearchOutcome::Ok(SearchResponse::from_engine(r)),
            })
            .collect())
    }

    /// Count, mappings and settings for every index matching `pattern`.
    /// Failures yield an empty map.
    pub async fn collections_info(&self, pattern: &str) -> BTreeMap<String, CollectionInfo> {
        async {
            let indices = match self.engine.get_indices(pattern).await {
                Ok(indices) => indices,
                Err(e) => {
                    tracing::error!("Failed to get indices info: {}", e);
                    return BTreeMap::new();
                }
            };

            let mut info = BTreeMap::new();
            for (name, definition) in indices {
                let document_count = match self.engine.count(&name).await {
                    Ok(count) => count,
                    Err(e) => {
                        tracing::error!("Failed to count {}: {}", name, e);
                        return BTreeMap::new();
                    }
                };
                info.insert(
                    name,
                    CollectionInfo {
                        document_count,
                        mappings: definition.get("mappings").cloned().unwrap_or_default(),
                        settings: definition.get("settings").cloned().unwrap_or_default(),
                    },
                );
            }
            info
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn ping(&self) -> bool {
        self.engine.ping().await
    }
}
