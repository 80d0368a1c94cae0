//! In-test collaborators for the search pipeline

#![allow(dead_code)]

use async_trait::async_trait;
use blogscout_core::{
    BlogScoutError, ChatMessage, Collection, CompletionMode, FieldMap, LLMClient, Result,
    SchemaDigest, SearchEngine,
};
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Scripted completion backend that records every call
#[derive(Default)]
pub struct MockLLM {
    replies: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<(Vec<ChatMessage>, CompletionMode)>>,
}

impl MockLLM {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(self: &Arc<Self>, text: &str) -> Arc<Self> {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
        Arc::clone(self)
    }

    pub fn fail(self: &Arc<Self>, reason: &str) -> Arc<Self> {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(BlogScoutError::BackendUnavailable(reason.to_string())));
        Arc::clone(self)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn modes(&self) -> Vec<CompletionMode> {
        self.calls.lock().unwrap().iter().map(|(_, m)| *m).collect()
    }

    /// User message of the n-th call
    pub fn prompt(&self, n: usize) -> String {
        self.calls.lock().unwrap()[n]
            .0
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LLMClient for MockLLM {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        mode: CompletionMode,
    ) -> Result<String> {
        self.calls.lock().unwrap().push((messages, mode));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BlogScoutError::BackendUnavailable("no scripted reply".into())))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// Search engine returning one canned response and recording requests
pub struct MockEngine {
    response: Mutex<Result<Value>>,
    valid: bool,
    up: bool,
    msearch_responses: Option<Vec<Value>>,
    searches: Mutex<Vec<(String, Value)>>,
    validations: Mutex<Vec<Value>>,
}

impl MockEngine {
    pub fn with_response(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Ok(response)),
            valid: true,
            up: true,
            msearch_responses: None,
            searches: Mutex::new(Vec::new()),
            validations: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: BlogScoutError) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Err(error)),
            valid: true,
            up: false,
            msearch_responses: None,
            searches: Mutex::new(Vec::new()),
            validations: Mutex::new(Vec::new()),
        })
    }

    pub fn rejecting_validation(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Ok(response)),
            valid: false,
            up: true,
            msearch_responses: None,
            searches: Mutex::new(Vec::new()),
            validations: Mutex::new(Vec::new()),
        })
    }

    /// Engine whose multi-search answers with `responses` in order
    pub fn with_msearch(responses: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Ok(json!({}))),
            valid: true,
            up: true,
            msearch_responses: Some(responses),
            searches: Mutex::new(Vec::new()),
            validations: Mutex::new(Vec::new()),
        })
    }

    pub fn searches(&self) -> Vec<(String, Value)> {
        self.searches.lock().unwrap().clone()
    }

    pub fn validations(&self) -> Vec<Value> {
        self.validations.lock().unwrap().clone()
    }
}

fn clone_result(result: &Result<Value>) -> Result<Value> {
    match result {
        Ok(v) => Ok(v.clone()),
        Err(BlogScoutError::InvalidQuery(m)) => Err(BlogScoutError::InvalidQuery(m.clone())),
        Err(BlogScoutError::CollectionNotFound(m)) => {
            Err(BlogScoutError::CollectionNotFound(m.clone()))
        }
        Err(e) => Err(BlogScoutError::EngineUnavailable(e.to_string())),
    }
}

#[async_trait]
impl SearchEngine for MockEngine {
    async fn search(&self, index: &str, body: &Value) -> Result<Value> {
        self.searches
            .lock()
            .unwrap()
            .push((index.to_string(), body.clone()));
        clone_result(&self.response.lock().unwrap())
    }

    async fn validate_query(&self, _index: Option<&str>, query: &Value) -> Result<bool> {
        self.validations.lock().unwrap().push(query.clone());
        if !self.up {
            return clone_result(&self.response.lock().unwrap()).map(|_| false);
        }
        Ok(self.valid)
    }

    async fn msearch(&self, searches: &[(String, Value)]) -> Result<Vec<Value>> {
        if let Some(responses) = &self.msearch_responses {
            self.searches.lock().unwrap().extend(searches.iter().cloned());
            return Ok(responses.clone());
        }
        let mut out = Vec::new();
        for (index, body) in searches {
            out.push(self.search(index, body).await?);
        }
        Ok(out)
    }

    async fn get_indices(&self, _pattern: &str) -> Result<Map<String, Value>> {
        if !self.up {
            return Err(BlogScoutError::EngineUnavailable("down".into()));
        }
        Ok(json!({
            "blog-articles": {"mappings": {"properties": {"title": {"type": "text"}}}, "settings": {}},
            "blog-users": {"mappings": {}, "settings": {}}
        })
        .as_object()
        .cloned()
        .unwrap_or_default())
    }

    async fn count(&self, index: &str) -> Result<u64> {
        Ok(if index == "blog-articles" { 120 } else { 30 })
    }

    async fn ping(&self) -> bool {
        self.up
    }
}

/// Engine response with the given titles and total
pub fn engine_response(total: u64, titles: &[&str]) -> Value {
    let hits: Vec<Value> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            json!({
                "_index": "blog-articles",
                "_id": format!("a{}", i + 1),
                "_score": 2.0 - i as f64 * 0.5,
                "_source": {"title": title, "likes": 100 - i as u64 * 10, "tags": ["python"]}
            })
        })
        .collect();

    json!({
        "took": 3,
        "timed_out": false,
        "hits": {"total": {"value": total, "relation": "eq"}, "max_score": 2.0, "hits": hits}
    })
}

pub fn schema() -> Arc<SchemaDigest> {
    Arc::new(
        SchemaDigest::default()
            .with_collection(
                Collection::Articles,
                FieldMap::from_mapping(&json!({"mappings": {"properties": {
                    "title": {"type": "text"},
                    "tags": {"type": "keyword"},
                    "likes": {"type": "long"},
                    "created_at": {"type": "date"}
                }}})),
            )
            .with_collection(
                Collection::Users,
                FieldMap::from_mapping(&json!({"mappings": {"properties": {
                    "full_name": {"type": "text"},
                    "followers": {"type": "long"}
                }}})),
            ),
    )
}
