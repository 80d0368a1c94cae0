//! Search engine client (Elasticsearch REST API)

use crate::config::SearchEngineConfig;
use crate::error::{BlogScoutError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;

/// Search engine operations used by the executor
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Run one `_search` request and return the native response
    async fn search(&self, index: &str, body: &Value) -> Result<Value>;

    /// Dry-run a bare query clause
    async fn validate_query(&self, index: Option<&str>, query: &Value) -> Result<bool>;

    /// Run several searches in one round trip. Each response item is the
    /// native response or an object with an `error` key.
    async fn msearch(&self, searches: &[(String, Value)]) -> Result<Vec<Value>>;

    /// Index definitions (mappings, settings) for every index matching `pattern`
    async fn get_indices(&self, pattern: &str) -> Result<Map<String, Value>>;

    /// Document count of an index
    async fn count(&self, index: &str) -> Result<u64>;

    /// Whether the cluster answers at all
    async fn ping(&self) -> bool;
}

/// Elasticsearch client over the REST API
pub struct ElasticsearchClient {
    http_client: reqwest::Client,
    config: SearchEngineConfig,
}

impl ElasticsearchClient {
    pub fn new(config: SearchEngineConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(BlogScoutError::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(SearchEngineConfig::default())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let req = self
            .http_client
            .request(method, self.url(path))
            .header("Accept", "application/json");

        if let Some(ref api_key) = self.config.api_key {
            req.header("Authorization", format!("ApiKey {}", api_key))
        } else if let Some(ref username) = self.config.username {
            req.basic_auth(username, self.config.password.as_deref())
        } else {
            req
        }
    }

    /// Send and decode, classifying failures for `index`
    async fn send(&self, req: reqwest::RequestBuilder, index: &str) -> Result<Value> {
        let response = req
            .send()
            .await
            .map_err(|e| BlogScoutError::EngineUnavailable(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| BlogScoutError::EngineUnavailable(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(classify_engine_error(status, &text, index));
        }

        serde_json::from_str(&text)
            .map_err(|e| BlogScoutError::EngineUnavailable(format!("unreadable response: {}", e)))
    }
}

/// Map a failed engine response to an error kind.
///
/// 400 is a rejected query, 404 with `index_not_found_exception` a missing
/// collection, anything else an engine fault.
pub fn classify_engine_error(status: u16, body: &str, index: &str) -> BlogScoutError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let error_type = parsed["error"]["type"].as_str().unwrap_or_default();
    let reason = parsed["error"]["root_cause"][0]["reason"]
        .as_str()
        .or_else(|| parsed["error"]["reason"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.chars().take(200).collect());

    match status {
        400 => BlogScoutError::InvalidQuery(reason),
        404 if error_type == "index_not_found_exception" || error_type.is_empty() => {
            BlogScoutError::CollectionNotFound(format!("Index '{}' not found", index))
        }
        _ => BlogScoutError::EngineUnavailable(format!("HTTP {}: {}", status, reason)),
    }
}

#[async_trait]
impl SearchEngine for ElasticsearchClient {
    async fn search(&self, index: &str, body: &Value) -> Result<Value> {
        let req = self
            .request(reqwest::Method::POST, &format!("{}/_search", index))
            .json(body);
        self.send(req, index).await
    }

    async fn validate_query(&self, index: Option<&str>, query: &Value) -> Result<bool> {
        let path = match index {
            Some(index) => format!("{}/_validate/query?explain=true", index),
            None => "_validate/query?explain=true".to_string(),
        };
        let body = serde_json::json!({ "query": query });
        let req = self.request(reqwest::Method::POST, &path).json(&body);
        let resp = self.send(req, index.unwrap_or("_all")).await?;

        if let Some(explanations) = resp["explanations"].as_array() {
            for e in explanations.iter().filter(|e| e["valid"] == false) {
                tracing::debug!("Query rejected: {}", e["error"]);
            }
        }
        Ok(resp["valid"].as_bool().unwrap_or(false))
    }

    async fn msearch(&self, searches: &[(String, Value)]) -> Result<Vec<Value>> {
        let mut payload = String::new();
        for (index, body) in searches {
            payload.push_str(&serde_json::json!({ "index": index }).to_string());
            payload.push('\n');
            payload.push_str(&body.to_string());
            payload.push('\n');
        }

        let req = self
            .request(reqwest::Method::POST, "_msearch")
            .header("Content-Type", "application/x-ndjson")
            .body(payload);
        let resp = self.send(req, "_msearch").await?;

        Ok(resp["responses"].as_array().cloned().unwrap_or_default())
    }

    async fn get_indices(&self, pattern: &str) -> Result<Map<String, Value>> {
        let req = self.request(reqwest::Method::GET, pattern);
        let resp = self.send(req, pattern).await?;
        Ok(resp.as_object().cloned().unwrap_or_default())
    }

    async fn count(&self, index: &str) -> Result<u64> {
        let req = self.request(reqwest::Method::GET, &format!("{}/_count", index));
        let resp = self.send(req, index).await?;
        Ok(resp["count"].as_u64().unwrap_or(0))
    }

    async fn ping(&self) -> bool {
        match self.request(reqwest::Method::HEAD, "").send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::warn!("Search engine ping failed: {}", e);
                false
            }
        }
    }
}
