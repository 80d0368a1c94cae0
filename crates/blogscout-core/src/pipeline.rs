//! Natural-language search: refine, execute, narrate

use crate::config::Config;
use crate::error::{BlogScoutError, ErrorKind, Result};
use crate::llm::prompts::messages;
use crate::llm::{
    ChatMessage, CompletionMode, LLMClient, OpenAIClient, QueryRefiner, Refinement,
    RefinementStage, ResultNarrator,
};
use crate::schema::SchemaDigest;
use crate::search::{CollectionInfo, ElasticsearchClient, SearchEngine, SearchExecutor, SearchHit};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Sample queries by category
pub const EXAMPLE_QUERIES: &[(&str, &[&str])] = &[
    (
        "user_queries",
        &[
            "Find active users with high social influence",
            "List users with the most followers",
            "Top users by followers active this year",
        ],
    ),
    (
        "article_queries",
        &[
            "Find popular articles about python",
            "Show me recent articles with high engagement",
            "Articles by John with more than 50 likes",
            "Return one freshest article per author about dense retrieval",
        ],
    ),
    (
        "mixed_queries",
        &[
            "What are the most popular topics in our blog?",
            "Which authors write the most engaging content?",
        ],
    ),
];

/// Envelope returned by natural and raw search
#[derive(Debug, Clone, Serialize)]
pub struct NaturalSearchResponse {
    pub success: bool,
    pub query: String,
    pub total_hits: u64,
    pub max_score: Option<f64>,
    pub results: Vec<SearchHit>,
    pub analysis: Option<String>,
    /// Request body actually searched with
    pub search_request: Option<Value>,
    /// Which refinement stage produced the request (natural search only)
    pub refinement: Option<RefinementStage>,
    pub error: Option<String>,
    /// Status of the fault behind a failed response: 422 when the query
    /// could not be refined, 400 when the engine rejected it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl NaturalSearchResponse {
    fn failed(
        query: &str,
        cause: &BlogScoutError,
        message: impl Into<String>,
        refinement: Option<RefinementStage>,
    ) -> Self {
        Self {
            success: false,
            query: query.to_string(),
            total_hits: 0,
            max_score: None,
            results: Vec::new(),
            analysis: None,
            search_request: None,
            refinement,
            error: Some(message.into()),
            status: Some(cause.status_code()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ServiceHealth {
    pub elasticsearch: bool,
    pub llm: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `healthy` when every service answers, otherwise `degraded`
    pub status: String,
    pub services: ServiceHealth,
    pub indices: BTreeMap<String, CollectionInfo>,
}

/// Sequences refiner, executor and narrator for one request at a time.
/// Shared state is read-only, so one pipeline serves concurrent requests.
pub struct SearchPipeline {
    client: Arc<dyn LLMClient>,
    schema: Arc<SchemaDigest>,
    refiner: QueryRefiner,
    executor: SearchExecutor,
    narrator: ResultNarrator,
    index_pattern: String,
    default_page_size: usize,
}

impl SearchPipeline {
    pub fn new(
        client: Arc<dyn LLMClient>,
        engine: Arc<dyn SearchEngine>,
        schema: Arc<SchemaDigest>,
    ) -> Self {
        Self {
            refiner: QueryRefiner::new(Arc::clone(&client), Arc::clone(&schema)),
            narrator: ResultNarrator::new(Arc::clone(&client)),
            executor: SearchExecutor::new(engine),
            client,
            schema,
            index_pattern: "blog-*".to_string(),
            default_page_size: 10,
        }
    }

    /// Build clients and load mappings from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(OpenAIClient::new(config.llm_service.clone())?);
        let engine = Arc::new(ElasticsearchClient::new(config.search_engine.clone())?);
        let schema = Arc::new(SchemaDigest::load(&config.mappings_dir));

        Ok(Self::new(client, engine, schema)
            .with_index_pattern(config.search_engine.index_pattern.clone())
            .with_default_page_size(config.default_page_size))
    }

    pub fn with_index_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.index_pattern = pattern.into();
        self
    }

    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    pub fn schema(&self) -> &SchemaDigest {
        &self.schema
    }

    pub fn executor(&self) -> &SearchExecutor {
        &self.executor
    }

    /// Refine `query`, search, and narrate the results.
    ///
    /// Query-understanding faults come back as `Ok` with `success == false`;
    /// search-engine faults are returned as errors.
    pub async fn natural_search(
        &self,
        query: &str,
        size: Option<usize>,
    ) -> Result<NaturalSearchResponse> {
        let size = size.unwrap_or(self.default_page_size);
        let refinement = self.refiner.refine(query).await;
        let stage = refinement.stage();

        let request = match refinement {
            Refinement::Structured(req) | Refinement::Extracted(req) => req,
            Refinement::Unresolvable(reason) => {
                let cause = BlogScoutError::RefinementUnresolvable(reason);
                tracing::warn!("{}", cause);
                return Ok(NaturalSearchResponse::failed(
                    query,
                    &cause,
                    messages::QUERY_REFINEMENT_FAILED,
                    Some(stage),
                ));
            }
        };

        let response = match self.executor.search_request(&request, size).await {
            Ok(response) => response,
            Err(e) if e.kind() == ErrorKind::QueryUnderstanding => {
                tracing::warn!("Refined query rejected: {}", e);
                let mut failed =
                    NaturalSearchResponse::failed(query, &e, e.to_string(), Some(stage));
                failed.search_request = Some(serde_json::to_value(&request)?);
                return Ok(failed);
            }
            Err(e) => return Err(e),
        };

        let analysis = self.narrator.narrate(query, &response).await;

        Ok(NaturalSearchResponse {
            success: true,
            query: query.to_string(),
            total_hits: response.total_hits,
            max_score: response.max_score,
            results: response.results,
            analysis: Some(analysis),
            search_request: Some(serde_json::to_value(&request)?),
            refinement: Some(stage),
            error: None,
            status: None,
        })
    }

    /// Validate then run a caller-written body. A `size` in the body wins
    /// over `size`.
    pub async fn raw_search(
        &self,
        index: &str,
        body: &Map<String, Value>,
        size: Option<usize>,
    ) -> Result<NaturalSearchResponse> {
        let query = Value::Object(body.clone()).to_string();

        let valid = match self.executor.try_validate(Some(index), body).await {
            Ok(valid) => valid,
            Err(e) if e.kind() == ErrorKind::QueryUnderstanding => {
                tracing::warn!("Validation rejected the query: {}", e);
                false
            }
            Err(e) => return Err(e),
        };
        if !valid {
            return Ok(NaturalSearchResponse::failed(
                &query,
                &BlogScoutError::InvalidQuery("validation failed".to_string()),
                "Invalid Elasticsearch query",
                None,
            ));
        }

        let size = size.unwrap_or(self.default_page_size);
        let response = match self.executor.search(index, body, size).await {
            Ok(response) => response,
            Err(e) if e.kind() == ErrorKind::QueryUnderstanding => {
                return Ok(NaturalSearchResponse::failed(&query, &e, e.to_string(), None))
            }
            Err(e) => return Err(e),
        };

        Ok(NaturalSearchResponse {
            success: true,
            query,
            total_hits: response.total_hits,
            max_score: response.max_score,
            results: response.results,
            analysis: None,
            search_request: Some(Value::Object(body.clone())),
            refinement: None,
            error: None,
            status: None,
        })
    }

    pub async fn validate(&self, index: Option<&str>, body: &Map<String, Value>) -> bool {
        self.executor.validate(index, body).await
    }

    pub async fn collections_info(&self) -> BTreeMap<String, CollectionInfo> {
        self.executor.collections_info(&self.index_pattern).await
    }

    /// One tiny free-text completion
    pub async fn llm_health(&self) -> bool {
        match self
            .client
            .chat_completion(vec![ChatMessage::user("Hello")], CompletionMode::Free)
            .await
        {
            Ok(text) => !text.is_empty(),
            Err(e) => {
                tracing::error!("LLM health check failed: {}", e);
                false
            }
        }
    }

    pub async fn health(&self) -> HealthReport {
        let (elasticsearch, llm, indices) = futures::join!(
            self.executor.ping(),
            self.llm_health(),
            self.collections_info()
        );

        HealthReport {
            status: if elasticsearch && llm { "healthy" } else { "degraded" }.to_string(),
            services: ServiceHealth { elasticsearch, llm },
            indices,
        }
    }
}
