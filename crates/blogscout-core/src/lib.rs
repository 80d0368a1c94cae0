//! BlogScout Core Library
//!
//! Natural-language search over a blog dataset (articles and users) held in
//! Elasticsearch.
//!
//! # Features
//! - Mapping-aware query refinement through a chat-completions backend
//! - Tolerant JSON extraction from model output
//! - Search execution with safe defaults and normalized responses
//! - Prose narration of results with deterministic fallbacks

pub mod collection;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod schema;
pub mod search;

pub use collection::Collection;
pub use config::{Config, LLMProvider, LLMServiceConfig, SearchEngineConfig};
pub use error::{BlogScoutError, Error, ErrorKind, Result};
pub use llm::{
    extract_json_object, ChatMessage, CompletionMode, LLMClient, MetricsSnapshot, OpenAIClient,
    QueryRefiner, Refinement, RefinementStage, ResultNarrator,
};
pub use pipeline::{HealthReport, NaturalSearchResponse, SearchPipeline, ServiceHealth, EXAMPLE_QUERIES};
pub use schema::{FieldMap, SchemaDigest};
pub use search::{
    CollectionInfo, ElasticsearchClient, HitMeta, MultiSearchItem, MultiSearchOutcome, SearchEngine,
    SearchExecutor, SearchHit, SearchResponse, StructuredSearchRequest,
};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "blogscout";
