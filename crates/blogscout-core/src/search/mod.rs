//! Search execution against the document-search engine
//!
//! - [`StructuredSearchRequest`]: refined request with pagination stripped
//! - [`SearchExecutor`]: defaults, execution and response normalization
//! - [`SearchEngine`]: the engine boundary, implemented over REST by
//!   [`ElasticsearchClient`]

mod engine;
mod executor;
mod request;
mod response;

pub use engine::{classify_engine_error, ElasticsearchClient, SearchEngine};
pub use executor::{CollectionInfo, MultiSearchItem, MultiSearchOutcome, SearchExecutor};
pub use request::{StructuredSearchRequest, PAGINATION_KEYS};
pub use response::{HitMeta, SearchHit, SearchResponse, META_KEY};
