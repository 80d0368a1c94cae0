//! End-to-end tests of the natural-language search pipeline with scripted
//! collaborators

mod common;

use blogscout_core::llm::prompts::messages;
use blogscout_core::{
    extract_json_object, BlogScoutError, CompletionMode, ErrorKind, MultiSearchItem,
    MultiSearchOutcome, RefinementStage, SearchPipeline,
};
use common::{engine_response, schema, MockEngine, MockLLM};
use serde_json::json;

const PYTHON_REQUEST: &str = r#"{
    "index": "blog-articles",
    "track_total_hits": true,
    "query": {"bool": {"must": [{"multi_match": {"query": "python", "fields": ["title^3", "content"]}}]}},
    "sort": [{"likes": {"order": "desc"}}],
    "track_scores": true
}"#;

#[tokio::test]
async fn test_popular_python_articles() {
    let llm = MockLLM::new()
        .reply(PYTHON_REQUEST)
        .reply("\"I found 2 popular Python articles: Python Best Practices and FastAPI Tutorial.\"");
    let engine = MockEngine::with_response(engine_response(
        2,
        &["Python Best Practices", "FastAPI Tutorial"],
    ));
    let pipeline = SearchPipeline::new(llm.clone(), engine.clone(), schema());

    let resp = pipeline
        .natural_search("Find popular articles about python", None)
        .await
        .unwrap();

    assert!(resp.success);
    assert_eq!(resp.total_hits, 2);
    assert_eq!(resp.results.len(), 2);
    assert_eq!(resp.refinement, Some(RefinementStage::Structured));

    let analysis = resp.analysis.unwrap();
    assert!(analysis.contains('2'));
    assert!(analysis.contains("Python Best Practices"));
    assert!(analysis.contains("FastAPI Tutorial"));
    assert!(!analysis.starts_with('"'));

    let refinement_prompt = llm.prompt(0);
    assert!(refinement_prompt.contains("blog-articles (fields: title [text]"));
    assert!(refinement_prompt
        .contains("- blog-articles: sort by recency on \"created_at\", calendar ranges on \"created_at\""));

    // the narration prompt carried both titles
    assert_eq!(llm.modes(), vec![CompletionMode::Structured, CompletionMode::Free]);
    let narration_prompt = llm.prompt(1);
    assert!(narration_prompt.contains("Python Best Practices"));
    assert!(narration_prompt.contains("FastAPI Tutorial"));
    assert!(narration_prompt.contains("Number of results: 2"));

    let searches = engine.searches();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].0, "blog-articles");
    assert_eq!(searches[0].1["size"], 10);
    assert_eq!(searches[0].1["sort"][0]["likes"]["order"], "desc");
}

#[tokio::test]
async fn test_empty_query_is_a_soft_failure() {
    let llm = MockLLM::new();
    let engine = MockEngine::with_response(engine_response(0, &[]));
    let pipeline = SearchPipeline::new(llm.clone(), engine.clone(), schema());

    let resp = pipeline.natural_search("", None).await.unwrap();

    assert!(!resp.success);
    assert_eq!(resp.total_hits, 0);
    assert!(resp.results.is_empty());
    assert_eq!(resp.error.as_deref(), Some(messages::QUERY_REFINEMENT_FAILED));
    assert_eq!(resp.status, Some(422));
    assert_eq!(llm.call_count(), 0);
    assert!(engine.searches().is_empty());
}

#[tokio::test]
async fn test_backend_outage_is_a_soft_failure() {
    let llm = MockLLM::new().fail("connection refused").fail("connection refused");
    let engine = MockEngine::with_response(engine_response(3, &["a", "b", "c"]));
    let pipeline = SearchPipeline::new(llm.clone(), engine.clone(), schema());

    let resp = pipeline.natural_search("rust posts", Some(5)).await.unwrap();

    assert!(!resp.success);
    assert_eq!(resp.total_hits, 0);
    assert!(resp.error.is_some());
    assert_eq!(resp.refinement, Some(RefinementStage::Unresolvable));
    assert_eq!(llm.call_count(), 2);
    assert!(engine.searches().is_empty());
}

#[tokio::test]
async fn test_raw_search_body_size_wins() {
    let llm = MockLLM::new();
    let engine = MockEngine::with_response(engine_response(1500, &["one", "two"]));
    let pipeline = SearchPipeline::new(llm.clone(), engine.clone(), schema());

    let body = json!({"query": {"match": {"title": "rust"}}, "size": 999});
    let resp = pipeline
        .raw_search("blog-articles", body.as_object().unwrap(), Some(10))
        .await
        .unwrap();

    assert!(resp.success);
    assert_eq!(resp.total_hits, 1500);
    assert_eq!(resp.results.len(), 2);
    assert!(resp.analysis.is_none());

    let searches = engine.searches();
    assert_eq!(searches[0].1["size"], 999);
    assert_eq!(searches[0].1["track_total_hits"], true);

    // only the query clause is validated
    assert_eq!(engine.validations(), vec![json!({"match": {"title": "rust"}})]);
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_raw_search_invalid_query() {
    let engine = MockEngine::rejecting_validation(engine_response(1, &["x"]));
    let pipeline = SearchPipeline::new(MockLLM::new(), engine.clone(), schema());

    let body = json!({"query": {"matchh": {}}});
    let resp = pipeline
        .raw_search("blog-articles", body.as_object().unwrap(), None)
        .await
        .unwrap();

    assert!(!resp.success);
    assert_eq!(resp.error.as_deref(), Some("Invalid Elasticsearch query"));
    assert_eq!(resp.status, Some(400));
    assert!(engine.searches().is_empty());
}

#[tokio::test]
async fn test_raw_search_engine_outage_is_a_hard_failure() {
    let engine = MockEngine::failing(BlogScoutError::EngineUnavailable("connection refused".into()));
    let pipeline = SearchPipeline::new(MockLLM::new(), engine.clone(), schema());

    let body = json!({"query": {"match": {"title": "rust"}}});
    let err = pipeline
        .raw_search("blog-articles", body.as_object().unwrap(), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Infrastructure);
    assert_eq!(err.status_code(), 503);
    assert_eq!(engine.validations().len(), 1);
    assert!(engine.searches().is_empty());
}

#[tokio::test]
async fn test_raw_search_missing_index_is_a_hard_failure() {
    let engine = MockEngine::failing(BlogScoutError::CollectionNotFound("blog-drafts".into()));
    let pipeline = SearchPipeline::new(MockLLM::new(), engine.clone(), schema());

    let body = json!({"query": {"match_all": {}}});
    let err = pipeline
        .raw_search("blog-drafts", body.as_object().unwrap(), None)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert!(engine.searches().is_empty());
}

#[tokio::test]
async fn test_raw_search_unparseable_query_is_a_soft_failure() {
    let engine = MockEngine::failing(BlogScoutError::InvalidQuery("unknown query [matchh]".into()));
    let pipeline = SearchPipeline::new(MockLLM::new(), engine.clone(), schema());

    let body = json!({"query": {"matchh": {}}});
    let resp = pipeline
        .raw_search("blog-articles", body.as_object().unwrap(), None)
        .await
        .unwrap();

    assert!(!resp.success);
    assert_eq!(resp.status, Some(400));
    assert!(engine.searches().is_empty());
}

#[tokio::test]
async fn test_multi_search_mixed_outcomes() {
    let engine = MockEngine::with_msearch(vec![
        engine_response(2, &["Rust Ownership", "Async Rust"]),
        json!({"error": {"type": "index_not_found_exception", "reason": "no such index [blog-drafts]"}, "status": 404}),
    ]);
    let pipeline = SearchPipeline::new(MockLLM::new(), engine.clone(), schema());

    let items = vec![
        MultiSearchItem {
            index: "blog-articles".to_string(),
            body: json!({"query": {"match": {"title": "rust"}}, "size": 3})
                .as_object()
                .cloned()
                .unwrap(),
            size: 10,
        },
        MultiSearchItem {
            index: "blog-drafts".to_string(),
            body: json!({"query": {"match_all": {}}, "track_total_hits": false})
                .as_object()
                .cloned()
                .unwrap(),
            size: 5,
        },
    ];
    let outcomes = pipeline.executor().multi_search(&items).await.unwrap();

    assert_eq!(outcomes.len(), 2);
    match &outcomes[0] {
        MultiSearchOutcome::Ok(resp) => {
            assert_eq!(resp.total_hits, 2);
            assert_eq!(resp.results.len(), 2);
        }
        other => panic!("expected hits, got {:?}", other),
    }
    match &outcomes[1] {
        MultiSearchOutcome::Err { error } => {
            assert_eq!(error["type"], "index_not_found_exception");
        }
        other => panic!("expected an item error, got {:?}", other),
    }

    // sizes and total tracking as sent
    let sent = engine.searches();
    assert_eq!(sent[0].0, "blog-articles");
    assert_eq!(sent[0].1["size"], 3);
    assert_eq!(sent[0].1["track_total_hits"], true);
    assert_eq!(sent[1].1["size"], 5);
    assert_eq!(sent[1].1["track_total_hits"], false);
}

#[tokio::test]
async fn test_multi_search_outage_is_reported_as_unavailable() {
    let engine = MockEngine::failing(BlogScoutError::BackendUnavailable("socket closed".into()));
    let pipeline = SearchPipeline::new(MockLLM::new(), engine, schema());

    let items = vec![MultiSearchItem {
        index: "blog-articles".to_string(),
        body: serde_json::Map::new(),
        size: 10,
    }];
    let err = pipeline.executor().multi_search(&items).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Infrastructure);
    assert!(err.to_string().contains("Multi-search failed"));
}

#[tokio::test]
async fn test_multi_search_rejected_query_passes_through() {
    let engine = MockEngine::failing(BlogScoutError::InvalidQuery("failed to parse".into()));
    let pipeline = SearchPipeline::new(MockLLM::new(), engine, schema());

    let items = vec![MultiSearchItem {
        index: "blog-articles".to_string(),
        body: serde_json::Map::new(),
        size: 10,
    }];
    let err = pipeline.executor().multi_search(&items).await.unwrap_err();

    assert!(matches!(err, BlogScoutError::InvalidQuery(_)));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_doubled_brace_completion() {
    let obj = extract_json_object("{{\"index\": \"blog-users\"}}").unwrap();
    assert_eq!(serde_json::Value::Object(obj), json!({"index": "blog-users"}));
}

#[tokio::test]
async fn test_generated_size_is_never_sent() {
    let llm = MockLLM::new()
        .reply(r#"{"index": "blog-articles", "size": 500, "from": 20, "query": {"match_all": {}}}"#)
        .reply("Found 4 results.");
    let engine = MockEngine::with_response(engine_response(4, &["a", "b", "c", "d"]));
    let pipeline = SearchPipeline::new(llm, engine.clone(), schema());

    let resp = pipeline.natural_search("everything", Some(7)).await.unwrap();
    assert!(resp.success);

    let sent = &engine.searches()[0].1;
    assert_eq!(sent["size"], 7);
    assert!(sent.get("from").is_none());

    let recorded = resp.search_request.unwrap();
    assert!(recorded.get("size").is_none());
    assert!(recorded.get("from").is_none());
}

#[tokio::test]
async fn test_zero_hits_skip_narration() {
    let llm = MockLLM::new().reply(r#"{"index": "blog-users", "query": {"match": {"full_name": "nobody"}}}"#);
    let engine = MockEngine::with_response(engine_response(0, &[]));
    let pipeline = SearchPipeline::new(llm.clone(), engine, schema());

    let resp = pipeline.natural_search("user called nobody", None).await.unwrap();

    assert!(resp.success);
    assert_eq!(resp.total_hits, 0);
    assert_eq!(resp.analysis.as_deref(), Some(messages::NO_RESULTS));
    // refinement only
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_narration_failure_keeps_search_result() {
    let llm = MockLLM::new().reply(PYTHON_REQUEST).fail("timeout");
    let engine = MockEngine::with_response(engine_response(2, &["A", "B"]));
    let pipeline = SearchPipeline::new(llm, engine, schema());

    let resp = pipeline.natural_search("python", None).await.unwrap();

    assert!(resp.success);
    assert_eq!(resp.total_hits, 2);
    let analysis = resp.analysis.unwrap();
    assert!(analysis.starts_with("Found 2 results for your query."));
}

#[tokio::test]
async fn test_engine_outage_is_a_hard_failure() {
    let llm = MockLLM::new().reply(PYTHON_REQUEST);
    let engine = MockEngine::failing(BlogScoutError::EngineUnavailable("connection refused".into()));
    let pipeline = SearchPipeline::new(llm, engine, schema());

    let err = pipeline.natural_search("python", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Infrastructure);
    assert_eq!(err.status_code(), 503);
}

#[tokio::test]
async fn test_rejected_query_is_a_soft_failure() {
    let llm = MockLLM::new().reply(PYTHON_REQUEST);
    let engine = MockEngine::failing(BlogScoutError::InvalidQuery("failed to parse".into()));
    let pipeline = SearchPipeline::new(llm, engine, schema());

    let resp = pipeline.natural_search("python", None).await.unwrap();
    assert!(!resp.success);
    assert_eq!(resp.status, Some(400));
    assert!(resp.error.unwrap().contains("failed to parse"));
    assert!(resp.search_request.is_some());
}

#[tokio::test]
async fn test_health_and_collections_info() {
    let llm = MockLLM::new().reply("Hi");
    let engine = MockEngine::with_response(engine_response(0, &[]));
    let pipeline = SearchPipeline::new(llm, engine, schema());

    let report = pipeline.health().await;
    assert_eq!(report.status, "healthy");
    assert!(report.services.elasticsearch);
    assert!(report.services.llm);
    assert_eq!(report.indices["blog-articles"].document_count, 120);
    assert_eq!(report.indices["blog-users"].document_count, 30);
}

#[tokio::test]
async fn test_health_degraded() {
    let llm = MockLLM::new().fail("down");
    let engine = MockEngine::failing(BlogScoutError::EngineUnavailable("down".into()));
    let pipeline = SearchPipeline::new(llm, engine, schema());

    let report = pipeline.health().await;
    assert_eq!(report.status, "degraded");
    assert!(!report.services.elasticsearch);
    assert!(!report.services.llm);
    assert!(report.indices.is_empty());
}
