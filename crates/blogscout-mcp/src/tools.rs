//! MCP tool definitions and handlers

use crate::protocol::*;
use anyhow::Result;
use blogscout_core::{BlogScoutError, SearchPipeline, EXAMPLE_QUERIES};
use serde_json::{Map, Value};

pub fn natural_search_tool_definition() -> ToolDefinition {
    let examples: Vec<&str> = EXAMPLE_QUERIES
        .iter()
        .flat_map(|(_, queries)| queries.iter().copied())
        .take(3)
        .collect();

    ToolDefinition {
        name: "natural_search".to_string(),
        description: format!(
            "Search blog articles and users with a plain-language question. \
             Returns matching documents and a short analysis. Examples: {}",
            examples.join("; ")
        ),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Question in plain language"
                },
                "size": {
                    "type": "integer",
                    "description": "Maximum results (default: 10)",
                    "default": 10
                }
            },
            "required": ["query"]
        }),
    }
}

pub fn raw_search_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "raw_search".to_string(),
        description: "Run an Elasticsearch request body against an index. \
                      The query is validated first; a size in the body wins."
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "index": {
                    "type": "string",
                    "description": "Index name (blog-articles, blog-users)"
                },
                "body": {
                    "type": "object",
                    "description": "Elasticsearch request body"
                },
                "size": {
                    "type": "integer",
                    "description": "Maximum results when the body has no size"
                }
            },
            "required": ["index", "body"]
        }),
    }
}

pub fn validate_query_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "validate_query".to_string(),
        description: "Check whether an Elasticsearch query is valid without running it"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "body": {
                    "type": "object",
                    "description": "Query clause or full request body"
                },
                "index": {
                    "type": "string",
                    "description": "Index to validate against"
                }
            },
            "required": ["body"]
        }),
    }
}

pub fn collection_info_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "collection_info".to_string(),
        description: "List blog indices with document counts and mappings".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub fn health_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "health".to_string(),
        description: "Check search engine and LLM connectivity".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub fn all_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        natural_search_tool_definition(),
        raw_search_tool_definition(),
        validate_query_tool_definition(),
        collection_info_tool_definition(),
        health_tool_definition(),
    ]
}

pub async fn handle_natural_search(pipeline: &SearchPipeline, args: Value) -> Result<ToolResult> {
    let query = required_str(&args, "query")?;
    let size = optional_size(&args)?;

    let response = pipeline.natural_search(query, size).await?;

    let summary = match (&response.analysis, &response.error) {
        (_, Some(error)) => format!("Search failed: {}", error),
        (Some(analysis), None) => format!("{}\n\n{} total hits", analysis, response.total_hits),
        (None, None) => format!("{} total hits", response.total_hits),
    };

    Ok(ToolResult::text(summary, serde_json::to_value(&response)?))
}

pub async fn handle_raw_search(pipeline: &SearchPipeline, args: Value) -> Result<ToolResult> {
    let index = required_str(&args, "index")?;
    let body = required_object(&args, "body")?;
    let size = optional_size(&args)?;

    let response = pipeline.raw_search(index, body, size).await?;

    let summary = match response.error {
        Some(ref error) => format!("Search failed: {}", error),
        None => format!(
            "{} total hits, {} returned",
            response.total_hits,
            response.results.len()
        ),
    };

    Ok(ToolResult::text(summary, serde_json::to_value(&response)?))
}

pub async fn handle_validate_query(pipeline: &SearchPipeline, args: Value) -> Result<ToolResult> {
    let body = required_object(&args, "body")?;
    let index = args.get("index").and_then(Value::as_str);

    let valid = pipeline.validate(index, body).await;

    Ok(ToolResult::text(
        if valid { "Query is valid" } else { "Query is not valid" }.to_string(),
        serde_json::json!({ "valid": valid }),
    ))
}

pub async fn handle_collection_info(pipeline: &SearchPipeline) -> Result<ToolResult> {
    let indices = pipeline.collections_info().await;

    let mut summary = format!("{} indices", indices.len());
    for (name, info) in &indices {
        summary.push_str(&format!("\n  - {}: {} documents", name, info.document_count));
    }

    Ok(ToolResult::text(summary, serde_json::to_value(&indices)?))
}

pub async fn handle_health(pipeline: &SearchPipeline) -> Result<ToolResult> {
    let report = pipeline.health().await;

    let summary = format!(
        "Status: {}\nElasticsearch: {}\nLLM: {}",
        report.status,
        if report.services.elasticsearch { "up" } else { "down" },
        if report.services.llm { "up" } else { "down" },
    );

    Ok(ToolResult::text(summary, serde_json::to_value(&report)?))
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| BlogScoutError::InvalidInput(format!("'{}' must be a string", key)).into())
}

fn required_object<'a>(args: &'a Value, key: &str) -> Result<&'a Map<String, Value>> {
    args.get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| BlogScoutError::InvalidInput(format!("'{}' must be an object", key)).into())
}

fn optional_size(args: &Value) -> Result<Option<usize>> {
    match args.get("size") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| {
                BlogScoutError::InvalidInput("'size' must be a non-negative integer".into()).into()
            }),
    }
}
