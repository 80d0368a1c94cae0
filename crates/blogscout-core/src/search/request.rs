//! The structured search request produced by query refinement

use crate::collection::Collection;
use crate::error::{BlogScoutError, Result};
use crate::schema::FieldMap;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Keys the caller owns; never forwarded from a request body
pub const PAGINATION_KEYS: [&str; 2] = ["size", "from"];

/// Engine-shaped search request with a fixed target collection.
///
/// The query-language objects stay opaque `Value`s. Keys without a named
/// field (e.g. `collapse`) are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredSearchRequest {
    #[serde(rename = "index")]
    pub target_collection: Collection,

    pub track_total_hits: bool,

    pub query: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_scores: Option<bool>,

    #[serde(rename = "_source", skip_serializing_if = "Option::is_none")]
    pub field_selection: Option<Value>,

    #[serde(rename = "aggs", skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Value>,

    #[serde(rename = "runtime_mappings", skip_serializing_if = "Option::is_none")]
    pub runtime_field_definitions: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StructuredSearchRequest {
    /// A `match_all` request against a collection
    pub fn match_all(collection: Collection) -> Self {
        Self {
            target_collection: collection,
            track_total_hits: true,
            query: json!({ "match_all": {} }),
            sort: None,
            track_scores: None,
            field_selection: None,
            aggregations: None,
            highlight: None,
            runtime_field_definitions: None,
            extra: Map::new(),
        }
    }

    /// Build from an object emitted by the model.
    ///
    /// Pagination keys are dropped, a missing index means articles, a
    /// missing query means `match_all`. An index outside the allowed set is
    /// rejected.
    pub fn from_object(mut obj: Map<String, Value>) -> Result<Self> {
        for key in PAGINATION_KEYS {
            if obj.remove(key).is_some() {
                tracing::debug!("Dropped '{}' from generated request", key);
            }
        }

        let target_collection = match obj.remove("index") {
            None | Some(Value::Null) => Collection::Articles,
            Some(Value::String(name)) => name.parse()?,
            Some(other) => {
                return Err(BlogScoutError::InvalidInput(format!(
                    "index must be a string, got {}",
                    other
                )))
            }
        };

        obj.remove("track_total_hits");
        let query = non_null(obj.remove("query")).unwrap_or_else(|| json!({ "match_all": {} }));
        if !query.is_object() {
            return Err(BlogScoutError::InvalidInput(
                "query must be an object".to_string(),
            ));
        }

        let aggregations = non_null(obj.remove("aggs")).or_else(|| non_null(obj.remove("aggregations")));
        obj.remove("aggregations");

        Ok(Self {
            target_collection,
            track_total_hits: true,
            query,
            sort: non_null(obj.remove("sort")),
            track_scores: obj.remove("track_scores").and_then(|v| v.as_bool()),
            field_selection: non_null(obj.remove("_source")),
            aggregations,
            highlight: non_null(obj.remove("highlight")),
            runtime_field_definitions: non_null(obj.remove("runtime_mappings")),
            extra: obj,
        })
    }

    /// Request body for the engine. Never carries `size`/`from`.
    pub fn to_body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("track_total_hits".into(), Value::Bool(self.track_total_hits));
        body.insert("query".into(), self.query.clone());

        let optional = [
            ("sort", self.sort.clone()),
            ("track_scores", self.track_scores.map(Value::Bool)),
            ("_source", self.field_selection.clone()),
            ("aggs", self.aggregations.clone()),
            ("highlight", self.highlight.clone()),
            ("runtime_mappings", self.runtime_field_definitions.clone()),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                body.insert(key.into(), value);
            }
        }

        for (key, value) in &self.extra {
            if !PAGINATION_KEYS.contains(&key.as_str()) && !body.contains_key(key) {
                body.insert(key.clone(), value.clone());
            }
        }
        body
    }

    /// Drop sort entries on fields the mapping types as non-sortable.
    /// Fields the mapping does not know are kept. Returns the dropped names.
    pub fn apply_sort_guard(&mut self, fields: &FieldMap) -> Vec<String> {
        let Some(sort) = self.sort.take() else {
            return Vec::new();
        };

        let entries = match sort {
            Value::Array(entries) => entries,
            single => vec![single],
        };

        let mut dropped = Vec::new();
        let kept: Vec<Value> = entries
            .into_iter()
            .filter(|entry| match sort_field(entry) {
                Some(field) if !field.starts_with('_') && fields.is_sortable(field) == Some(false) => {
                    dropped.push(field.to_string());
                    false
                }
                _ => true,
            })
            .collect();

        if !kept.is_empty() {
            self.sort = Some(Value::Array(kept));
        }
        dropped
    }
}

fn non_null(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

/// Field named by one sort entry: `"field"` or `{"field": ...}`
fn sort_field(entry: &Value) -> Option<&str> {
    match entry {
        Value::String(field) => Some(field.as_str()),
        Value::Object(map) if map.len() == 1 => map.keys().next().map(String::as_str),
        _ => None,
    }
}
