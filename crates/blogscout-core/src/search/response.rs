//! Normalized search responses

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

/// Key the hit metadata is stored under unless the document already owns it
pub const META_KEY: &str = "__meta";

/// Per-hit metadata carried beside the document body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HitMeta {
    pub id: Option<String>,
    pub index: Option<String>,
    pub score: Option<f64>,
    pub highlight: Option<Value>,
    pub sort: Option<Value>,
}

/// One result document
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub source: Map<String, Value>,
    pub meta: HitMeta,
}

impl SearchHit {
    /// `__meta`, or `__meta_`, `__meta__`, ... when the document already
    /// has a field by that name
    pub fn meta_key(&self) -> String {
        let mut key = META_KEY.to_string();
        while self.source.contains_key(&key) {
            key.push('_');
        }
        key
    }

    pub fn title(&self) -> Option<&str> {
        self.source
            .get("title")
            .or_else(|| self.source.get("full_name"))
            .and_then(Value::as_str)
    }
}

impl Serialize for SearchHit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.source.len() + 1))?;
        for (key, value) in &self.source {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(&self.meta_key(), &self.meta)?;
        map.end()
    }
}

/// Engine response reduced to what callers use
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResponse {
    pub total_hits: u64,
    pub max_score: Option<f64>,
    pub took_ms: Option<u64>,
    pub timed_out: bool,
    pub results: Vec<SearchHit>,
}

impl SearchResponse {
    /// Normalize a native `_search` response
    pub fn from_engine(raw: &Value) -> Self {
        let hits = &raw["hits"];

        // ES 7+ reports {"value": n, "relation": ..}; older versions a bare number
        let total_hits = match &hits["total"] {
            Value::Object(total) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
            other => other.as_u64().unwrap_or(0),
        };

        let results = hits["hits"]
            .as_array()
            .map(|hits| hits.iter().map(hit_from_engine).collect())
            .unwrap_or_default();

        Self {
            total_hits,
            max_score: hits["max_score"].as_f64(),
            took_ms: raw["took"].as_u64(),
            timed_out: raw["timed_out"].as_bool().unwrap_or(false),
            results,
        }
    }
}

fn hit_from_engine(hit: &Value) -> SearchHit {
    let present = |key: &str| hit.get(key).filter(|v| !v.is_null()).cloned();

    SearchHit {
        source: hit["_source"].as_object().cloned().unwrap_or_default(),
        meta: HitMeta {
            id: hit["_id"].as_str().map(str::to_string),
            index: hit["_index"].as_str().map(str::to_string),
            score: hit["_score"].as_f64(),
            highlight: present("highlight"),
            sort: present("sort"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_response() -> Value {
        json!({
            "took": 7,
            "timed_out": false,
            "hits": {
                "total": {"value": 42, "relation": "eq"},
                "max_score": 3.5,
                "hits": [
                    {
                        "_index": "blog-articles",
                        "_id": "a1",
                        "_score": 3.5,
                        "_source": {"title": "Rust in production", "likes": 10},
                        "highlight": {"title": ["<em>Rust</em> in production"]}
                    },
                    {
                        "_index": "blog-articles",
                        "_id": "a2",
                        "_score": null,
                        "_source": {"title": "Async Rust", "__meta": "user field"},
                        "sort": [1700000000000i64]
                    }
                ]
            }
        })
    }

    #[test]
    fn test_normalize() {
        let resp = SearchResponse::from_engine(&raw_response());
        assert_eq!(resp.total_hits, 42);
        assert_eq!(resp.max_score, Some(3.5));
        assert_eq!(resp.took_ms, Some(7));
        assert_eq!(resp.results.len(), 2);

        let first = &resp.results[0];
        assert_eq!(first.meta.id.as_deref(), Some("a1"));
        assert_eq!(first.meta.index.as_deref(), Some("blog-articles"));
        assert!(first.meta.highlight.is_some());
        assert!(first.meta.sort.is_none());
        assert_eq!(first.title(), Some("Rust in production"));

        assert_eq!(resp.results[1].meta.score, None);
    }

    #[test]
    fn test_missing_total_defaults_to_zero() {
        let resp = SearchResponse::from_engine(&json!({"hits": {"hits": []}}));
        assert_eq!(resp.total_hits, 0);
        assert_eq!(resp.max_score, None);
        assert!(resp.results.is_empty());

        let legacy = SearchResponse::from_engine(&json!({"hits": {"total": 5, "hits": []}}));
        assert_eq!(legacy.total_hits, 5);
    }

    #[test]
    fn test_meta_never_overwrites_document_fields() {
        let resp = SearchResponse::from_engine(&raw_response());

        let first = serde_json::to_value(&resp.results[0]).unwrap();
        assert_eq!(first["__meta"]["id"], "a1");
        assert_eq!(first["likes"], 10);

        let second = serde_json::to_value(&resp.results[1]).unwrap();
        assert_eq!(second["__meta"], "user field");
        assert_eq!(second["__meta_"]["id"], "a2");
        assert_eq!(second["__meta_"]["sort"][0], 1700000000000i64);
    }
}
