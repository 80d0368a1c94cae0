//! Schema digest
//!
//! Field-type metadata for each collection, flattened once from the engine's
//! mapping files, and the compact "cheatsheet" rendering injected into the
//! refinement prompt.

use crate::collection::Collection;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Fields listed first in a cheatsheet, in this order
const PREFERRED_ORDER: &[&str] = &[
    "title",
    "title.keyword",
    "summary",
    "content",
    "searchable_content",
    "author_name",
    "author_name.keyword",
    "tags",
    "status",
    "is_published",
    "createdTs",
    "created_at",
    "updated_at",
    "likes",
    "dislikes",
    "views",
    "content_length",
    "summary_length",
    "engagement_ratio",
    "tag_count",
    "full_name",
    "full_name.keyword",
    "email",
    "role",
    "engagement_score",
    "followers",
    "total_followers",
    "total_likes",
    "total_dislikes",
    "total_bookmarks",
    "total_following",
    "id",
];

/// Text fields that get a synthesized `.keyword` sibling for exact matching
const KEYWORD_SIBLINGS: &[&str] = &["title", "author_name", "full_name"];

const SORTABLE_TYPES: &[&str] = &[
    "keyword",
    "constant_keyword",
    "date",
    "date_nanos",
    "boolean",
    "long",
    "integer",
    "short",
    "byte",
    "double",
    "float",
    "half_float",
    "scaled_float",
    "unsigned_long",
];

/// Flattened `{field path: type}` view of one collection's mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    fields: BTreeMap<String, String>,
    preferred_date_field: Option<String>,
    preferred_sort_field: Option<String>,
}

impl FieldMap {
    /// Load a mapping file. Any read or parse failure yields an empty map.
    pub fn load(path: &Path) -> Self {
        let mapping = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!("Mapping file {} is not valid JSON: {}", path.display(), e);
                    Value::Null
                }
            },
            Err(e) => {
                tracing::warn!("Could not read mapping file {}: {}", path.display(), e);
                Value::Null
            }
        };
        Self::from_mapping(&mapping)
    }

    /// Build from a mapping document, either `{"mappings": {"properties": ..}}`
    /// or a bare `{"properties": ..}`
    pub fn from_mapping(mapping: &Value) -> Self {
        let properties = mapping
            .get("mappings")
            .and_then(|m| m.get("properties"))
            .or_else(|| mapping.get("properties"))
            .and_then(Value::as_object);

        let mut fields = BTreeMap::new();
        if let Some(properties) = properties {
            flatten_properties("", properties, &mut fields);
        }

        let is_date = |name: &str| fields.get(name).map(String::as_str) == Some("date");

        let preferred_date_field = ["created_at", "updated_at"]
            .into_iter()
            .find(|f| is_date(*f))
            .map(str::to_string);

        let preferred_sort_field = if fields.get("createdTs").map(String::as_str) == Some("long") {
            Some("createdTs".to_string())
        } else {
            preferred_date_field.clone()
        };

        Self {
            fields,
            preferred_date_field,
            preferred_sort_field,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn field_type(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Date field to use for calendar ranges
    pub fn preferred_date_field(&self) -> Option<&str> {
        self.preferred_date_field.as_deref()
    }

    /// Freshest chronological field for recency ordering
    pub fn preferred_sort_field(&self) -> Option<&str> {
        self.preferred_sort_field.as_deref()
    }

    /// Whether the field has doc values that can back a sort.
    /// Unknown fields return `None`.
    pub fn is_sortable(&self, field: &str) -> Option<bool> {
        self.field_type_with_siblings(field)
            .map(|t| SORTABLE_TYPES.contains(&t))
    }

    fn field_type_with_siblings(&self, field: &str) -> Option<&str> {
        self.field_type(field).or_else(|| {
            let base = field.strip_suffix(".keyword")?;
            (KEYWORD_SIBLINGS.contains(&base) && self.field_type(base) == Some("text"))
                .then_some("keyword")
        })
    }

    /// Fields as listed in a cheatsheet: stored fields plus synthesized
    /// `.keyword` siblings, preferred fields first, the rest alphabetical.
    pub fn cheatsheet_entries(&self) -> Vec<(String, String)> {
        let mut entries: BTreeMap<String, String> = self.fields.clone();
        for base in KEYWORD_SIBLINGS {
            if self.field_type(base) == Some("text") {
                entries
                    .entry(format!("{}.keyword", base))
                    .or_insert_with(|| "keyword".to_string());
            }
        }

        let mut ordered: Vec<(String, String)> = entries.into_iter().collect();
        ordered.sort_by(|(a, _), (b, _)| rank(a).cmp(&rank(b)).then_with(|| a.cmp(b)));
        ordered
    }

    /// Render `"<name> (fields: f1 [type1], f2 [type2], ...)"`
    pub fn render(&self, collection_name: &str) -> String {
        let preview = self
            .cheatsheet_entries()
            .iter()
            .map(|(field, ty)| format!("{} [{}]", field, ty))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} (fields: {})", collection_name, preview)
    }
}

fn rank(field: &str) -> usize {
    PREFERRED_ORDER
        .iter()
        .position(|f| *f == field)
        .unwrap_or(usize::MAX)
}

fn flatten_properties(prefix: &str, node: &Map<String, Value>, out: &mut BTreeMap<String, String>) {
    for (name, spec) in node {
        let path = format!("{}{}", prefix, name);

        if let Some(children) = spec.get("properties").and_then(Value::as_object) {
            flatten_properties(&format!("{}.", path), children, out);
            continue;
        }

        let Some(ty) = spec.get("type").and_then(Value::as_str) else {
            continue;
        };
        out.insert(path.clone(), ty.to_string());

        // Multi-fields, e.g. "fields": {"keyword": {"type": "keyword"}}
        if let Some(multi) = spec.get("fields").and_then(Value::as_object) {
            for (sub, sub_spec) in multi {
                if let Some(sub_ty) = sub_spec.get("type").and_then(Value::as_str) {
                    out.insert(format!("{}.{}", path, sub), sub_ty.to_string());
                }
            }
        }
    }
}

/// Field maps for every known collection. Loaded once at start-up and
/// shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SchemaDigest {
    collections: BTreeMap<Collection, FieldMap>,
}

impl SchemaDigest {
    /// Load `<dir>/<collection mapping file>` for every collection.
    /// Missing or unreadable files give empty field maps.
    pub fn load(dir: &Path) -> Self {
        let collections = Collection::ALL
            .into_iter()
            .map(|c| {
                let fields = FieldMap::load(&dir.join(c.mapping_file()));
                tracing::debug!("Schema for {}: {} fields", c, fields.len());
                (c, fields)
            })
            .collect();
        Self { collections }
    }

    pub fn with_collection(mut self, collection: Collection, fields: FieldMap) -> Self {
        self.collections.insert(collection, fields);
        self
    }

    /// Field map for a collection; empty when nothing was loaded
    pub fn get(&self, collection: Collection) -> &FieldMap {
        static EMPTY: std::sync::OnceLock<FieldMap> = std::sync::OnceLock::new();
        self.collections
            .get(&collection)
            .unwrap_or_else(|| EMPTY.get_or_init(FieldMap::default))
    }

    pub fn render(&self, collection: Collection) -> String {
        self.get(collection).render(collection.index_name())
    }

    /// One cheatsheet line per collection
    pub fn render_all(&self) -> String {
        Collection::ALL
            .iter()
            .map(|c| self.render(*c))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Recency and calendar fields per collection, one line each.
    /// Collections with neither are left out.
    pub fn render_time_fields(&self) -> String {
        Collection::ALL
            .iter()
            .filter_map(|c| {
                let fields = self.get(*c);
                let mut parts = Vec::new();
                if let Some(sort) = fields.preferred_sort_field() {
                    parts.push(format!("sort by recency on \"{}\"", sort));
                }
                if let Some(date) = fields.preferred_date_field() {
                    parts.push(format!("calendar ranges on \"{}\"", date));
                }
                (!parts.is_empty()).then(|| format!("- {}: {}", c, parts.join(", ")))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
