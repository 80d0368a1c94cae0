//! The fixed set of searchable collections

use crate::error::{BlogScoutError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A collection the refiner is allowed to target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Collection {
    #[serde(rename = "blog-articles", alias = "articles")]
    Articles,
    #[serde(rename = "blog-users", alias = "users")]
    Users,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Articles, Collection::Users];

    /// Index name in the search engine
    pub fn index_name(self) -> &'static str {
        match self {
            Self::Articles => "blog-articles",
            Self::Users => "blog-users",
        }
    }

    /// Mapping file name inside the mappings directory
    pub fn mapping_file(self) -> &'static str {
        match self {
            Self::Articles => "articles_mapping.json",
            Self::Users => "users_mapping.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.index_name())
    }
}

impl FromStr for Collection {
    type Err = BlogScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "blog-articles" | "articles" => Ok(Self::Articles),
            "blog-users" | "users" => Ok(Self::Users),
            other => Err(BlogScoutError::InvalidInput(format!(
                "'{}' is not one of: blog-articles, blog-users",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_aliases() {
        assert_eq!("blog-users".parse::<Collection>().unwrap(), Collection::Users);
        assert_eq!("articles".parse::<Collection>().unwrap(), Collection::Articles);
        assert!("blog-comments".parse::<Collection>().is_err());
    }

    #[test]
    fn test_serde_uses_index_names() {
        let json = serde_json::to_string(&Collection::Articles).unwrap();
        assert_eq!(json, "\"blog-articles\"");
        let parsed: Collection = serde_json::from_str("\"users\"").unwrap();
        assert_eq!(parsed, Collection::Users);
    }
}
