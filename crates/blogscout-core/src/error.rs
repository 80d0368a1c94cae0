//! Error types for blogscout

use thiserror::Error;

/// Result type alias using BlogScoutError
pub type Result<T> = std::result::Result<T, BlogScoutError>;

/// Error type alias for convenience
pub type Error = BlogScoutError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const UNAVAILABLE: i32 = 4;
}

/// Main error type for blogscout
#[derive(Debug, Error)]
pub enum BlogScoutError {
    #[error("Could not turn the query into a search request: {0}")]
    RefinementUnresolvable(String),

    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Search engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Completion backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Broad fault families, used by transports to pick a response shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The user's phrasing could not be turned into a working query
    QueryUnderstanding,
    /// The search engine itself failed
    Infrastructure,
    /// The completion backend failed
    Backend,
    /// Anything else
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QueryUnderstanding => "query_understanding",
            Self::Infrastructure => "infrastructure",
            Self::Backend => "backend",
            Self::Internal => "internal",
        }
    }
}

impl BlogScoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RefinementUnresolvable(_) | Self::InvalidQuery(_) | Self::InvalidInput(_) => {
                ErrorKind::QueryUnderstanding
            }
            Self::CollectionNotFound(_) | Self::EngineUnavailable(_) => ErrorKind::Infrastructure,
            Self::BackendUnavailable(_) | Self::Llm(_) => ErrorKind::Backend,
            _ => ErrorKind::Internal,
        }
    }

    /// HTTP-style status a transport should surface for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RefinementUnresolvable(_) => 422,
            Self::InvalidQuery(_) | Self::InvalidInput(_) => 400,
            Self::CollectionNotFound(_) => 404,
            Self::EngineUnavailable(_) => 503,
            Self::BackendUnavailable(_) | Self::Llm(_) => 502,
            _ => 500,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CollectionNotFound(_) => exit_codes::NOT_FOUND,
            Self::RefinementUnresolvable(_)
            | Self::InvalidQuery(_)
            | Self::InvalidInput(_)
            | Self::Config(_) => exit_codes::INVALID_INPUT,
            Self::EngineUnavailable(_) | Self::BackendUnavailable(_) => exit_codes::UNAVAILABLE,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_kinds_get_distinct_statuses() {
        let errors = [
            BlogScoutError::RefinementUnresolvable("x".into()),
            BlogScoutError::InvalidQuery("x".into()),
            BlogScoutError::CollectionNotFound("x".into()),
            BlogScoutError::EngineUnavailable("x".into()),
            BlogScoutError::BackendUnavailable("x".into()),
        ];
        let mut statuses: Vec<u16> = errors.iter().map(|e| e.status_code()).collect();
        statuses.sort_unstable();
        statuses.dedup();
        assert_eq!(statuses.len(), errors.len());
    }

    #[test]
    fn test_engine_faults_are_not_blamed_on_the_user() {
        assert_eq!(
            BlogScoutError::EngineUnavailable("down".into()).kind(),
            ErrorKind::Infrastructure
        );
        assert_eq!(
            BlogScoutError::CollectionNotFound("blog-x".into()).kind(),
            ErrorKind::Infrastructure
        );
        assert_eq!(
            BlogScoutError::InvalidQuery("bad".into()).kind(),
            ErrorKind::QueryUnderstanding
        );
    }
}
