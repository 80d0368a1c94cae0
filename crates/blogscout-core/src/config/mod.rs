//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Completion backend configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Search engine configuration
    #[serde(default)]
    pub search_engine: SearchEngineConfig,

    /// Directory holding `articles_mapping.json` and `users_mapping.json`
    #[serde(default = "default_mappings_dir")]
    pub mappings_dir: PathBuf,

    /// Page size used when the caller does not ask for one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_service: LLMServiceConfig::default(),
            search_engine: SearchEngineConfig::default(),
            mappings_dir: default_mappings_dir(),
            default_page_size: default_page_size(),
        }
    }
}

/// Which chat-completions dialect the backend speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    /// OpenAI-compatible `/v1/chat/completions` (OpenAI, vLLM, Ollama, ...)
    #[default]
    OpenAI,
    /// Azure OpenAI deployment endpoint
    Azure,
}

impl std::str::FromStr for LLMProvider {
    type Err = crate::error::BlogScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "azure" => Ok(Self::Azure),
            other => Err(crate::error::BlogScoutError::Config(format!(
                "unknown LLM provider '{}'",
                other
            ))),
        }
    }
}

/// Completion backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    #[serde(default)]
    pub provider: LLMProvider,

    /// Base URL (Azure: the resource endpoint)
    pub url: String,

    /// Model name, or deployment name for Azure
    #[serde(default = "default_chat_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Azure API version query parameter
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            provider: std::env::var("BLOGSCOUT_LLM_PROVIDER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            url: std::env::var("BLOGSCOUT_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: default_chat_model(),
            api_key: std::env::var("BLOGSCOUT_LLM_API_KEY").ok(),
            api_version: default_api_version(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("BLOGSCOUT_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string())
}

fn default_api_version() -> String {
    std::env::var("BLOGSCOUT_LLM_API_VERSION")
        .unwrap_or_else(|_| "2024-02-15-preview".to_string())
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout() -> u64 {
    30
}

/// Search engine (Elasticsearch REST API) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEngineConfig {
    pub url: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Encoded API key, sent as `Authorization: ApiKey <key>`
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Index pattern listed by collection info
    #[serde(default = "default_index_pattern")]
    pub index_pattern: String,
}

impl Default for SearchEngineConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("BLOGSCOUT_ES_URL")
                .unwrap_or_else(|_| "http://localhost:9200".to_string()),
            username: std::env::var("BLOGSCOUT_ES_USERNAME").ok(),
            password: std::env::var("BLOGSCOUT_ES_PASSWORD").ok(),
            api_key: std::env::var("BLOGSCOUT_ES_API_KEY").ok(),
            timeout_secs: default_timeout(),
            index_pattern: default_index_pattern(),
        }
    }
}

fn default_index_pattern() -> String {
    "blog-*".to_string()
}

fn default_mappings_dir() -> PathBuf {
    std::env::var("BLOGSCOUT_MAPPINGS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("es"))
}

fn default_page_size() -> usize {
    10
}

impl Config {
    /// Load config from `BLOGSCOUT_CONFIG` or the default path
    pub fn load() -> Result<Self> {
        let path = std::env::var("BLOGSCOUT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        Self::load_from(&path)
    }

    /// Load config from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            tracing::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to the given path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}
