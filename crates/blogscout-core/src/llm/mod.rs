//! LLM integration
//!
//! Provides:
//! - A chat-completions client (OpenAI-compatible or Azure)
//! - Refinement and narration prompts
//! - JSON extraction from free-form completions
//! - Query refinement and result narration

mod client;
mod extract;
mod narrator;
pub mod prompts;
mod refiner;

pub use client::{
    complete, APIMetrics, ChatMessage, CompletionMode, LLMClient, MetricsSnapshot, OpenAIClient,
};
pub use extract::extract_json_object;
pub use narrator::{
    clean_narration, truncate_document, truncate_for_prompt, ResultNarrator, MAX_LIST_ITEMS, MAX_LIST_ITEM_CHARS,
    MAX_NARRATED_RESULTS, MAX_STRING_CHARS,
};
pub use refiner::{QueryRefiner, Refinement, RefinementStage};
