//! LLM-backed answer generation.
//!
//! The chat service only needs one thing from a model: a single reply to a
//! single question. [`ChatCompletionsAnswerer`] gets it from any
//! OpenAI-compatible `/v1/chat/completions` endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use rag_chat::llm::{ChatCompletionsAnswerer, LlmSettings};
//!
//! let settings = LlmSettings {
//!     base_url: "https://api.openai.com".to_string(),
//!     api_key: Some("sk-...".to_string()),
//!     model: "gpt-4o-mini".to_string(),
//!     temperature: 0.0,
//! };
//! let answerer = ChatCompletionsAnswerer::new(settings);
//! ```

pub mod chat_completions;

pub use chat_completions::ChatCompletionsAnswerer;

/// System prompt for the educational assistant.
pub const SYSTEM_PROMPT: &str = "You are an AI assistant specialized in maternal health education. \
Provide general, educational information only. \
If the answer is not clearly stated in your sources, provide a GENERAL EDUCATIONAL explanation \
and clearly mention that it is general information. \
Do NOT provide diagnosis, treatment, prescriptions, or emergency medical advice. \
Do NOT invent facts.";

/// LLM connection and model settings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Base URL for the LLM API (e.g., `https://api.openai.com`).
    pub base_url: String,
    /// Optional API key for authentication.
    pub api_key: Option<String>,
    /// Model identifier (e.g., `gpt-4o-mini`).
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
}
