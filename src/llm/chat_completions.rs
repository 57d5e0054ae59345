//! OpenAI Chat Completions answerer.
//!
//! Sends one non-streaming request per question to `/v1/chat/completions`
//! and returns the first choice's text.

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use crate::server::answer::Answerer;

use super::{LlmSettings, SYSTEM_PROMPT};

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Answerer for the OpenAI Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsAnswerer {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for ChatCompletionsAnswerer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsAnswerer")
            .field("base_url", &self.settings.base_url)
            .field("model", &self.settings.model)
            .finish()
    }
}

impl ChatCompletionsAnswerer {
    /// Create a new answerer with the given settings.
    #[must_use]
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Answerer for ChatCompletionsAnswerer {
    async fn answer(&self, query: &str) -> anyhow::Result<String> {
        let body = serde_json::json!({
            "model": self.settings.model,
            "stream": false,
            "temperature": self.settings.temperature,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": query },
            ],
        });

        let mut rb = self.http.post(self.url()).json(&body);
        if let Some(k) = &self.settings.api_key {
            rb = rb.bearer_auth(k);
        }

        let resp: CompletionResponse = rb
            .send()
            .await
            .context("completion request failed")?
            .error_for_status()?
            .json()
            .await
            .context("malformed completion response")?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|s| !s.trim().is_empty())
            .context("completion had no content")
    }
}
