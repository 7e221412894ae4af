//! Query-focused page summarisation via an OpenAI-compatible chat
//! completion API.
//!
//! The summary length is requested twice: as an instruction in the system
//! prompt, and as a `max_tokens` budget with 25% headroom. The instruction is
//! only advisory, so the transport budget is padded to avoid cutting a
//! summary off mid-sentence when the model slightly overshoots.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::SummarizerConfig;
use crate::error::SummarizeError;
use crate::http;

/// Something that can turn page content into a query-relevant summary.
pub trait Summarize: Send + Sync + 'static {
    /// Summarise `content` fetched from `source_url` with respect to `query`,
    /// aiming for fewer than `max_tokens` tokens.
    fn summarize(
        &self,
        content: &str,
        query: &str,
        source_url: &str,
        max_tokens: u32,
    ) -> impl Future<Output = Result<String, SummarizeError>> + Send;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Token budget sent to the backend for a target summary length.
///
/// 125% of the target, rounded up.
pub fn token_budget(max_tokens: u32) -> u32 {
    max_tokens.saturating_mul(5).div_ceil(4)
}

/// The fixed system instruction for a target length.
pub fn system_prompt(max_tokens: u32) -> String {
    format!(
        "You summarize web pages for a search engine. Given the content of a web page \
         and the user's search query, write a factual summary of the information on the \
         page that is relevant to the query. Keep the summary strictly under {max_tokens} \
         tokens. Start directly with the summary itself: no title, heading, or label such \
         as \"Summary:\"."
    )
}

/// The user message embedding the query, source, and page content.
pub fn user_message(content: &str, query: &str, source_url: &str) -> String {
    format!("Search query: {query}\nSource URL: {source_url}\n\nContent to summarize:\n{content}")
}

/// Chat-completion backed [`Summarize`] implementation.
pub struct Summarizer {
    config: SummarizerConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl Summarizer {
    /// Create a summariser for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizeError::Completion`] if the HTTP client cannot be built.
    pub fn new(config: SummarizerConfig) -> Result<Self, SummarizeError> {
        let client = http::build_completion_client().map_err(SummarizeError::Completion)?;
        Ok(Self { config, client })
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

impl Summarize for Summarizer {
    async fn summarize(
        &self,
        content: &str,
        query: &str,
        source_url: &str,
        max_tokens: u32,
    ) -> Result<String, SummarizeError> {
        let system = system_prompt(max_tokens);
        let user = user_message(content, query, source_url);
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            max_tokens: token_budget(max_tokens),
        };

        let mut request = self.client.post(self.config.completions_url()).json(&body);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SummarizeError::Completion(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Completion(format!(
                "HTTP {}: {}",
                status.as_u16(),
                extract_error_message(&body_text)
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::Completion(format!("failed to parse response: {e}")))?;

        let Some(first) = parsed.choices.into_iter().next() else {
            return Err(SummarizeError::Completion(
                "no response choices returned".into(),
            ));
        };

        let summary = first.message.content.unwrap_or_default();
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(SummarizeError::Completion("empty completion".into()));
        }
        Ok(summary.to_owned())
    }
}

/// Pull `error.message` out of an OpenAI-style error body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
