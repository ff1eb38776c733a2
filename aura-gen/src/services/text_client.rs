//! Text-generation client
//!
//! The orchestrator receives this as an injected capability, so tests can
//! substitute deterministic doubles for the hosted model. The production
//! implementation talks to an OpenAI-compatible chat-completions endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

const USER_AGENT: &str = "AuraRadio/0.1.0 (https://github.com/auraradio/aura)";
const RATE_LIMIT_MS: u64 = 1000; // 1 request per second
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Longest prompt the completion endpoint accepts from us, in characters.
/// `submit` rejects anything longer before a job is created.
pub const MAX_PROMPT_LEN: usize = 4000;

/// Text-generation client errors
#[derive(Debug, Error)]
pub enum TextGenError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Capability to turn a prompt into free-form text.
///
/// No contract on output shape; the suggestion parser deals with whatever
/// comes back.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, TextGenError>;
}

/// Rate limiter enforcing 1 request/second
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat-completions endpoint
pub struct CompletionClient {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    rate_limiter: Arc<RateLimiter>,
}

impl CompletionClient {
    pub fn new(endpoint: String, model: String, api_key: String) -> Result<Self, TextGenError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| TextGenError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            model,
            api_key,
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
        })
    }
}

#[async_trait]
impl TextGeneration for CompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, TextGenError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(url = %url, model = %self.model, "Requesting completion");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TextGenError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TextGenError::ApiError(status.as_u16(), body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| TextGenError::ParseError(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TextGenError::ParseError("Response contained no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_serializes_expected_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn chat_response_extracts_first_choice() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"hi there"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "hi there");
    }
}
