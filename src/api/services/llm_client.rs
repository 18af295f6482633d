//! LLM chat-completion clients.
//!
//! Both upstream providers (diagram generation and prompt enhancement) speak
//! the OpenAI-style chat-completions wire shape, so one client covers both.
//! Each instance is configured independently from environment variables and
//! makes exactly one attempt per request - no retries, no timeout overrides.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::env;
use thiserror::Error;
use tracing::warn;

/// Errors from an LLM invocation.
#[derive(Debug, Error)]
pub enum LlmError {
    /// API key missing from the environment.
    #[error("Server configuration error: missing LLM API key")]
    NotConfigured,
    /// Upstream returned a non-success HTTP status.
    #[error("LLM service returned {status}: {message}")]
    Upstream { status: u16, message: String },
    /// Request never completed (DNS, TLS, connection reset).
    #[error("Failed to communicate with LLM service: {0}")]
    Network(String),
    /// Response arrived but had no completion text in it.
    #[error("No completion text in LLM response")]
    EmptyCompletion,
}

/// A text-completion backend. Abstracted so tests can substitute a counting
/// mock for the HTTP client.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Send one prompt, return the raw text of the first choice.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
pub struct ChatCompletionClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f64,
    max_tokens: Option<u32>,
}

impl ChatCompletionClient {
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: String,
        temperature: f64,
        max_tokens: Option<u32>,
    ) -> Self {
        if api_key.is_none() {
            warn!(model = %model, "LLM API key not configured; requests will fail");
        }
        Self {
            client: Client::new(),
            api_url,
            api_key,
            model,
            temperature,
            max_tokens,
        }
    }

    /// Generation backend, configured via GENERATION_API_URL / GENERATION_API_KEY /
    /// GENERATION_MODEL.
    pub fn generation_from_env() -> Self {
        let api_url = env::var("GENERATION_API_URL").unwrap_or_else(|_| {
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions".to_string()
        });
        let model = env::var("GENERATION_MODEL")
            .unwrap_or_else(|_| "gemini-2.5-flash-preview-05-20".to_string());
        Self::new(api_url, env::var("GENERATION_API_KEY").ok(), model, 0.3, None)
    }

    /// Enhancement backend, configured via ENHANCE_API_URL / ENHANCE_API_KEY /
    /// ENHANCE_MODEL. Short, bounded completions.
    pub fn enhancement_from_env() -> Self {
        let api_url = env::var("ENHANCE_API_URL")
            .unwrap_or_else(|_| "https://api.deepseek.com/v1/chat/completions".to_string());
        let model = env::var("ENHANCE_MODEL").unwrap_or_else(|_| "deepseek-chat".to_string());
        Self::new(
            api_url,
            env::var("ENHANCE_API_KEY").ok(),
            model,
            0.7,
            Some(200),
        )
    }
}

#[async_trait]
impl LlmBackend for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::NotConfigured)?;

        let mut request_body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": self.temperature,
        });
        if let Some(max_tokens) = self.max_tokens {
            request_body["max_tokens"] = json!(max_tokens);
        }

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Upstream { status, message });
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let content = response_json
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|c| c.as_str())
            .ok_or(LlmError::EmptyCompletion)?;

        Ok(content.to_string())
    }
}
