//! DeepSeek API client.
//!
//! Speaks the OpenAI-compatible chat-completions protocol. The completion
//! request has no timeout so long replies can stream for as long as they
//! take; the model listing uses the configured short timeout.

use std::time::Duration;

use async_trait::async_trait;
use deepchat_types::Message;
use reqwest::{Client, Response, header};
use tracing::{debug, trace};

use crate::backend::ChatBackend;
use crate::error::{LlmError, Result};
use crate::sse::{self, LineStream};
use crate::types::{ChatRequest, ModelList};

/// Default timeout for the short, non-streaming calls.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the DeepSeek client.
#[derive(Clone)]
pub struct DeepSeekConfig {
    /// Bearer credential.
    pub api_key: String,

    /// Base URL for the API, without a trailing slash.
    pub base_url: String,

    /// Timeout for the model listing.
    pub request_timeout: Duration,

    /// Name for this backend instance.
    pub name: String,
}

impl DeepSeekConfig {
    /// A config for `base_url`. A trailing `/` is dropped.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            name: "deepseek".to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl std::fmt::Debug for DeepSeekConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("name", &self.name)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DeepSeek Client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for DeepSeek's OpenAI-compatible API.
pub struct DeepSeekClient {
    client: Client,
    config: DeepSeekConfig,
}

impl DeepSeekClient {
    pub fn new(config: DeepSeekConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Config("API key is empty".to_string()));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.config.base_url)
    }

    /// Add authentication headers to a request.
    fn add_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
    }
}

/// Turn a non-success response into an [`LlmError::Api`] carrying the body.
pub(crate) async fn handle_error_response(response: Response) -> LlmError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!(status = %status, body = %body, "API error response");
    LlmError::Api {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl ChatBackend for DeepSeekClient {
    async fn stream_chat(&self, model: &str, messages: &[Message]) -> Result<LineStream> {
        let request = ChatRequest::streaming(model, messages);

        debug!(
            backend = %self.config.name,
            model = %model,
            messages = messages.len(),
            "Sending chat completion request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            trace!(body = %serde_json::to_string(&request)?, "Request body");
        }

        let response = self
            .add_headers(self.client.post(self.completions_url()))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        trace!(status = %status, headers = ?response.headers(), "Response received");
        if !status.is_success() {
            return Err(handle_error_response(response).await);
        }

        Ok(sse::lines(response.bytes_stream()))
    }

    async fn list_models(&self) -> Result<ModelList> {
        debug!(backend = %self.config.name, "Listing models");

        let response = self
            .add_headers(self.client.get(self.models_url()))
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(handle_error_response(response).await);
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
