//! HTTP client for the Anthropic Messages API.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::retry::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for `POST /v1/messages`.
///
/// Transient failures are retried with back-off; see [`AnthropicClient::with_retry`].
pub struct AnthropicClient {
    client: Client,
    api_key: Option<String>,
    messages_url: Url,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl AnthropicClient {
    /// Creates a client pointed at `base_url` (the production API or a mock
    /// server). Retries default to none.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`LlmError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        api_key: Option<&str>,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("showcount/0.1 (show-import)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let messages_url = Url::parse(&normalised)
            .and_then(|u| u.join("v1/messages"))
            .map_err(|e| LlmError::InvalidBaseUrl(format!("'{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToOwned::to_owned),
            messages_url,
            retry: RetryPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.retry = RetryPolicy::new(max_retries, backoff_base_ms);
        self
    }

    /// Sends one user turn and returns the text of the first text block.
    ///
    /// # Errors
    ///
    /// - [`LlmError::MissingApiKey`] when no key is configured.
    /// - [`LlmError::Http`] on network failure.
    /// - [`LlmError::Api`] on a non-2xx status, after retries.
    /// - [`LlmError::Deserialize`] or [`LlmError::EmptyResponse`] when the
    ///   body has no usable text.
    pub async fn complete(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        user: &str,
    ) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let request = MessagesRequest {
            model,
            max_tokens,
            system,
            messages: [Message {
                role: "user",
                content: user,
            }],
        };

        let body = self
            .retry
            .run(|| self.send(api_key, &request))
            .await?;

        let response: MessagesResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Deserialize {
                context: format!("messages(model={model})"),
                source: e,
            })?;

        response
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or(LlmError::EmptyResponse)
    }

    async fn send(&self, api_key: &str, request: &MessagesRequest<'_>) -> Result<String, LlmError> {
        let response = self
            .client
            .post(self.messages_url.clone())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(LlmError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
