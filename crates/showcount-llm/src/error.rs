use showcount_core::CollaboratorError;
use thiserror::Error;

/// Errors returned by the Anthropic client and the collaborators built on it.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("Anthropic API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("ANTHROPIC_API_KEY is not configured")]
    MissingApiKey,

    /// A response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response carried no text content block.
    #[error("response contained no text content")]
    EmptyResponse,

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl From<LlmError> for CollaboratorError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) => CollaboratorError::Transport(e.to_string()),
            e @ (LlmError::Api { .. } | LlmError::MissingApiKey | LlmError::InvalidBaseUrl(_)) => {
                CollaboratorError::Api(e.to_string())
            }
            e @ (LlmError::Deserialize { .. } | LlmError::EmptyResponse) => {
                CollaboratorError::Malformed(e.to_string())
            }
        }
    }
}
