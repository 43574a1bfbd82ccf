//! Anthropic Messages API collaborators: show extraction and bulk date
//! normalization.

pub mod client;
pub mod dates;
pub mod error;
pub mod extractor;
pub(crate) mod json;
pub mod retry;

pub use client::AnthropicClient;
pub use dates::ClaudeDateNormalizer;
pub use error::LlmError;
pub use extractor::ClaudeShowExtractor;
pub use retry::RetryPolicy;
