//! Bulk date normalization to ISO `YYYY-MM-DD`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use showcount_core::{CollaboratorError, DateNormalizer};

use crate::client::AnthropicClient;
use crate::json::strip_code_fences;

pub const DEFAULT_DATE_MODEL: &str = "claude-haiku-4-5-20251001";
const MAX_TOKENS: u32 = 4096;

const SYSTEM_PROMPT: &str = "\
You normalize raw date strings into ISO format (YYYY-MM-DD).

You will receive a JSON object with:
- \"dates\": array of raw date strings
- \"year_context\": optional year hint from the user (e.g. \"2025\", \"2024-2025\")

Rules:
- Convert each date to YYYY-MM-DD format
- If a date has no year and year_context provides one, use it
- If a date has no year and no year_context, return null
- For Obsidian dates like [[08-06-16]], interpret as MM-DD-YY
- For date ranges like \"5/16-5/18\", use the start date
- For ambiguous formats, prefer MM/DD (US-style)
- If a date cannot be parsed, return null

Return a JSON array of strings or nulls, same length and order as the input dates array.
Return ONLY the JSON array.";

#[derive(Serialize)]
struct NormalizeRequest<'a> {
    dates: &'a [String],
    year_context: &'a str,
}

/// [`DateNormalizer`] backed by a Claude model.
///
/// The returned list is not length-checked here.
pub struct ClaudeDateNormalizer {
    client: Arc<AnthropicClient>,
    model: String,
}

impl ClaudeDateNormalizer {
    #[must_use]
    pub fn new(client: Arc<AnthropicClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

pub(crate) fn parse_dates(text: &str) -> Result<Vec<Option<String>>, CollaboratorError> {
    serde_json::from_str(strip_code_fences(text))
        .map_err(|e| CollaboratorError::Malformed(format!("date normalization output: {e}")))
}

#[async_trait]
impl DateNormalizer for ClaudeDateNormalizer {
    async fn normalize_dates(
        &self,
        dates: &[String],
        hint: &str,
    ) -> Result<Vec<Option<String>>, CollaboratorError> {
        if dates.is_empty() {
            return Ok(Vec::new());
        }

        let payload = serde_json::to_string(&NormalizeRequest {
            dates,
            year_context: hint,
        })
        .map_err(|e| CollaboratorError::Malformed(e.to_string()))?;

        let output = self
            .client
            .complete(&self.model, MAX_TOKENS, SYSTEM_PROMPT, &payload)
            .await?;
        parse_dates(&output)
    }
}
