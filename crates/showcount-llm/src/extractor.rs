//! Show extraction: free-form concert history text to [`RawShow`] records.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use showcount_core::{CollaboratorError, RawShow, ShowExtractor};

use crate::client::AnthropicClient;
use crate::json::strip_code_fences;

pub const DEFAULT_EXTRACTION_MODEL: &str = "claude-sonnet-4-20250514";
const MAX_TOKENS: u32 = 16_384;

const SYSTEM_PROMPT: &str = "\
You are a concert data parser. Given raw text containing a user's concert attendance history, \
extract every show into structured JSON.

Return a JSON array of objects. Each object represents one show attendance entry with these fields:
- \"date\": the raw date string exactly as written (e.g. \"1/30\", \"[[08-06-16]]\", \"2/5\", \"May 23, 2024\")
- \"artists\": array of artist/band names for this show entry. If multiple artists played the same \
show (openers, co-headliners, \"+\"), list them all. Parse \"Artist1 + Artist2\" as separate artists.
- \"venue\": the venue name exactly as written
- \"city\": city name if provided, empty string if not
- \"state\": state/province if provided, empty string if not
- \"country\": country if provided, empty string if not
- \"notes\": any additional notes, comments, or metadata (e.g. \"SOLD OUT\", festival name, special guests)
- \"rating\": any rating if provided, empty string if not

Rules:
- Preserve the original order of shows as they appear in the text
- For CSV/table formats, use column headers to map fields
- For \"City, State, Country\" location formats, split into separate fields
- For \"City, State\" (USA-style), infer country as \"USA\"
- For festival entries with date ranges (e.g. \"5/16-5/18\"), use the start date
- For Obsidian-style dates like [[08-06-16]], keep them as-is in the date field
- One entry per show attendance row. If the source lists separate rows per artist at the same \
festival day, keep them as separate entries
- Do NOT invent or assume data that isn't in the source text
- If a field is missing or unclear, use an empty string

Return ONLY the JSON array, no other text.";

/// Model output for one show. Every field is optional and `null` is
/// accepted wherever a string is expected.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExtractedShow {
    date: Option<String>,
    artists: Option<Vec<Option<String>>>,
    venue: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
    notes: Option<String>,
    rating: Option<String>,
}

impl ExtractedShow {
    fn into_raw(self) -> Option<RawShow> {
        let artists: Vec<String> = self
            .artists
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if artists.is_empty() {
            return None;
        }
        Some(RawShow {
            date: self.date.unwrap_or_default(),
            artists,
            venue: self.venue.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
            rating: self.rating.unwrap_or_default(),
        })
    }
}

/// Parse model output into show records.
///
/// Unparsable output yields an empty list; entries that are not objects or
/// carry no artist are dropped.
pub(crate) fn parse_shows(text: &str) -> Vec<RawShow> {
    let entries: Vec<serde_json::Value> = match serde_json::from_str(strip_code_fences(text)) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = %err, "extraction output was not a JSON array; treating as no shows");
            return Vec::new();
        }
    };

    let total = entries.len();
    let shows: Vec<RawShow> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            match serde_json::from_value::<ExtractedShow>(entry) {
                Ok(show) => show.into_raw().or_else(|| {
                    tracing::warn!(index, "dropping extracted show with no artists");
                    None
                }),
                Err(err) => {
                    tracing::warn!(index, error = %err, "dropping malformed extracted show");
                    None
                }
            }
        })
        .collect();

    if shows.len() < total {
        tracing::info!(kept = shows.len(), total, "filtered extracted shows");
    }
    shows
}

fn user_message(content: &str, hint: &str) -> String {
    let mut message = format!("Here is my concert history data:\n\n{content}");
    if !hint.trim().is_empty() {
        message.push_str("\n\nAdditional context: ");
        message.push_str(hint.trim());
    }
    message
}

/// [`ShowExtractor`] backed by a Claude model.
pub struct ClaudeShowExtractor {
    client: Arc<AnthropicClient>,
    model: String,
}

impl ClaudeShowExtractor {
    #[must_use]
    pub fn new(client: Arc<AnthropicClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ShowExtractor for ClaudeShowExtractor {
    async fn extract_shows(
        &self,
        text: &str,
        hint: &str,
    ) -> Result<Vec<RawShow>, CollaboratorError> {
        let output = self
            .client
            .complete(&self.model, MAX_TOKENS, SYSTEM_PROMPT, &user_message(text, hint))
            .await?;
        let shows = parse_shows(&output);
        tracing::info!(count = shows.len(), model = %self.model, "extracted shows from file");
        Ok(shows)
    }
}
