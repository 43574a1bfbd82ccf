use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A show record as extracted from free-form text, before any resolution.
///
/// Fields are kept exactly as written in the source; empty strings mean the
/// value was not present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawShow {
    /// Date as written, unparsed (e.g. `"1/30"`, `"[[08-06-16]]"`).
    pub date: String,
    pub artists: Vec<String>,
    pub venue: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub notes: String,
    pub rating: String,
}

/// A fully resolved show, the unit the pipeline emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedShow {
    /// Position of the record in the extracted input, starting at 0.
    pub order: usize,
    /// ISO `YYYY-MM-DD` date, absent when normalization failed.
    pub date: Option<String>,
    pub artists: Vec<String>,
    /// Catalog show ids in artist order; absent when nothing resolved.
    pub show_ids: Option<Vec<String>>,
    pub venue_id: Option<Uuid>,
    pub notes: Option<String>,
    pub rating: Option<String>,
}

impl ResolvedShow {
    /// Build an output record carrying only the unresolved fields of `raw`.
    ///
    /// Used both as the starting point for a successful resolution and as
    /// the degraded result when resolution of the record fails.
    #[must_use]
    pub fn unresolved(order: usize, raw: &RawShow, date: Option<String>) -> Self {
        Self {
            order,
            date,
            artists: raw.artists.clone(),
            show_ids: None,
            venue_id: None,
            notes: non_empty(&raw.notes),
            rating: non_empty(&raw.rating),
        }
    }
}

/// Trim `value` and return it, or `None` when nothing is left.
#[must_use]
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
