//! Deterministic identity for catalog shows.
//!
//! A catalog show id has the shape `{date}-{artist-slug}-{venue_id}[-{sequence}]`.
//! Ids are reproducible from their inputs so that two writers deriving the
//! same base id can detect each other through a prefix scan of the catalog.

use chrono::NaiveDate;
use uuid::Uuid;

/// Normalize an artist name into a kebab-case slug.
///
/// Lower-cases the input, collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, and strips leading and trailing dashes.
/// The result is either empty or matches `^[a-z0-9]+(-[a-z0-9]+)*$`, so
/// applying the function twice yields the same slug.
///
/// ```
/// use showcount_core::normalize_artist_slug;
///
/// assert_eq!(normalize_artist_slug("Trey Anastasio"), "trey-anastasio");
/// assert_eq!(normalize_artist_slug("moe."), "moe");
/// assert_eq!(normalize_artist_slug("AC/DC"), "ac-dc");
/// ```
#[must_use]
pub fn normalize_artist_slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;

    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Compose a catalog show id from its parts.
///
/// A `sequence` of `None` or `Some(0)` yields the unsequenced base id.
#[must_use]
pub fn derive_catalog_show_id(
    date: &str,
    artist: &str,
    venue_id: &str,
    sequence: Option<u32>,
) -> String {
    let base = format!("{date}-{}-{venue_id}", normalize_artist_slug(artist));
    match sequence {
        Some(seq) if seq > 0 => format!("{base}-{seq}"),
        _ => base,
    }
}

/// Returns the sequence number `id` carries relative to `base`.
///
/// `Some(0)` when `id` is the base id itself, `Some(n)` when it is
/// `{base}-{n}`, and `None` for anything else (including ids that merely
/// share `base` as a textual prefix).
#[must_use]
pub fn sequence_of(id: &str, base: &str) -> Option<u32> {
    let rest = id.strip_prefix(base)?;
    if rest.is_empty() {
        return Some(0);
    }
    let digits = rest.strip_prefix('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Components recovered from a catalog show id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedShowId {
    pub date: NaiveDate,
    pub artist_slug: String,
    pub venue_id: Uuid,
    pub sequence: Option<u32>,
}

/// Split a catalog show id back into its components.
///
/// The venue id is expected to be a hyphenated UUID (five groups). Returns
/// `None` when the date, artist slug, or venue id cannot be recovered.
#[must_use]
pub fn parse_catalog_show_id(id: &str) -> Option<ParsedShowId> {
    let parts: Vec<&str> = id.split('-').collect();
    // date (3) + at least one slug segment + uuid (5)
    if parts.len() < 9 {
        return None;
    }

    let date = NaiveDate::parse_from_str(&parts[..3].join("-"), "%Y-%m-%d").ok()?;

    let venue_at = |end: usize| -> Option<Uuid> {
        if end < 9 {
            return None;
        }
        Uuid::parse_str(&parts[end - 5..end].join("-")).ok()
    };

    let last = parts[parts.len() - 1];
    let sequenced = !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit());

    let (venue_end, sequence) = match (sequenced, venue_at(parts.len() - 1)) {
        (true, Some(_)) => (parts.len() - 1, Some(last.parse::<u32>().ok()?)),
        _ => (parts.len(), None),
    };

    let venue_id = venue_at(venue_end)?;
    let artist_slug = parts[3..venue_end - 5].join("-");
    if artist_slug.is_empty() {
        return None;
    }

    Some(ParsedShowId {
        date,
        artist_slug,
        venue_id,
        sequence,
    })
}
