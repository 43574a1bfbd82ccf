//! Entities owned by the shared catalog: venues and catalog shows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Country recorded for a venue whose country could not be determined.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Lookup key for a venue.
///
/// Equality is NULL-aware: an absent `city` only matches a venue whose
/// `city` is also absent, never acts as a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VenueKey {
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl VenueKey {
    /// Build a key, trimming every field and treating blank hints as absent.
    #[must_use]
    pub fn new(name: &str, city: Option<&str>, state: Option<&str>, country: Option<&str>) -> Self {
        let hint = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
        };
        Self {
            name: name.trim().to_string(),
            city: hint(city),
            state: hint(state),
            country: hint(country),
        }
    }

    /// Free-text geocoding query: the non-empty parts joined with `", "`.
    #[must_use]
    pub fn address_query(&self) -> String {
        [
            Some(self.name.as_str()),
            self.city.as_deref(),
            self.state.as_deref(),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// A row from the `venues` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub google_place_id: Option<String>,
    pub google_formatted_address: Option<String>,
    pub osm_place_id: Option<String>,
    pub osm_display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Venue {
    /// The lookup key this venue answers to.
    #[must_use]
    pub fn key(&self) -> VenueKey {
        VenueKey {
            name: self.name.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
        }
    }
}

/// Insert payload for a venue. The catalog assigns `id` and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVenue {
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub google_place_id: Option<String>,
    pub google_formatted_address: Option<String>,
    pub osm_place_id: Option<String>,
    pub osm_display_name: Option<String>,
}

impl NewVenue {
    /// A venue with the caller's hints only and no geocoding provenance.
    ///
    /// The country falls back to [`UNKNOWN_COUNTRY`].
    #[must_use]
    pub fn from_key(key: &VenueKey) -> Self {
        Self {
            name: key.name.clone(),
            city: key.city.clone(),
            state: key.state.clone(),
            country: key
                .country
                .clone()
                .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
            latitude: None,
            longitude: None,
            google_place_id: None,
            google_formatted_address: None,
            osm_place_id: None,
            osm_display_name: None,
        }
    }

    /// The lookup key the inserted row will answer to.
    #[must_use]
    pub fn key(&self) -> VenueKey {
        VenueKey {
            name: self.name.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: Some(self.country.clone()),
        }
    }
}

/// A row from the `catalog_shows` table: one artist on one date at one venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogShow {
    pub id: Uuid,
    pub show_id: String,
    pub date: NaiveDate,
    pub artist: String,
    pub venue_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a catalog show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCatalogShow {
    pub show_id: String,
    pub date: NaiveDate,
    pub artist: String,
    pub venue_id: Uuid,
}
