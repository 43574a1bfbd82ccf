//! Collaborator traits the resolution pipeline is written against.
//!
//! Concrete implementations live in the `showcount-db`, `showcount-geocode`
//! and `showcount-llm` crates; tests substitute in-memory fakes.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{CatalogShow, NewCatalogShow, NewVenue, Venue, VenueKey};
use crate::geocode::GeocodeResult;
use crate::model::RawShow;

/// Failure reported by the extraction or date-normalization collaborators.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// Network, TLS or timeout failure talking to the upstream service.
    #[error("transport error: {0}")]
    Transport(String),

    /// The upstream service rejected the request.
    #[error("upstream API error: {0}")]
    Api(String),

    /// The upstream service answered with something that could not be used.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Failure reported by a catalog store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert violated a uniqueness constraint; another writer won.
    #[error("uniqueness conflict on {constraint}")]
    Conflict { constraint: String },

    #[error("catalog store error: {0}")]
    Backend(String),
}

/// Turns raw text into an ordered list of show records.
#[async_trait]
pub trait ShowExtractor: Send + Sync {
    /// Extract show records from `text`, preserving source order.
    ///
    /// `hint` is free-form user context (e.g. a year range).
    async fn extract_shows(&self, text: &str, hint: &str)
        -> Result<Vec<RawShow>, CollaboratorError>;
}

/// Normalizes raw date strings to ISO `YYYY-MM-DD` in bulk.
#[async_trait]
pub trait DateNormalizer: Send + Sync {
    /// Returns one entry per input, positionally; `None` where no date
    /// could be determined. Implementations should return the same length
    /// as `dates` but callers must tolerate a mismatch.
    async fn normalize_dates(
        &self,
        dates: &[String],
        hint: &str,
    ) -> Result<Vec<Option<String>>, CollaboratorError>;
}

/// Resolves a venue name and locality hints to candidate places.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match first. Empty on no match and on any transport or auth
    /// failure; this call never fails.
    async fn geocode(&self, venue: &VenueKey) -> Vec<GeocodeResult>;
}

/// Shared catalog of venues and catalog shows.
///
/// Every write is a single-row insert; nothing is ever updated or deleted
/// through this trait.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Exact, NULL-aware lookup on `(name, city, state, country)`.
    async fn find_venue(&self, key: &VenueKey) -> Result<Option<Venue>, StoreError>;

    async fn insert_venue(&self, venue: &NewVenue) -> Result<Venue, StoreError>;

    /// Exact lookup on `(date, artist, venue_id)`.
    async fn find_catalog_show(
        &self,
        date: NaiveDate,
        artist: &str,
        venue_id: Uuid,
    ) -> Result<Option<CatalogShow>, StoreError>;

    /// Every `show_id` starting with `prefix`.
    async fn list_catalog_show_ids_with_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<String>, StoreError>;

    async fn insert_catalog_show(&self, show: &NewCatalogShow) -> Result<CatalogShow, StoreError>;
}
