//! Shared domain model for showcount.
//!
//! Holds the record types that flow through the resolution pipeline, the
//! deterministic identity helpers for catalog shows, the geocoding result
//! model, the collaborator traits the pipeline is written against, and the
//! environment-driven application config.

mod app_config;
mod config;

pub mod catalog;
pub mod geocode;
pub mod identity;
pub mod model;
pub mod ports;
pub mod text;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{CatalogShow, NewCatalogShow, NewVenue, Venue, VenueKey, UNKNOWN_COUNTRY};
pub use config::{load_app_config, load_app_config_from_env};
pub use geocode::{extract_city, extract_country, extract_state, AddressComponent, GeocodeResult};
pub use identity::{
    derive_catalog_show_id, normalize_artist_slug, parse_catalog_show_id, sequence_of, ParsedShowId,
};
pub use model::{non_empty, RawShow, ResolvedShow};
pub use ports::{CatalogStore, CollaboratorError, DateNormalizer, Geocoder, ShowExtractor, StoreError};
pub use text::{extract_text, UnsupportedFormat};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
