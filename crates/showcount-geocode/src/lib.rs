//! Google Maps geocoding for venue resolution.
//!
//! [`GoogleGeocoder`] implements [`showcount_core::Geocoder`]. Without an API
//! key it is a no-op that returns no matches.

pub mod client;
pub mod error;
pub(crate) mod types;

pub use client::GoogleGeocoder;
pub use error::GeocodeError;
