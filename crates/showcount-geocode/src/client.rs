//! HTTP client for the Google Maps Geocoding API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use showcount_core::{GeocodeResult, Geocoder, VenueKey};

use crate::error::GeocodeError;
use crate::types::GeocodeResponse;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";
const GEOCODE_PATH: &str = "maps/api/geocode/json";

/// Client for the Google Maps Geocoding API.
///
/// Use [`GoogleGeocoder::new`] for production or
/// [`GoogleGeocoder::with_base_url`] to point at a mock server in tests.
pub struct GoogleGeocoder {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
}

impl GoogleGeocoder {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: Option<&str>, timeout_secs: u64) -> Result<Self, GeocodeError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`GeocodeError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: Option<&str>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("showcount/0.1 (venue-geocoding)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| GeocodeError::InvalidBaseUrl(format!("'{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToOwned::to_owned),
            base_url,
        })
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Geocodes a venue from its name and locality hints, best match first.
    ///
    /// Returns an empty list without any request when no API key is set.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Http`] on network failure or non-2xx HTTP status.
    /// - [`GeocodeError::ApiError`] when `status` is not `OK`/`ZERO_RESULTS`.
    /// - [`GeocodeError::Deserialize`] if the body has an unexpected shape.
    pub async fn geocode_venue(&self, key: &VenueKey) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(Vec::new());
        };

        let address = key.address_query();
        let url = self.build_url(&address, api_key)?;
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("geocode(address={address})"),
                source: e,
            })?;

        match response.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(response
                .results
                .into_iter()
                .filter_map(crate::types::RawResult::into_result)
                .collect()),
            _ => Err(GeocodeError::ApiError {
                message: response.error_message.unwrap_or_default(),
                status: response.status,
            }),
        }
    }

    fn build_url(&self, address: &str, api_key: &str) -> Result<Url, GeocodeError> {
        let mut url = self
            .base_url
            .join(GEOCODE_PATH)
            .map_err(|e| GeocodeError::InvalidBaseUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", api_key);
        Ok(url)
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, venue: &VenueKey) -> Vec<GeocodeResult> {
        match self.geocode_venue(venue).await {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(venue = %venue.name, error = %err, "geocoding failed; continuing without coordinates");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
