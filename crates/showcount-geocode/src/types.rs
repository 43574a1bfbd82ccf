//! Wire types for the Google Maps Geocoding API response.

use serde::Deserialize;
use showcount_core::{AddressComponent, GeocodeResult};

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<RawResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawResult {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub formatted_address: String,
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub partial_match: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl RawResult {
    /// `None` for results without coordinates.
    pub(crate) fn into_result(self) -> Option<GeocodeResult> {
        let location = self.geometry?.location;
        Some(GeocodeResult {
            place_id: self.place_id,
            formatted_address: self.formatted_address,
            latitude: location.lat,
            longitude: location.lng,
            address_components: self.address_components,
            partial_match: self.partial_match,
        })
    }
}
