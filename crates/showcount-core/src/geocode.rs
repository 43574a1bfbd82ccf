//! Provider-neutral geocoding results and address-component helpers.

use serde::{Deserialize, Serialize};

/// One component of a geocoded address (e.g. the locality or the country).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}

/// A geocoding match. Providers return these best match first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub place_id: String,
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address_components: Vec<AddressComponent>,
    /// Set by the provider when the match is low confidence.
    pub partial_match: bool,
}

/// Long name of the first `locality` or `sublocality` component.
#[must_use]
pub fn extract_city(components: &[AddressComponent]) -> Option<String> {
    components
        .iter()
        .find(|c| c.has_type("locality") || c.has_type("sublocality"))
        .map(|c| c.long_name.clone())
}

/// First `administrative_area_level_1` component, short name preferred.
#[must_use]
pub fn extract_state(components: &[AddressComponent]) -> Option<String> {
    components
        .iter()
        .find(|c| c.has_type("administrative_area_level_1"))
        .map(|c| {
            if c.short_name.is_empty() {
                c.long_name.clone()
            } else {
                c.short_name.clone()
            }
        })
}

/// Long name of the first `country` component, or `"Unknown"`.
#[must_use]
pub fn extract_country(components: &[AddressComponent]) -> String {
    components
        .iter()
        .find(|c| c.has_type("country"))
        .map_or_else(
            || crate::UNKNOWN_COUNTRY.to_string(),
            |c| c.long_name.clone(),
        )
}
