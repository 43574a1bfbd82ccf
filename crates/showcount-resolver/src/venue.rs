//! Find-or-create for venues.
//!
//! Lookup is exact and NULL-aware on `(name, city, state, country)`. On a
//! miss the venue is geocoded, missing locality hints are filled from the
//! best match, and the enriched key is looked up again right before the
//! insert so that a venue created concurrently is reused.

use std::sync::Arc;
use std::time::Duration;

use showcount_core::{
    extract_city, extract_country, extract_state, CatalogStore, GeocodeResult, Geocoder, NewVenue,
    StoreError, VenueKey,
};
use uuid::Uuid;

use crate::error::{ResolveError, Resolution};
use crate::store_call;

/// Which path produced a venue id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueOutcome {
    /// Found on the initial lookup.
    Existing,
    /// Another writer created it while this resolution was geocoding.
    ConcurrentlyCreated,
    CreatedWithGeocode,
    CreatedWithoutGeocode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedVenue {
    pub id: Uuid,
    pub outcome: VenueOutcome,
}

pub struct VenueResolver {
    store: Arc<dyn CatalogStore>,
    geocoder: Arc<dyn Geocoder>,
    store_timeout: Duration,
    geocode_timeout: Duration,
}

impl VenueResolver {
    #[must_use]
    pub fn new(
        store: Arc<dyn CatalogStore>,
        geocoder: Arc<dyn Geocoder>,
        store_timeout: Duration,
        geocode_timeout: Duration,
    ) -> Self {
        Self {
            store,
            geocoder,
            store_timeout,
            geocode_timeout,
        }
    }

    /// Resolve a venue name and optional locality hints to a venue id.
    ///
    /// Blank hints are treated as absent. An empty name is
    /// [`Resolution::Skipped`]; store failures come back as
    /// [`Resolution::Failed`] and geocoding failures only cost the
    /// enrichment.
    pub async fn resolve_venue(
        &self,
        name: &str,
        city: Option<&str>,
        state: Option<&str>,
        country: Option<&str>,
    ) -> Resolution<ResolvedVenue> {
        let key = VenueKey::new(name, city, state, country);
        if key.name.is_empty() {
            return Resolution::Skipped("venue name is empty");
        }

        let result = self.find_or_create(&key).await;
        if let Ok(resolved) = &result {
            tracing::debug!(
                venue = %key.name,
                venue_id = %resolved.id,
                outcome = ?resolved.outcome,
                "venue resolved"
            );
        }
        result.into()
    }

    async fn find_or_create(&self, key: &VenueKey) -> Result<ResolvedVenue, ResolveError> {
        if let Some(venue) = store_call(self.store_timeout, self.store.find_venue(key)).await? {
            return Ok(ResolvedVenue {
                id: venue.id,
                outcome: VenueOutcome::Existing,
            });
        }

        let results = match tokio::time::timeout(self.geocode_timeout, self.geocoder.geocode(key))
            .await
        {
            Ok(results) => results,
            Err(_) => {
                tracing::warn!(
                    venue = %key.name,
                    timeout = ?self.geocode_timeout,
                    "geocoding timed out; continuing without coordinates"
                );
                Vec::new()
            }
        };

        let prepared = prepare_venue(key, results.first());
        let created_outcome = if prepared.google_place_id.is_some() {
            VenueOutcome::CreatedWithGeocode
        } else {
            VenueOutcome::CreatedWithoutGeocode
        };

        // Race closure: the enriched key may now exist.
        let enriched = prepared.key();
        if let Some(venue) =
            store_call(self.store_timeout, self.store.find_venue(&enriched)).await?
        {
            return Ok(ResolvedVenue {
                id: venue.id,
                outcome: VenueOutcome::ConcurrentlyCreated,
            });
        }

        match store_call(self.store_timeout, self.store.insert_venue(&prepared)).await {
            Ok(venue) => Ok(ResolvedVenue {
                id: venue.id,
                outcome: created_outcome,
            }),
            Err(ResolveError::Store(StoreError::Conflict { constraint })) => {
                tracing::debug!(venue = %key.name, %constraint, "venue insert conflicted; reading winner");
                store_call(self.store_timeout, self.store.find_venue(&enriched))
                    .await?
                    .map(|venue| ResolvedVenue {
                        id: venue.id,
                        outcome: VenueOutcome::ConcurrentlyCreated,
                    })
                    .ok_or(ResolveError::ConflictUnresolved { constraint })
            }
            Err(err) => Err(err),
        }
    }
}

/// Build the insert payload for `key`, enriched from the best geocoding
/// match when there is one. Caller-supplied hints always win.
pub(crate) fn prepare_venue(key: &VenueKey, best: Option<&GeocodeResult>) -> NewVenue {
    let mut venue = NewVenue::from_key(key);
    let Some(best) = best else {
        return venue;
    };

    if best.partial_match {
        tracing::warn!(venue = %key.name, place_id = %best.place_id, "partial geocoding match for venue");
    }

    let components = &best.address_components;
    if venue.city.is_none() {
        venue.city = extract_city(components);
    }
    if venue.state.is_none() {
        venue.state = extract_state(components);
    }
    if key.country.is_none() {
        venue.country = extract_country(components);
    }
    venue.latitude = Some(best.latitude);
    venue.longitude = Some(best.longitude);
    venue.google_place_id = Some(best.place_id.clone());
    venue.google_formatted_address = Some(best.formatted_address.clone());
    venue
}
