//! In-memory fakes of the pipeline's collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use showcount_core::{
    AddressComponent, CatalogShow, CatalogStore, CollaboratorError, DateNormalizer, GeocodeResult,
    Geocoder, NewCatalogShow, NewVenue, RawShow, ShowExtractor, StoreError, Venue, VenueKey,
};
use tokio::sync::Barrier;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Catalog store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    venues: Vec<Venue>,
    shows: Vec<CatalogShow>,
}

/// Catalog store backed by two vectors.
///
/// Knobs simulate a racing writer: lookups can be made to miss a fixed
/// number of times, uniqueness can be enforced like the Postgres schema,
/// and every call can sleep a random duration.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    tables: Mutex<Tables>,
    enforce_unique: bool,
    max_delay_ms: u64,
    blind_venue_lookups: AtomicUsize,
    blind_show_lookups: AtomicUsize,
    blind_prefix_scans: AtomicUsize,
    failing_artist: Option<String>,
    pub venue_lookups: AtomicUsize,
    pub venue_inserts: AtomicUsize,
    pub show_inserts: AtomicUsize,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject duplicate venues and duplicate show ids or triples.
    pub fn with_unique_constraints(mut self) -> Self {
        self.enforce_unique = true;
        self
    }

    /// Sleep up to `max_delay_ms` before every call.
    pub fn with_random_delays(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// The next `n` venue lookups report no match.
    pub fn with_blind_venue_lookups(self, n: usize) -> Self {
        self.blind_venue_lookups.store(n, Ordering::SeqCst);
        self
    }

    /// The next `n` catalog show lookups report no match.
    pub fn with_blind_show_lookups(self, n: usize) -> Self {
        self.blind_show_lookups.store(n, Ordering::SeqCst);
        self
    }

    /// The next `n` prefix scans come back empty.
    pub fn with_blind_prefix_scans(self, n: usize) -> Self {
        self.blind_prefix_scans.store(n, Ordering::SeqCst);
        self
    }

    /// Inserting a catalog show for `artist` fails with a backend error.
    pub fn failing_inserts_for(mut self, artist: &str) -> Self {
        self.failing_artist = Some(artist.to_string());
        self
    }

    pub fn seed_venue(&self, venue: &NewVenue) -> Venue {
        let row = venue_row(venue);
        self.tables.lock().unwrap().venues.push(row.clone());
        row
    }

    pub fn seed_show(&self, show: &NewCatalogShow) -> CatalogShow {
        let row = show_row(show);
        self.tables.lock().unwrap().shows.push(row.clone());
        row
    }

    pub fn venues(&self) -> Vec<Venue> {
        self.tables.lock().unwrap().venues.clone()
    }

    pub fn shows(&self) -> Vec<CatalogShow> {
        self.tables.lock().unwrap().shows.clone()
    }

    async fn maybe_sleep(&self) {
        if self.max_delay_ms > 0 {
            let delay = rand::random_range(0..=self.max_delay_ms);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

/// Decrement `counter` if positive; true when a blind call was consumed.
fn take_blind(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn venue_row(venue: &NewVenue) -> Venue {
    let now = Utc::now();
    Venue {
        id: Uuid::new_v4(),
        name: venue.name.clone(),
        city: venue.city.clone(),
        state: venue.state.clone(),
        country: Some(venue.country.clone()),
        latitude: venue.latitude,
        longitude: venue.longitude,
        google_place_id: venue.google_place_id.clone(),
        google_formatted_address: venue.google_formatted_address.clone(),
        osm_place_id: venue.osm_place_id.clone(),
        osm_display_name: venue.osm_display_name.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn show_row(show: &NewCatalogShow) -> CatalogShow {
    let now = Utc::now();
    CatalogShow {
        id: Uuid::new_v4(),
        show_id: show.show_id.clone(),
        date: show.date,
        artist: show.artist.clone(),
        venue_id: show.venue_id,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn find_venue(&self, key: &VenueKey) -> Result<Option<Venue>, StoreError> {
        self.maybe_sleep().await;
        self.venue_lookups.fetch_add(1, Ordering::SeqCst);
        if take_blind(&self.blind_venue_lookups) {
            return Ok(None);
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables.venues.iter().find(|v| v.key() == *key).cloned())
    }

    async fn insert_venue(&self, venue: &NewVenue) -> Result<Venue, StoreError> {
        self.maybe_sleep().await;
        self.venue_inserts.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables.lock().unwrap();
        let key = venue.key();
        if self.enforce_unique && tables.venues.iter().any(|v| v.key() == key) {
            return Err(StoreError::Conflict {
                constraint: "venues_identity_key".to_string(),
            });
        }
        let row = venue_row(venue);
        tables.venues.push(row.clone());
        Ok(row)
    }

    async fn find_catalog_show(
        &self,
        date: NaiveDate,
        artist: &str,
        venue_id: Uuid,
    ) -> Result<Option<CatalogShow>, StoreError> {
        self.maybe_sleep().await;
        if take_blind(&self.blind_show_lookups) {
            return Ok(None);
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .shows
            .iter()
            .find(|s| s.date == date && s.artist == artist && s.venue_id == venue_id)
            .cloned())
    }

    async fn list_catalog_show_ids_with_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<String>, StoreError> {
        self.maybe_sleep().await;
        if take_blind(&self.blind_prefix_scans) {
            return Ok(Vec::new());
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .shows
            .iter()
            .filter(|s| s.show_id.starts_with(prefix))
            .map(|s| s.show_id.clone())
            .collect())
    }

    async fn insert_catalog_show(&self, show: &NewCatalogShow) -> Result<CatalogShow, StoreError> {
        self.maybe_sleep().await;
        self.show_inserts.fetch_add(1, Ordering::SeqCst);
        if self.failing_artist.as_deref() == Some(show.artist.as_str()) {
            return Err(StoreError::Backend("connection reset".to_string()));
        }
        let mut tables = self.tables.lock().unwrap();
        if self.enforce_unique {
            if tables.shows.iter().any(|s| s.show_id == show.show_id) {
                return Err(StoreError::Conflict {
                    constraint: "catalog_shows_show_id_key".to_string(),
                });
            }
            if tables.shows.iter().any(|s| {
                s.date == show.date && s.artist == show.artist && s.venue_id == show.venue_id
            }) {
                return Err(StoreError::Conflict {
                    constraint: "catalog_shows_identity_key".to_string(),
                });
            }
        }
        let row = show_row(show);
        tables.shows.push(row.clone());
        Ok(row)
    }
}

// ---------------------------------------------------------------------------
// Geocoder
// ---------------------------------------------------------------------------

/// Returns the same results for every query.
#[derive(Default)]
pub struct StubGeocoder {
    results: Vec<GeocodeResult>,
    panic_on: Option<String>,
    barrier: Option<Arc<Barrier>>,
    stagger: Duration,
    pub calls: AtomicUsize,
}

impl StubGeocoder {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn returning(results: Vec<GeocodeResult>) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }

    /// Panic when asked to geocode a venue named `name`.
    pub fn panicking_on(mut self, name: &str) -> Self {
        self.panic_on = Some(name.to_string());
        self
    }

    /// Hold every caller until `parties` callers are inside `geocode`, then
    /// release them with each later caller delayed by a further `stagger`.
    pub fn synchronized(mut self, parties: usize, stagger: Duration) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(parties)));
        self.stagger = stagger;
        self
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, venue: &VenueKey) -> Vec<GeocodeResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(
            self.panic_on.as_deref() != Some(venue.name.as_str()),
            "geocoder exploded on {}",
            venue.name
        );
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
            let factor = u32::try_from(call).unwrap_or(u32::MAX);
            tokio::time::sleep(self.stagger * factor).await;
        }
        self.results.clone()
    }
}

pub fn component(long: &str, short: &str, types: &[&str]) -> AddressComponent {
    AddressComponent {
        long_name: long.to_string(),
        short_name: short.to_string(),
        types: types.iter().map(|t| (*t).to_string()).collect(),
    }
}

pub fn msg_geocode() -> GeocodeResult {
    GeocodeResult {
        place_id: "ChIJhRwB-yFawokR5Phil-QQ3zM".to_string(),
        formatted_address: "4 Pennsylvania Plaza, New York, NY 10001, USA".to_string(),
        latitude: 40.750_504_5,
        longitude: -73.993_438_7,
        address_components: vec![
            component("Manhattan", "Manhattan", &["sublocality", "political"]),
            component("New York", "New York", &["locality", "political"]),
            component("New York", "NY", &["administrative_area_level_1", "political"]),
            component("United States", "US", &["country", "political"]),
        ],
        partial_match: false,
    }
}

// ---------------------------------------------------------------------------
// Extractor and date normalizer
// ---------------------------------------------------------------------------

pub struct StubExtractor {
    shows: Option<Vec<RawShow>>,
    pub calls: AtomicUsize,
}

impl StubExtractor {
    pub fn returning(shows: Vec<RawShow>) -> Self {
        Self {
            shows: Some(shows),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            shows: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ShowExtractor for StubExtractor {
    async fn extract_shows(
        &self,
        _text: &str,
        _hint: &str,
    ) -> Result<Vec<RawShow>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.shows
            .clone()
            .ok_or_else(|| CollaboratorError::Api("model unavailable".to_string()))
    }
}

pub enum StubNormalizer {
    /// Echo every input date back unchanged.
    Echo(AtomicUsize),
    /// Return a fixed list regardless of input.
    Fixed(Vec<Option<String>>),
    Failing,
}

impl StubNormalizer {
    pub fn echo() -> Self {
        Self::Echo(AtomicUsize::new(0))
    }

    pub fn calls(&self) -> usize {
        match self {
            Self::Echo(calls) => calls.load(Ordering::SeqCst),
            Self::Fixed(_) | Self::Failing => 0,
        }
    }
}

#[async_trait]
impl DateNormalizer for StubNormalizer {
    async fn normalize_dates(
        &self,
        dates: &[String],
        _hint: &str,
    ) -> Result<Vec<Option<String>>, CollaboratorError> {
        match self {
            Self::Echo(calls) => {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(dates.iter().cloned().map(Some).collect())
            }
            Self::Fixed(dates) => Ok(dates.clone()),
            Self::Failing => Err(CollaboratorError::Transport("connection refused".to_string())),
        }
    }
}

pub fn raw_show(date: &str, artists: &[&str], venue: &str) -> RawShow {
    RawShow {
        date: date.to_string(),
        artists: artists.iter().map(|a| (*a).to_string()).collect(),
        venue: venue.to_string(),
        ..RawShow::default()
    }
}
