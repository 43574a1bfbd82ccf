//! Venue resolver behaviour against the in-memory catalog.

mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use showcount_core::{NewVenue, VenueKey, UNKNOWN_COUNTRY};
use showcount_resolver::{Resolution, ResolveError, VenueOutcome, VenueResolver};
use support::{msg_geocode, InMemoryCatalogStore, StubGeocoder};

const TIMEOUT: Duration = Duration::from_secs(5);

fn resolver(store: &Arc<InMemoryCatalogStore>, geocoder: &Arc<StubGeocoder>) -> VenueResolver {
    VenueResolver::new(store.clone(), geocoder.clone(), TIMEOUT, TIMEOUT)
}

#[tokio::test]
async fn empty_name_is_skipped_without_store_calls() {
    let store = Arc::new(InMemoryCatalogStore::new());
    let geocoder = Arc::new(StubGeocoder::empty());

    let outcome = resolver(&store, &geocoder)
        .resolve_venue("   ", Some("New York"), None, None)
        .await;

    assert!(matches!(outcome, Resolution::Skipped(_)));
    assert_eq!(store.venue_lookups.load(Ordering::SeqCst), 0);
    assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn existing_venue_is_reused_without_geocoding() {
    let store = Arc::new(InMemoryCatalogStore::new());
    let geocoder = Arc::new(StubGeocoder::returning(vec![msg_geocode()]));
    let seeded = store.seed_venue(&NewVenue::from_key(&VenueKey::new(
        "Red Rocks Amphitheatre",
        Some("Morrison"),
        Some("CO"),
        Some("USA"),
    )));
    let resolver = resolver(&store, &geocoder);

    for _ in 0..2 {
        let resolved = resolver
            .resolve_venue("Red Rocks Amphitheatre", Some("Morrison"), Some("CO"), Some("USA"))
            .await
            .ok()
            .expect("venue resolves");
        assert_eq!(resolved.id, seeded.id);
        assert_eq!(resolved.outcome, VenueOutcome::Existing);
    }

    assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.venue_inserts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn repeated_resolution_after_create_is_idempotent() {
    let store = Arc::new(InMemoryCatalogStore::new());
    let geocoder = Arc::new(StubGeocoder::empty());
    let resolver = resolver(&store, &geocoder);

    let first = resolver
        .resolve_venue("The Basement", Some("Columbus"), None, None)
        .await
        .ok()
        .expect("created");
    assert_eq!(first.outcome, VenueOutcome::CreatedWithoutGeocode);
    assert_eq!(store.venues()[0].country.as_deref(), Some(UNKNOWN_COUNTRY));

    // The stored row now answers to the defaulted country.
    let second = resolver
        .resolve_venue("The Basement", Some("Columbus"), None, Some(UNKNOWN_COUNTRY))
        .await
        .ok()
        .expect("found");
    assert_eq!(second.id, first.id);
    assert_eq!(second.outcome, VenueOutcome::Existing);
    assert_eq!(store.venues().len(), 1);
}

#[tokio::test]
async fn absent_hint_does_not_match_present_column() {
    let store = Arc::new(InMemoryCatalogStore::new());
    let geocoder = Arc::new(StubGeocoder::empty());
    let with_city = store.seed_venue(&NewVenue::from_key(&VenueKey::new(
        "The Fillmore",
        Some("San Francisco"),
        None,
        Some("USA"),
    )));

    let resolved = resolver(&store, &geocoder)
        .resolve_venue("The Fillmore", None, None, Some("USA"))
        .await
        .ok()
        .expect("created");

    assert_ne!(resolved.id, with_city.id);
    assert_eq!(store.venues().len(), 2);
}

#[tokio::test]
async fn geocoded_venue_is_enriched_from_best_match() {
    let store = Arc::new(InMemoryCatalogStore::new());
    let geocoder = Arc::new(StubGeocoder::returning(vec![msg_geocode()]));

    let resolved = resolver(&store, &geocoder)
        .resolve_venue("Madison Square Garden", None, Some("New York"), None)
        .await
        .ok()
        .expect("created");

    assert_eq!(resolved.outcome, VenueOutcome::CreatedWithGeocode);
    let venue = &store.venues()[0];
    assert_eq!(venue.city.as_deref(), Some("Manhattan"));
    assert_eq!(venue.state.as_deref(), Some("New York"));
    assert_eq!(venue.country.as_deref(), Some("United States"));
    assert_eq!(venue.google_place_id.as_deref(), Some("ChIJhRwB-yFawokR5Phil-QQ3zM"));
    assert!(venue.latitude.is_some());
}

#[tokio::test]
async fn recheck_finds_venue_created_while_geocoding() {
    let store = Arc::new(InMemoryCatalogStore::new());
    let geocoder = Arc::new(
        StubGeocoder::returning(vec![msg_geocode()])
            .synchronized(2, Duration::from_millis(100)),
    );
    let resolver = Arc::new(resolver(&store, &geocoder));

    let a = tokio::spawn({
        let resolver = Arc::clone(&resolver);
        async move {
            resolver
                .resolve_venue("Madison Square Garden", None, None, None)
                .await
                .ok()
        }
    });
    let b = tokio::spawn({
        let resolver = Arc::clone(&resolver);
        async move {
            resolver
                .resolve_venue("Madison Square Garden", None, None, None)
                .await
                .ok()
        }
    });

    let a = a.await.unwrap().expect("first resolves");
    let b = b.await.unwrap().expect("second resolves");

    assert_eq!(a.id, b.id);
    assert_eq!(store.venues().len(), 1);
    assert_eq!(store.venue_inserts.load(Ordering::SeqCst), 1);

    let mut outcomes = [a.outcome, b.outcome];
    outcomes.sort_by_key(|o| *o == VenueOutcome::ConcurrentlyCreated);
    assert_eq!(
        outcomes,
        [VenueOutcome::CreatedWithGeocode, VenueOutcome::ConcurrentlyCreated]
    );
}

#[tokio::test]
async fn insert_conflict_falls_back_to_winning_row() {
    let store = Arc::new(
        InMemoryCatalogStore::new()
            .with_unique_constraints()
            .with_blind_venue_lookups(2),
    );
    let geocoder = Arc::new(StubGeocoder::empty());
    let winner = store.seed_venue(&NewVenue::from_key(&VenueKey::new(
        "Brooklyn Bowl",
        Some("Brooklyn"),
        Some("NY"),
        Some("USA"),
    )));

    let resolved = resolver(&store, &geocoder)
        .resolve_venue("Brooklyn Bowl", Some("Brooklyn"), Some("NY"), Some("USA"))
        .await
        .ok()
        .expect("resolves to winner");

    assert_eq!(resolved.id, winner.id);
    assert_eq!(resolved.outcome, VenueOutcome::ConcurrentlyCreated);
    assert_eq!(store.venues().len(), 1);
}

#[tokio::test]
async fn conflict_without_readable_winner_fails() {
    let store = Arc::new(
        InMemoryCatalogStore::new()
            .with_unique_constraints()
            .with_blind_venue_lookups(3),
    );
    let geocoder = Arc::new(StubGeocoder::empty());
    store.seed_venue(&NewVenue::from_key(&VenueKey::new(
        "Brooklyn Bowl",
        None,
        None,
        Some("USA"),
    )));

    let outcome = resolver(&store, &geocoder)
        .resolve_venue("Brooklyn Bowl", None, None, Some("USA"))
        .await;

    assert!(matches!(
        outcome,
        Resolution::Failed(ResolveError::ConflictUnresolved { .. })
    ));
}
