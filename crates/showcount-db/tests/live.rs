//! Live integration tests for showcount-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/showcount-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use chrono::NaiveDate;
use showcount_core::{CatalogStore, NewCatalogShow, NewVenue, StoreError, VenueKey};
use showcount_db::{
    find_catalog_show, find_venue, insert_catalog_show, insert_venue,
    list_catalog_show_ids_with_prefix, PgCatalogStore,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_venue(name: &str, city: Option<&str>, state: Option<&str>, country: &str) -> NewVenue {
    NewVenue::from_key(&VenueKey::new(name, city, state, Some(country)))
}

// ---------------------------------------------------------------------------
// venues
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn find_venue_matches_absent_columns_only_against_null(pool: sqlx::PgPool) {
    let with_city = insert_venue(&pool, &new_venue("The Fillmore", Some("San Francisco"), Some("CA"), "United States"))
        .await
        .expect("insert with city");
    let without_city = insert_venue(&pool, &new_venue("The Fillmore", None, Some("CA"), "United States"))
        .await
        .expect("insert without city");

    let found = find_venue(
        &pool,
        &VenueKey::new("The Fillmore", None, Some("CA"), Some("United States")),
    )
    .await
    .expect("find")
    .expect("venue present");
    assert_eq!(found.id, without_city.id);

    let found = find_venue(
        &pool,
        &VenueKey::new("The Fillmore", Some("San Francisco"), Some("CA"), Some("United States")),
    )
    .await
    .expect("find")
    .expect("venue present");
    assert_eq!(found.id, with_city.id);

    let missing = find_venue(&pool, &VenueKey::new("The Fillmore", None, None, None))
        .await
        .expect("find");
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_venue_insert_is_reported_as_conflict(pool: sqlx::PgPool) {
    let store = PgCatalogStore::new(pool);
    let venue = new_venue("Red Rocks Amphitheatre", Some("Morrison"), None, "United States");

    store.insert_venue(&venue).await.expect("first insert");
    let err = store.insert_venue(&venue).await.unwrap_err();

    match err {
        StoreError::Conflict { constraint } => assert_eq!(constraint, "venues_identity_key"),
        other @ StoreError::Backend(_) => panic!("expected conflict, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// catalog_shows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn catalog_show_round_trips_through_triple_lookup(pool: sqlx::PgPool) {
    let venue = insert_venue(&pool, &new_venue("MSG", Some("New York"), Some("NY"), "United States"))
        .await
        .expect("insert venue");
    let show_id = format!("2024-05-01-phish-{}", venue.id);

    let inserted = insert_catalog_show(
        &pool,
        &NewCatalogShow {
            show_id: show_id.clone(),
            date: date(2024, 5, 1),
            artist: "Phish".to_string(),
            venue_id: venue.id,
        },
    )
    .await
    .expect("insert show");

    let found = find_catalog_show(&pool, date(2024, 5, 1), "Phish", venue.id)
        .await
        .expect("find")
        .expect("show present");
    assert_eq!(found.id, inserted.id);
    assert_eq!(found.show_id, show_id);

    let other_date = find_catalog_show(&pool, date(2024, 5, 2), "Phish", venue.id)
        .await
        .expect("find");
    assert!(other_date.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn catalog_show_constraints_surface_as_conflicts(pool: sqlx::PgPool) {
    let store = PgCatalogStore::new(pool);
    let venue = store
        .insert_venue(&new_venue("MSG", Some("New York"), Some("NY"), "United States"))
        .await
        .expect("insert venue");
    let base = format!("2024-05-01-phish-{}", venue.id);
    let show = NewCatalogShow {
        show_id: base.clone(),
        date: date(2024, 5, 1),
        artist: "Phish".to_string(),
        venue_id: venue.id,
    };
    store.insert_catalog_show(&show).await.expect("first insert");

    let same_triple = NewCatalogShow {
        show_id: format!("{base}-1"),
        ..show.clone()
    };
    match store.insert_catalog_show(&same_triple).await.unwrap_err() {
        StoreError::Conflict { constraint } => {
            assert_eq!(constraint, "catalog_shows_identity_key");
        }
        other @ StoreError::Backend(_) => panic!("expected conflict, got {other:?}"),
    }

    let same_id = NewCatalogShow {
        artist: "phish".to_string(),
        ..show
    };
    match store.insert_catalog_show(&same_id).await.unwrap_err() {
        StoreError::Conflict { constraint } => {
            assert_eq!(constraint, "catalog_shows_show_id_key");
        }
        other @ StoreError::Backend(_) => panic!("expected conflict, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn prefix_scan_returns_matching_ids_in_order(pool: sqlx::PgPool) {
    let venue = insert_venue(&pool, &new_venue("MSG", Some("New York"), Some("NY"), "United States"))
        .await
        .expect("insert venue");
    let base = format!("2024-05-01-phish-{}", venue.id);

    for (artist, show_id) in [
        ("Phish", base.clone()),
        ("PHISH", format!("{base}-1")),
        ("Phish!", format!("{base}-2")),
    ] {
        insert_catalog_show(
            &pool,
            &NewCatalogShow {
                show_id,
                date: date(2024, 5, 1),
                artist: artist.to_string(),
                venue_id: venue.id,
            },
        )
        .await
        .expect("insert show");
    }
    insert_catalog_show(
        &pool,
        &NewCatalogShow {
            show_id: format!("2024-05-02-phish-{}", venue.id),
            date: date(2024, 5, 2),
            artist: "Phish".to_string(),
            venue_id: venue.id,
        },
    )
    .await
    .expect("insert other date");

    let ids = list_catalog_show_ids_with_prefix(&pool, &base)
        .await
        .expect("prefix scan");
    assert_eq!(ids, vec![base.clone(), format!("{base}-1"), format!("{base}-2")]);

    let none = list_catalog_show_ids_with_prefix(&pool, "2024-05-01-phis_")
        .await
        .expect("prefix scan");
    assert!(none.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_check_passes_on_migrated_schema(pool: sqlx::PgPool) {
    showcount_db::health_check(&pool)
        .await
        .expect("migrated database should be healthy");
}

#[sqlx::test(migrations = false)]
async fn health_check_reports_missing_catalog_table(pool: sqlx::PgPool) {
    let err = showcount_db::health_check(&pool)
        .await
        .expect_err("empty database has no catalog tables");
    assert!(matches!(err, showcount_db::DbError::MissingTable("venues")));
}
