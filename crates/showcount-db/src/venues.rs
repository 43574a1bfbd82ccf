//! Read and insert operations for the `venues` table.

use chrono::{DateTime, Utc};
use showcount_core::{NewVenue, Venue, VenueKey};
use sqlx::PgPool;
use uuid::Uuid;

/// A row from the `venues` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VenueRow {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub google_place_id: Option<String>,
    pub google_formatted_address: Option<String>,
    pub osm_place_id: Option<String>,
    pub osm_display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VenueRow> for Venue {
    fn from(row: VenueRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            city: row.city,
            state: row.state,
            country: row.country,
            latitude: row.latitude,
            longitude: row.longitude,
            google_place_id: row.google_place_id,
            google_formatted_address: row.google_formatted_address,
            osm_place_id: row.osm_place_id,
            osm_display_name: row.osm_display_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const VENUE_COLUMNS: &str = "id, name, city, state, country, latitude, longitude, \
     google_place_id, google_formatted_address, osm_place_id, osm_display_name, \
     created_at, updated_at";

/// Exact lookup on `(name, city, state, country)`.
///
/// Absent hints match only absent columns (`IS NOT DISTINCT FROM`). When
/// duplicates exist from before the uniqueness index, the oldest row wins.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn find_venue(pool: &PgPool, key: &VenueKey) -> Result<Option<VenueRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {VENUE_COLUMNS} \
         FROM venues \
         WHERE name = $1 \
           AND city IS NOT DISTINCT FROM $2 \
           AND state IS NOT DISTINCT FROM $3 \
           AND country IS NOT DISTINCT FROM $4 \
         ORDER BY created_at, id \
         LIMIT 1"
    );
    sqlx::query_as::<_, VenueRow>(&sql)
        .bind(&key.name)
        .bind(key.city.as_deref())
        .bind(key.state.as_deref())
        .bind(key.country.as_deref())
        .fetch_optional(pool)
        .await
}

/// Insert a venue and return the stored row.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the insert fails, including a unique violation
/// on `venues_identity_key` when another writer created the same venue.
pub async fn insert_venue(pool: &PgPool, venue: &NewVenue) -> Result<VenueRow, sqlx::Error> {
    let sql = format!(
        "INSERT INTO venues \
            (name, city, state, country, latitude, longitude, \
             google_place_id, google_formatted_address, osm_place_id, osm_display_name) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {VENUE_COLUMNS}"
    );
    sqlx::query_as::<_, VenueRow>(&sql)
        .bind(&venue.name)
        .bind(venue.city.as_deref())
        .bind(venue.state.as_deref())
        .bind(&venue.country)
        .bind(venue.latitude)
        .bind(venue.longitude)
        .bind(venue.google_place_id.as_deref())
        .bind(venue.google_formatted_address.as_deref())
        .bind(venue.osm_place_id.as_deref())
        .bind(venue.osm_display_name.as_deref())
        .fetch_one(pool)
        .await
}
