//! Read and insert operations for the `catalog_shows` table.

use chrono::{DateTime, NaiveDate, Utc};
use showcount_core::{CatalogShow, NewCatalogShow};
use sqlx::PgPool;
use uuid::Uuid;

/// A row from the `catalog_shows` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogShowRow {
    pub id: Uuid,
    pub show_id: String,
    pub date: NaiveDate,
    pub artist: String,
    pub venue_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CatalogShowRow> for CatalogShow {
    fn from(row: CatalogShowRow) -> Self {
        Self {
            id: row.id,
            show_id: row.show_id,
            date: row.date,
            artist: row.artist,
            venue_id: row.venue_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Exact lookup on `(date, artist, venue_id)`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn find_catalog_show(
    pool: &PgPool,
    date: NaiveDate,
    artist: &str,
    venue_id: Uuid,
) -> Result<Option<CatalogShowRow>, sqlx::Error> {
    sqlx::query_as::<_, CatalogShowRow>(
        "SELECT id, show_id, date, artist, venue_id, created_at, updated_at \
         FROM catalog_shows \
         WHERE date = $1 AND artist = $2 AND venue_id = $3 \
         ORDER BY created_at, id \
         LIMIT 1",
    )
    .bind(date)
    .bind(artist)
    .bind(venue_id)
    .fetch_optional(pool)
    .await
}

/// Every `show_id` that starts with `prefix`, ordered.
///
/// `%`, `_` and `\` in the prefix match literally.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_catalog_show_ids_with_prefix(
    pool: &PgPool,
    prefix: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let pattern = format!("{}%", escape_like(prefix));
    sqlx::query_scalar::<_, String>(
        "SELECT show_id FROM catalog_shows \
         WHERE show_id LIKE $1 ESCAPE '\\' \
         ORDER BY show_id",
    )
    .bind(pattern)
    .fetch_all(pool)
    .await
}

/// Insert a catalog show and return the stored row.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the insert fails, including unique violations
/// on `catalog_shows_show_id_key` or `catalog_shows_identity_key`.
pub async fn insert_catalog_show(
    pool: &PgPool,
    show: &NewCatalogShow,
) -> Result<CatalogShowRow, sqlx::Error> {
    sqlx::query_as::<_, CatalogShowRow>(
        "INSERT INTO catalog_shows (show_id, date, artist, venue_id) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, show_id, date, artist, venue_id, created_at, updated_at",
    )
    .bind(&show.show_id)
    .bind(show.date)
    .bind(&show.artist)
    .bind(show.venue_id)
    .fetch_one(pool)
    .await
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
