//! [`CatalogStore`] backed by Postgres.

use async_trait::async_trait;
use chrono::NaiveDate;
use showcount_core::{
    CatalogShow, CatalogStore, NewCatalogShow, NewVenue, StoreError, Venue, VenueKey,
};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Unique violations become [`StoreError::Conflict`]; everything else is a
/// backend failure.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict {
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            };
        }
    }
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_venue(&self, key: &VenueKey) -> Result<Option<Venue>, StoreError> {
        crate::venues::find_venue(&self.pool, key)
            .await
            .map(|row| row.map(Venue::from))
            .map_err(map_sqlx_error)
    }

    async fn insert_venue(&self, venue: &NewVenue) -> Result<Venue, StoreError> {
        crate::venues::insert_venue(&self.pool, venue)
            .await
            .map(Venue::from)
            .map_err(map_sqlx_error)
    }

    async fn find_catalog_show(
        &self,
        date: NaiveDate,
        artist: &str,
        venue_id: Uuid,
    ) -> Result<Option<CatalogShow>, StoreError> {
        crate::catalog_shows::find_catalog_show(&self.pool, date, artist, venue_id)
            .await
            .map(|row| row.map(CatalogShow::from))
            .map_err(map_sqlx_error)
    }

    async fn list_catalog_show_ids_with_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<String>, StoreError> {
        crate::catalog_shows::list_catalog_show_ids_with_prefix(&self.pool, prefix)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert_catalog_show(&self, show: &NewCatalogShow) -> Result<CatalogShow, StoreError> {
        crate::catalog_shows::insert_catalog_show(&self.pool, show)
            .await
            .map(CatalogShow::from)
            .map_err(map_sqlx_error)
    }
}
