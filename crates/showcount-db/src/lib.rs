//! Postgres persistence for venues and catalog shows.
//!
//! [`PgCatalogStore`] is the production [`showcount_core::CatalogStore`].
//! The free functions in [`venues`] and [`catalog_shows`] are the raw
//! queries it wraps.

pub mod catalog_shows;
pub mod pool;
pub mod store;
pub mod venues;

pub use catalog_shows::{
    find_catalog_show, insert_catalog_show, list_catalog_show_ids_with_prefix, CatalogShowRow,
};
pub use pool::{connect_pool, health_check, ping, run_migrations, DbError, PoolConfig};
pub use store::PgCatalogStore;
pub use venues::{find_venue, insert_venue, VenueRow};
