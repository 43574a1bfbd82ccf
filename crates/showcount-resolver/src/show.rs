//! Find-or-create for catalog shows, one row per artist.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use showcount_core::{
    derive_catalog_show_id, sequence_of, CatalogStore, NewCatalogShow, StoreError,
};
use uuid::Uuid;

use crate::error::{ResolveError, Resolution};
use crate::store_call;

/// Inserts attempted for one artist before giving up on slug conflicts.
const MAX_INSERT_ATTEMPTS: u32 = 3;

pub struct ShowResolver {
    store: Arc<dyn CatalogStore>,
    store_timeout: Duration,
}

impl ShowResolver {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Resolve catalog show ids for every artist on a bill.
    ///
    /// Skipped when the date or the venue is missing, or when no artist
    /// resolved. A failed artist is logged and left out; its siblings are
    /// still resolved. Ids come back in artist order without duplicates.
    pub async fn resolve_shows_for_artists(
        &self,
        date: Option<NaiveDate>,
        artists: &[String],
        venue_id: Option<Uuid>,
    ) -> Resolution<Vec<String>> {
        let (Some(date), Some(venue_id)) = (date, venue_id) else {
            return Resolution::Skipped("date or venue missing");
        };

        let mut show_ids: Vec<String> = Vec::with_capacity(artists.len());
        for artist in artists {
            if let Resolution::Resolved(show_id) =
                self.get_or_create_catalog_show(date, artist, venue_id).await
            {
                if !show_ids.contains(&show_id) {
                    show_ids.push(show_id);
                }
            }
        }

        if show_ids.is_empty() {
            Resolution::Skipped("no artist resolved")
        } else {
            Resolution::Resolved(show_ids)
        }
    }

    /// Find the catalog show for `(date, artist, venue_id)` or create it
    /// under the next free sequenced id.
    pub async fn get_or_create_catalog_show(
        &self,
        date: NaiveDate,
        artist: &str,
        venue_id: Uuid,
    ) -> Resolution<String> {
        let artist = artist.trim();
        if artist.is_empty() {
            return Resolution::Skipped("artist is empty");
        }

        match self.find_or_create(date, artist, venue_id).await {
            Ok(show_id) => Resolution::Resolved(show_id),
            Err(err) => {
                tracing::error!(%artist, %date, %venue_id, error = %err, "catalog show resolution failed");
                Resolution::Failed(err)
            }
        }
    }

    async fn find_or_create(
        &self,
        date: NaiveDate,
        artist: &str,
        venue_id: Uuid,
    ) -> Result<String, ResolveError> {
        if let Some(show) = self.find(date, artist, venue_id).await? {
            return Ok(show);
        }

        let iso_date = date.format("%Y-%m-%d").to_string();
        let base = derive_catalog_show_id(&iso_date, artist, &venue_id.to_string(), None);

        let mut attempts = 0;
        loop {
            attempts += 1;
            let existing = store_call(
                self.store_timeout,
                self.store.list_catalog_show_ids_with_prefix(&base),
            )
            .await?;
            let show_id = next_show_id(&base, &existing);

            let insert = NewCatalogShow {
                show_id: show_id.clone(),
                date,
                artist: artist.to_string(),
                venue_id,
            };
            match store_call(self.store_timeout, self.store.insert_catalog_show(&insert)).await {
                Ok(show) => return Ok(show.show_id),
                Err(ResolveError::Store(StoreError::Conflict { constraint })) => {
                    if let Some(show) = self.find(date, artist, venue_id).await? {
                        return Ok(show);
                    }
                    if attempts >= MAX_INSERT_ATTEMPTS {
                        return Err(ResolveError::ConflictRetriesExhausted { show_id, attempts });
                    }
                    tracing::debug!(%show_id, %constraint, attempts, "catalog show id taken; rescanning");
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn find(
        &self,
        date: NaiveDate,
        artist: &str,
        venue_id: Uuid,
    ) -> Result<Option<String>, ResolveError> {
        let show = store_call(
            self.store_timeout,
            self.store.find_catalog_show(date, artist, venue_id),
        )
        .await?;
        Ok(show.map(|s| s.show_id))
    }
}

/// Pick the id for a new catalog show given the ids already sharing `base`
/// as a prefix.
///
/// Only `base` itself and `base-<n>` count. The sequence is the number of
/// such ids, moved past any that are already taken.
pub(crate) fn next_show_id(base: &str, existing: &[String]) -> String {
    let taken: BTreeSet<u32> = existing
        .iter()
        .filter_map(|id| sequence_of(id, base))
        .collect();
    if taken.is_empty() {
        return base.to_string();
    }

    let mut sequence = u32::try_from(taken.len()).unwrap_or(u32::MAX);
    while taken.contains(&sequence) {
        sequence = sequence.saturating_add(1);
    }
    format!("{base}-{sequence}")
}
