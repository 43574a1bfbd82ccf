//! The resolution pipeline: extraction, bulk date normalization and
//! batched per-record resolution, streamed back in input order.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use showcount_core::{
    AppConfig, CatalogStore, DateNormalizer, Geocoder, RawShow, ResolvedShow, ShowExtractor,
};

use crate::error::{PipelineError, Resolution};
use crate::reorder::ReorderBuffer;
use crate::show::ShowResolver;
use crate::venue::VenueResolver;

const DEFAULT_BATCH_SIZE: usize = 10;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_GEOCODE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Records resolved concurrently; batches run one after another.
    pub batch_size: usize,
    pub store_timeout: Duration,
    pub geocode_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            store_timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
            geocode_timeout: Duration::from_secs(DEFAULT_GEOCODE_TIMEOUT_SECS),
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            store_timeout: Duration::from_secs(config.store_timeout_secs),
            geocode_timeout: Duration::from_secs(config.geocode_timeout_secs),
        }
    }
}

/// Composes the collaborators into the show-import pipeline.
///
/// Cheap to clone; every call to [`Pipeline::process_shows`] is independent.
#[derive(Clone)]
pub struct Pipeline {
    extractor: Arc<dyn ShowExtractor>,
    normalizer: Arc<dyn DateNormalizer>,
    venues: Arc<VenueResolver>,
    shows: Arc<ShowResolver>,
    batch_size: usize,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        extractor: Arc<dyn ShowExtractor>,
        normalizer: Arc<dyn DateNormalizer>,
        store: Arc<dyn CatalogStore>,
        geocoder: Arc<dyn Geocoder>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            extractor,
            normalizer,
            venues: Arc::new(VenueResolver::new(
                Arc::clone(&store),
                geocoder,
                config.store_timeout,
                config.geocode_timeout,
            )),
            shows: Arc::new(ShowResolver::new(store, config.store_timeout)),
            batch_size: config.batch_size.max(1),
        }
    }

    /// Resolve every show described in `content`, yielding one
    /// [`ResolvedShow`] per extracted record in extraction order.
    ///
    /// The stream is lazy and single-pass. It is empty when nothing was
    /// extracted, and ends with a single `Err` if extraction or date
    /// normalization fails. Dropping it abandons remaining batches; records
    /// already spawned run to completion.
    pub fn process_shows(
        &self,
        content: String,
        hint: String,
    ) -> impl Stream<Item = Result<ResolvedShow, PipelineError>> + Send + 'static {
        let pipeline = self.clone();

        async_stream::stream! {
            let raw_shows = match pipeline.extractor.extract_shows(&content, &hint).await {
                Ok(shows) => shows,
                Err(err) => {
                    tracing::error!(error = %err, "show extraction failed; aborting pipeline");
                    yield Err(PipelineError::Extraction(err));
                    return;
                }
            };
            tracing::info!(count = raw_shows.len(), "extracted shows");
            if raw_shows.is_empty() {
                return;
            }

            let raw_dates: Vec<String> = raw_shows.iter().map(|s| s.date.clone()).collect();
            let normalized = match pipeline.normalizer.normalize_dates(&raw_dates, &hint).await {
                Ok(dates) => dates,
                Err(err) => {
                    tracing::error!(error = %err, "date normalization failed; aborting pipeline");
                    yield Err(PipelineError::DateNormalization(err));
                    return;
                }
            };
            let dates = align_dates(normalized, raw_shows.len());

            let total = raw_shows.len();
            let mut records = raw_shows.into_iter().zip(dates).enumerate().peekable();
            let mut buffer = ReorderBuffer::new();
            let mut with_venue = 0usize;
            let mut with_show_ids = 0usize;

            while records.peek().is_some() {
                let mut batch: FuturesUnordered<_> = records
                    .by_ref()
                    .take(pipeline.batch_size)
                    .map(|(order, (raw, date))| pipeline.spawn_record(order, raw, date))
                    .collect();

                while let Some(resolved) = batch.next().await {
                    buffer.insert(resolved.order, resolved);
                    for ready in buffer.drain_ready() {
                        with_venue += usize::from(ready.venue_id.is_some());
                        with_show_ids += usize::from(ready.show_ids.is_some());
                        yield Ok(ready);
                    }
                }
            }

            tracing::info!(
                total,
                with_venue,
                with_show_ids,
                unreleased = buffer.pending_len(),
                "pipeline complete"
            );
        }
    }

    /// Run one record on its own task. A panic degrades that record only.
    fn spawn_record(
        &self,
        order: usize,
        raw: RawShow,
        date: Option<String>,
    ) -> impl std::future::Future<Output = ResolvedShow> + Send + 'static {
        let fallback = ResolvedShow::unresolved(order, &raw, date.clone());
        let handle = tokio::spawn(resolve_record(
            Arc::clone(&self.venues),
            Arc::clone(&self.shows),
            order,
            raw,
            date,
        ));
        async move {
            match handle.await {
                Ok(resolved) => resolved,
                Err(err) => {
                    tracing::error!(order, error = %err, "record resolution task failed");
                    fallback
                }
            }
        }
    }
}

async fn resolve_record(
    venues: Arc<VenueResolver>,
    shows: Arc<ShowResolver>,
    order: usize,
    raw: RawShow,
    date: Option<String>,
) -> ResolvedShow {
    let mut resolved = ResolvedShow::unresolved(order, &raw, date);

    resolved.venue_id = match venues
        .resolve_venue(
            &raw.venue,
            Some(raw.city.as_str()),
            Some(raw.state.as_str()),
            Some(raw.country.as_str()),
        )
        .await
    {
        Resolution::Resolved(venue) => Some(venue.id),
        Resolution::Skipped(reason) => {
            tracing::debug!(order, reason, "venue not resolved");
            None
        }
        Resolution::Failed(err) => {
            tracing::error!(order, venue = %raw.venue, error = %err, "venue resolution failed");
            None
        }
    };

    let show_date = resolved.date.as_deref().and_then(parse_iso_date);
    resolved.show_ids = shows
        .resolve_shows_for_artists(show_date, &raw.artists, resolved.venue_id)
        .await
        .ok();
    resolved
}

/// Line normalized dates up with the records, padding or truncating a
/// mismatched list, and drop values that are not ISO calendar dates.
pub(crate) fn align_dates(mut dates: Vec<Option<String>>, expected: usize) -> Vec<Option<String>> {
    if dates.len() != expected {
        tracing::warn!(
            returned = dates.len(),
            expected,
            "date normalization length mismatch; padding or truncating"
        );
        dates.resize(expected, None);
    }

    dates
        .into_iter()
        .enumerate()
        .map(|(order, date)| {
            let date = date?;
            match parse_iso_date(&date) {
                Some(parsed) => Some(parsed.format("%Y-%m-%d").to_string()),
                None => {
                    tracing::warn!(order, %date, "normalized date is not ISO; treating as absent");
                    None
                }
            }
        })
        .collect()
}

/// Strict `YYYY-MM-DD`: four-digit year, two-digit month and day, no sign.
fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let shaped = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
