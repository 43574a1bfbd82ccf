//! Venue and catalog-show resolution, and the order-preserving pipeline
//! that drives them.

pub mod error;
pub mod pipeline;
pub mod reorder;
pub mod show;
pub mod venue;

use std::future::Future;
use std::time::Duration;

use showcount_core::StoreError;

pub use error::{PipelineError, ResolveError, Resolution};
pub use pipeline::{Pipeline, PipelineConfig};
pub use reorder::ReorderBuffer;
pub use show::ShowResolver;
pub use venue::{ResolvedVenue, VenueOutcome, VenueResolver};

/// Run one catalog-store call under `limit`.
pub(crate) async fn store_call<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, ResolveError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(ResolveError::from),
        Err(_) => Err(ResolveError::Timeout(limit)),
    }
}
