use std::time::Duration;

use showcount_core::{CollaboratorError, StoreError};
use thiserror::Error;

/// Failure while resolving one venue or one artist's catalog show.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("catalog store call timed out after {0:?}")]
    Timeout(Duration),

    /// The store rejected an insert as a duplicate but the winning row could
    /// not be read back.
    #[error("insert conflicted on {constraint} but no matching row was found")]
    ConflictUnresolved { constraint: String },

    #[error("gave up on {show_id} after {attempts} conflicting inserts")]
    ConflictRetriesExhausted { show_id: String, attempts: u32 },
}

/// Failure of a whole-input step; ends the pipeline stream.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("show extraction failed: {0}")]
    Extraction(#[source] CollaboratorError),

    #[error("date normalization failed: {0}")]
    DateNormalization(#[source] CollaboratorError),
}

/// Outcome of a resolution step that never aborts its caller.
#[derive(Debug)]
pub enum Resolution<T> {
    Resolved(T),
    /// Nothing to resolve; the reason is for logs.
    Skipped(&'static str),
    Failed(ResolveError),
}

impl<T> Resolution<T> {
    /// The resolved value, if any.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Skipped(_) | Self::Failed(_) => None,
        }
    }
}

impl<T> From<Result<T, ResolveError>> for Resolution<T> {
    fn from(result: Result<T, ResolveError>) -> Self {
        match result {
            Ok(value) => Self::Resolved(value),
            Err(err) => Self::Failed(err),
        }
    }
}
