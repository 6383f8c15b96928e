//! Types for the channel indexer.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::OwnedMutexGuard;

use crate::catalog::{CatalogError, Category, MediaRecord};
use crate::source::{ChannelRef, SourceError};

/// Errors surfaced by the indexer and its administrative commands.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    /// Malformed administrative input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unauthorized channel or caller.
    #[error("authorization error: {0}")]
    Authorization(String),

    /// Message source failure. Not retried.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Catalog write failure.
    #[error("persistence error: {0}")]
    Persistence(#[from] CatalogError),

    /// Another run holds the run lock.
    #[error("an index run is already in progress")]
    AlreadyRunning,
}

/// What to sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRequest {
    pub channel: ChannelRef,
    pub category: Category,
    /// Highest message id to consider (inclusive).
    pub upper_message_id: i64,
}

/// Terminal result of a run.
#[derive(Debug, Clone)]
pub enum IndexOutcome {
    Completed { found: usize },
    Canceled { found: usize },
    Failed { error: IndexError, found: usize },
}

impl IndexOutcome {
    /// Records newly added by the run.
    pub fn found(&self) -> usize {
        match self {
            IndexOutcome::Completed { found }
            | IndexOutcome::Canceled { found }
            | IndexOutcome::Failed { found, .. } => *found,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IndexOutcome::Completed { .. } => "completed",
            IndexOutcome::Canceled { .. } => "canceled",
            IndexOutcome::Failed { .. } => "failed",
        }
    }
}

/// Result of indexing a single message or upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleOutcome {
    Added(MediaRecord),
    /// The file id was already cataloged; carries the existing record.
    Duplicate(MediaRecord),
    NoMedia,
}

/// Exclusive right to run one sweep.
///
/// Holding a permit holds the run lock; it is released when the permit is
/// consumed by [`ChannelIndexer::run`](super::ChannelIndexer::run) or dropped.
pub struct RunPermit {
    pub(super) guard: OwnedMutexGuard<()>,
    pub(super) request: IndexRequest,
}

impl RunPermit {
    pub fn request(&self) -> &IndexRequest {
        &self.request
    }
}

impl std::fmt::Debug for RunPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunPermit")
            .field("request", &self.request)
            .finish()
    }
}
