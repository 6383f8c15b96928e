//! Message sources - where indexable channel history comes from.

mod telegram;
mod types;

pub use telegram::TelegramSource;
pub use types::*;

use async_trait::async_trait;
use std::ops::Range;

/// Trait for reading channel history by message id.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch the messages at `ids` (half-open) in one batch.
    ///
    /// The result has one slot per requested id, in order; `None` marks a
    /// missing or deleted message.
    async fn fetch_range(
        &self,
        channel: ChannelRef,
        ids: Range<i64>,
    ) -> Result<Vec<Option<SourceMessage>>, SourceError>;

    /// Whether this source holds admin privileges in `channel`.
    async fn is_authorized_admin(&self, channel: ChannelRef) -> Result<bool, SourceError>;
}
