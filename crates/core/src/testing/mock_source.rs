//! Mock message source for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::source::{ChannelRef, MessageSource, SourceError, SourceMessage};

/// A recorded fetch for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFetch {
    pub channel: ChannelRef,
    pub ids: Range<i64>,
}

/// Called with the zero-based fetch number before each fetch returns.
type FetchHook = Box<dyn Fn(usize) + Send + Sync>;

/// Mock implementation of the MessageSource trait.
///
/// Serves scripted messages by id for any channel, records every fetched
/// range and can fail a specific fetch.
///
/// # Example
///
/// ```rust,ignore
/// use cinedex_core::testing::{fixtures, MockMessageSource};
///
/// let source = MockMessageSource::new();
/// source.add_message(fixtures::document(10, "Heat.1995.mkv", "F10")).await;
///
/// let slots = source.fetch_range(ChannelRef(-1001), 1..11).await?;
/// assert!(slots[9].is_some());
/// ```
pub struct MockMessageSource {
    messages: Arc<RwLock<HashMap<i64, SourceMessage>>>,
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    /// Fail the fetch with this number (zero-based).
    fail_on: Arc<RwLock<Option<(usize, SourceError)>>>,
    fetch_hook: Arc<RwLock<Option<FetchHook>>>,
    fetch_delay: Arc<RwLock<Option<Duration>>>,
    admin_channels: Arc<RwLock<HashSet<ChannelRef>>>,
    admin_error: Arc<RwLock<Option<SourceError>>>,
}

impl std::fmt::Debug for MockMessageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockMessageSource")
            .field("messages", &"<messages>")
            .field("fetches", &"<fetches>")
            .field("fetch_hook", &"<hook>")
            .finish()
    }
}

impl Default for MockMessageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMessageSource {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(HashMap::new())),
            fetches: Arc::new(RwLock::new(Vec::new())),
            fail_on: Arc::new(RwLock::new(None)),
            fetch_hook: Arc::new(RwLock::new(None)),
            fetch_delay: Arc::new(RwLock::new(None)),
            admin_channels: Arc::new(RwLock::new(HashSet::new())),
            admin_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn add_message(&self, message: SourceMessage) {
        self.messages.write().await.insert(message.id, message);
    }

    pub async fn add_messages(&self, messages: impl IntoIterator<Item = SourceMessage>) {
        let mut stored = self.messages.write().await;
        for message in messages {
            stored.insert(message.id, message);
        }
    }

    /// Fail the `n`-th fetch (zero-based) with `error`.
    pub async fn fail_fetch(&self, n: usize, error: SourceError) {
        *self.fail_on.write().await = Some((n, error));
    }

    pub async fn set_fetch_hook(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *self.fetch_hook.write().await = Some(Box::new(hook));
    }

    /// Make every fetch take at least `delay`.
    pub async fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.write().await = Some(delay);
    }

    pub async fn set_admin(&self, channel: ChannelRef, is_admin: bool) {
        let mut admins = self.admin_channels.write().await;
        if is_admin {
            admins.insert(channel);
        } else {
            admins.remove(&channel);
        }
    }

    /// Make admin checks fail with `error` (or answer again on `None`).
    pub async fn fail_admin_check(&self, error: Option<SourceError>) {
        *self.admin_error.write().await = error;
    }

    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }
}

#[async_trait]
impl MessageSource for MockMessageSource {
    async fn fetch_range(
        &self,
        channel: ChannelRef,
        ids: Range<i64>,
    ) -> Result<Vec<Option<SourceMessage>>, SourceError> {
        let n = {
            let mut fetches = self.fetches.write().await;
            fetches.push(RecordedFetch {
                channel,
                ids: ids.clone(),
            });
            fetches.len() - 1
        };

        let delay = *self.fetch_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(hook) = self.fetch_hook.read().await.as_ref() {
            hook(n);
        }

        if let Some((fail_at, error)) = self.fail_on.read().await.as_ref() {
            if *fail_at == n {
                return Err(error.clone());
            }
        }

        let messages = self.messages.read().await;
        Ok(ids.map(|id| messages.get(&id).cloned()).collect())
    }

    async fn is_authorized_admin(&self, channel: ChannelRef) -> Result<bool, SourceError> {
        if let Some(error) = self.admin_error.read().await.clone() {
            return Err(error);
        }
        Ok(self.admin_channels.read().await.contains(&channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_serves_scripted_messages_in_order() {
        let source = MockMessageSource::new();
        source
            .add_messages([fixtures::document(2, "a.mkv", "F2"), fixtures::text(4)])
            .await;

        let slots = source.fetch_range(ChannelRef(-1), 1..5).await.unwrap();
        assert_eq!(slots.len(), 4);
        assert!(slots[0].is_none());
        assert_eq!(slots[1].as_ref().unwrap().id, 2);
        assert!(slots[3].as_ref().unwrap().media.is_none());

        let fetches = source.recorded_fetches().await;
        assert_eq!(fetches, vec![RecordedFetch { channel: ChannelRef(-1), ids: 1..5 }]);
    }

    #[tokio::test]
    async fn test_fails_selected_fetch() {
        let source = MockMessageSource::new();
        source
            .fail_fetch(1, SourceError::Request("boom".to_string()))
            .await;

        assert!(source.fetch_range(ChannelRef(-1), 1..3).await.is_ok());
        assert!(source.fetch_range(ChannelRef(-1), 3..5).await.is_err());
        assert!(source.fetch_range(ChannelRef(-1), 5..7).await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_channels() {
        let source = MockMessageSource::new();
        source.set_admin(ChannelRef(-7), true).await;
        assert!(source.is_authorized_admin(ChannelRef(-7)).await.unwrap());
        assert!(!source.is_authorized_admin(ChannelRef(-8)).await.unwrap());

        source
            .fail_admin_check(Some(SourceError::RateLimited("slow down".to_string())))
            .await;
        assert!(source.is_authorized_admin(ChannelRef(-7)).await.is_err());

        source.fail_admin_check(None).await;
        source.set_admin(ChannelRef(-7), false).await;
        assert!(!source.is_authorized_admin(ChannelRef(-7)).await.unwrap());
    }
}
