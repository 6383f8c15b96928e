//! Manual uploads waiting for an admin to pick their category.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use teloxide::types::{ChatId, MessageId};
use tracing::debug;

use cinedex_core::ExtractedMedia;

/// Prompts older than this are forgotten.
pub const PENDING_TTL: Duration = Duration::from_secs(60 * 60);
/// Most prompts kept at once; the oldest is evicted first.
pub const PENDING_LIMIT: usize = 100;

type PromptKey = (ChatId, MessageId);

/// Uploads keyed by the category prompt they are waiting on.
#[derive(Debug)]
pub struct PendingUploads {
    entries: HashMap<PromptKey, (Instant, ExtractedMedia)>,
    ttl: Duration,
    limit: usize,
}

impl Default for PendingUploads {
    fn default() -> Self {
        Self::new(PENDING_TTL, PENDING_LIMIT)
    }
}

impl PendingUploads {
    pub fn new(ttl: Duration, limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            limit: limit.max(1),
        }
    }

    pub fn insert(&mut self, key: PromptKey, media: ExtractedMedia, now: Instant) {
        self.expire(now);
        while self.entries.len() >= self.limit {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, (at, _))| *at)
                .map(|(key, _)| *key)
            else {
                break;
            };
            self.entries.remove(&oldest);
            debug!(chat = %oldest.0, "Evicted oldest pending upload");
        }
        self.entries.insert(key, (now, media));
    }

    /// Remove and return the upload behind a prompt, unless it expired.
    pub fn take(&mut self, key: &PromptKey, now: Instant) -> Option<ExtractedMedia> {
        self.expire(now);
        self.entries.remove(key).map(|(_, media)| media)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, (at, _)| now.saturating_duration_since(*at) < ttl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(file_id: &str) -> ExtractedMedia {
        ExtractedMedia {
            title: format!("{}.mkv", file_id),
            file_id: file_id.to_string(),
        }
    }

    fn key(id: i32) -> PromptKey {
        (ChatId(42), MessageId(id))
    }

    #[test]
    fn test_take_returns_upload_once() {
        let mut pending = PendingUploads::default();
        let now = Instant::now();
        pending.insert(key(1), media("F1"), now);

        assert_eq!(pending.take(&key(1), now), Some(media("F1")));
        assert_eq!(pending.take(&key(1), now), None);
    }

    #[test]
    fn test_expired_uploads_are_dropped() {
        let mut pending = PendingUploads::new(Duration::from_secs(60), 10);
        let start = Instant::now();
        pending.insert(key(1), media("F1"), start);
        pending.insert(key(2), media("F2"), start + Duration::from_secs(30));

        let later = start + Duration::from_secs(61);
        assert_eq!(pending.take(&key(1), later), None);
        assert_eq!(pending.take(&key(2), later), Some(media("F2")));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_oldest_evicted_at_limit() {
        let mut pending = PendingUploads::new(PENDING_TTL, 2);
        let start = Instant::now();
        for id in 1..=3 {
            pending.insert(
                key(id),
                media(&format!("F{}", id)),
                start + Duration::from_secs(id as u64),
            );
        }

        let now = start + Duration::from_secs(4);
        assert_eq!(pending.len(), 2);
        assert_eq!(pending.take(&key(1), now), None);
        assert!(pending.take(&key(3), now).is_some());
    }
}
