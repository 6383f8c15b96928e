//! Progress notifier that records what it was told.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::indexer::{ProgressEvent, ProgressNotifier};

#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<RwLock<Vec<ProgressEvent>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<ProgressEvent> {
        self.events.read().await.clone()
    }

    /// `found` counts carried by `Progress` events, in order.
    pub async fn progress_counts(&self) -> Vec<usize> {
        self.events
            .read()
            .await
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Progress { found, .. } => Some(*found),
                _ => None,
            })
            .collect()
    }

    pub async fn last(&self) -> Option<ProgressEvent> {
        self.events.read().await.last().cloned()
    }
}

#[async_trait]
impl ProgressNotifier for RecordingNotifier {
    async fn notify(&self, event: &ProgressEvent) {
        self.events.write().await.push(event.clone());
    }
}
