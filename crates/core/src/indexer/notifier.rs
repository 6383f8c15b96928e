//! Progress protocol between a run and whoever is watching it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::Category;
use crate::source::ChannelRef;

/// Events emitted by a run, in order: one `Started`, any number of
/// `Progress`, then exactly one terminal event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started {
        run_id: Uuid,
        channel: ChannelRef,
        category: Category,
        upper_message_id: i64,
        resume_offset: u64,
    },
    Progress {
        run_id: Uuid,
        category: Category,
        found: usize,
    },
    Completed {
        run_id: Uuid,
        category: Category,
        found: usize,
    },
    Canceled {
        run_id: Uuid,
        category: Category,
        found: usize,
    },
    Failed {
        run_id: Uuid,
        category: Category,
        found: usize,
        error: String,
    },
}

impl ProgressEvent {
    pub fn run_id(&self) -> Uuid {
        match self {
            ProgressEvent::Started { run_id, .. }
            | ProgressEvent::Progress { run_id, .. }
            | ProgressEvent::Completed { run_id, .. }
            | ProgressEvent::Canceled { run_id, .. }
            | ProgressEvent::Failed { run_id, .. } => *run_id,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            ProgressEvent::Started { category, .. }
            | ProgressEvent::Progress { category, .. }
            | ProgressEvent::Completed { category, .. }
            | ProgressEvent::Canceled { category, .. }
            | ProgressEvent::Failed { category, .. } => *category,
        }
    }

    /// Records added so far (zero for `Started`).
    pub fn found(&self) -> usize {
        match self {
            ProgressEvent::Started { .. } => 0,
            ProgressEvent::Progress { found, .. }
            | ProgressEvent::Completed { found, .. }
            | ProgressEvent::Canceled { found, .. }
            | ProgressEvent::Failed { found, .. } => *found,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Completed { .. }
                | ProgressEvent::Canceled { .. }
                | ProgressEvent::Failed { .. }
        )
    }

    /// Human-readable status line.
    pub fn render(&self) -> String {
        match self {
            ProgressEvent::Started {
                channel,
                category,
                upper_message_id,
                resume_offset,
                ..
            } => {
                if *resume_offset > 0 {
                    format!(
                        "⏳ Indexing {} from channel {} (message {}, skipping the latest {})...",
                        category, channel, upper_message_id, resume_offset
                    )
                } else {
                    format!(
                        "⏳ Indexing {} from channel {} (message {})...",
                        category, channel, upper_message_id
                    )
                }
            }
            ProgressEvent::Progress { category, found, .. } => {
                format!("📡 Indexing {}: {} files added so far...", category, found)
            }
            ProgressEvent::Completed { category, found, .. } => {
                format!("✅ Indexing {} completed! {} files added.", category, found)
            }
            ProgressEvent::Canceled { category, found, .. } => {
                format!(
                    "❌ Indexing {} canceled! {} files added before stopping.",
                    category, found
                )
            }
            ProgressEvent::Failed {
                category,
                found,
                error,
                ..
            } => format!(
                "⚠️ Indexing {} failed after {} files: {}",
                category, found, error
            ),
        }
    }
}

/// Receives progress events. Delivery is best-effort: implementations must
/// not fail the run and should not block it for long.
#[async_trait]
pub trait ProgressNotifier: Send + Sync {
    async fn notify(&self, event: &ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl ProgressNotifier for NoopNotifier {
    async fn notify(&self, _event: &ProgressEvent) {}
}

/// Fans one event out to several notifiers, in order.
#[derive(Default, Clone)]
pub struct NotifierSet {
    notifiers: Vec<Arc<dyn ProgressNotifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: Arc<dyn ProgressNotifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

#[async_trait]
impl ProgressNotifier for NotifierSet {
    async fn notify(&self, event: &ProgressEvent) {
        for notifier in &self.notifiers {
            notifier.notify(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingNotifier;

    fn completed(found: usize) -> ProgressEvent {
        ProgressEvent::Completed {
            run_id: Uuid::nil(),
            category: Category::Movie,
            found,
        }
    }

    #[test]
    fn test_render_lines() {
        assert_eq!(
            completed(40).render(),
            "✅ Indexing movies completed! 40 files added."
        );

        let failed = ProgressEvent::Failed {
            run_id: Uuid::nil(),
            category: Category::TvShow,
            found: 3,
            error: "source error: timeout".to_string(),
        };
        assert_eq!(
            failed.render(),
            "⚠️ Indexing tvshows failed after 3 files: source error: timeout"
        );
        assert!(failed.is_terminal());
    }

    #[test]
    fn test_started_mentions_offset_only_when_set() {
        let started = |resume_offset| ProgressEvent::Started {
            run_id: Uuid::nil(),
            channel: ChannelRef(-1001),
            category: Category::Movie,
            upper_message_id: 250,
            resume_offset,
        };
        assert!(!started(0).render().contains("skipping"));
        assert!(started(100).render().contains("skipping the latest 100"));
        assert!(!started(0).is_terminal());
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_value(completed(2)).unwrap();
        assert_eq!(json["event"], "completed");
        assert_eq!(json["category"], "movie");
        assert_eq!(json["found"], 2);
    }

    #[tokio::test]
    async fn test_notifier_set_fans_out() {
        let first = Arc::new(RecordingNotifier::new());
        let second = Arc::new(RecordingNotifier::new());
        let set = NotifierSet::new()
            .with(first.clone())
            .with(second.clone());
        assert_eq!(set.len(), 2);

        set.notify(&completed(1)).await;

        assert_eq!(first.events().await, vec![completed(1)]);
        assert_eq!(second.events().await, vec![completed(1)]);
    }
}
