//! Status board: the latest known state of the current and previous runs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use async_trait::async_trait;

use crate::catalog::Category;
use crate::source::ChannelRef;

use super::{ProgressEvent, ProgressNotifier};

/// Lifecycle state of a tracked run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Completed,
    Canceled,
    Failed,
}

impl RunState {
    pub fn label(&self) -> &'static str {
        match self {
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Canceled => "canceled",
            RunState::Failed => "failed",
        }
    }
}

/// Snapshot of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStatus {
    pub run_id: Uuid,
    pub channel: ChannelRef,
    pub category: Category,
    pub upper_message_id: i64,
    pub resume_offset: u64,
    pub state: RunState,
    pub found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Snapshot served to status queries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStatus {
    pub current: Option<RunStatus>,
    pub last: Option<RunStatus>,
}

impl IndexStatus {
    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }
}

/// A [`ProgressNotifier`] that keeps an [`IndexStatus`] up to date.
#[derive(Debug, Default)]
pub struct StatusBoard {
    status: RwLock<IndexStatus>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> IndexStatus {
        self.status.read().await.clone()
    }
}

#[async_trait]
impl ProgressNotifier for StatusBoard {
    async fn notify(&self, event: &ProgressEvent) {
        let mut status = self.status.write().await;

        if let ProgressEvent::Started {
            run_id,
            channel,
            category,
            upper_message_id,
            resume_offset,
        } = event
        {
            status.current = Some(RunStatus {
                run_id: *run_id,
                channel: *channel,
                category: *category,
                upper_message_id: *upper_message_id,
                resume_offset: *resume_offset,
                state: RunState::Running,
                found: 0,
                error: None,
                started_at: Utc::now(),
                finished_at: None,
            });
            return;
        }

        let Some(current) = status.current.as_mut() else {
            return;
        };
        if current.run_id != event.run_id() {
            return;
        }
        current.found = event.found();

        let terminal = match event {
            ProgressEvent::Completed { .. } => Some((RunState::Completed, None)),
            ProgressEvent::Canceled { .. } => Some((RunState::Canceled, None)),
            ProgressEvent::Failed { error, .. } => Some((RunState::Failed, Some(error.clone()))),
            _ => None,
        };
        if let Some((state, error)) = terminal {
            if let Some(mut finished) = status.current.take() {
                finished.state = state;
                finished.error = error;
                finished.finished_at = Some(Utc::now());
                status.last = Some(finished);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(run_id: Uuid) -> ProgressEvent {
        ProgressEvent::Started {
            run_id,
            channel: ChannelRef(-1001),
            category: Category::Movie,
            upper_message_id: 250,
            resume_offset: 0,
        }
    }

    #[tokio::test]
    async fn test_tracks_run_lifecycle() {
        let board = StatusBoard::new();
        let run_id = Uuid::new_v4();

        board.notify(&started(run_id)).await;
        let status = board.snapshot().await;
        assert!(status.is_running());
        assert_eq!(status.current.as_ref().unwrap().state, RunState::Running);

        board
            .notify(&ProgressEvent::Progress {
                run_id,
                category: Category::Movie,
                found: 20,
            })
            .await;
        assert_eq!(board.snapshot().await.current.unwrap().found, 20);

        board
            .notify(&ProgressEvent::Failed {
                run_id,
                category: Category::Movie,
                found: 25,
                error: "source error: timeout".to_string(),
            })
            .await;

        let status = board.snapshot().await;
        assert!(!status.is_running());
        let last = status.last.unwrap();
        assert_eq!(last.state, RunState::Failed);
        assert_eq!(last.found, 25);
        assert_eq!(last.error.as_deref(), Some("source error: timeout"));
        assert!(last.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_ignores_events_from_other_runs() {
        let board = StatusBoard::new();
        let run_id = Uuid::new_v4();
        board.notify(&started(run_id)).await;

        board
            .notify(&ProgressEvent::Completed {
                run_id: Uuid::new_v4(),
                category: Category::Movie,
                found: 9,
            })
            .await;

        let status = board.snapshot().await;
        assert!(status.is_running());
        assert!(status.last.is_none());
    }
}
