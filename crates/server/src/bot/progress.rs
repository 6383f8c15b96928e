//! Progress delivery into a Telegram chat.
//!
//! The notifier only enqueues; a dedicated task owns the status message and
//! performs the edits, so a slow Bot API never stalls the sweep.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use cinedex_core::{ProgressEvent, ProgressNotifier};

use crate::metrics::BOT_PROGRESS_DROPPED;

const PROGRESS_QUEUE: usize = 64;

/// Reports a run's progress by editing one status message in a chat, then
/// posts the terminal outcome as a new message.
pub struct TelegramProgress {
    tx: mpsc::Sender<ProgressEvent>,
}

impl TelegramProgress {
    /// Start the delivery task. With `status_message`, that message is
    /// edited from the first event on; otherwise one is sent.
    pub fn spawn(bot: Bot, chat: ChatId, status_message: Option<MessageId>) -> Self {
        let (tx, rx) = mpsc::channel(PROGRESS_QUEUE);
        tokio::spawn(deliver(bot, chat, status_message, rx));
        Self::with_queue(tx)
    }

    fn with_queue(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl ProgressNotifier for TelegramProgress {
    /// Intermediate updates are dropped when the queue is full. The terminal
    /// event waits for room on a detached task so the run can still return.
    async fn notify(&self, event: &ProgressEvent) {
        if event.is_terminal() {
            let tx = self.tx.clone();
            let event = event.clone();
            tokio::spawn(async move {
                let run_id = event.run_id();
                if tx.send(event).await.is_err() {
                    warn!(run_id = %run_id, "Progress delivery task is gone, final update lost");
                }
            });
            return;
        }

        if let Err(e) = self.tx.try_send(event.clone()) {
            BOT_PROGRESS_DROPPED.inc();
            warn!(run_id = %event.run_id(), "Dropped progress update: {}", e);
        }
    }
}

async fn deliver(
    bot: Bot,
    chat: ChatId,
    mut status_message: Option<MessageId>,
    mut rx: mpsc::Receiver<ProgressEvent>,
) {
    while let Some(event) = rx.recv().await {
        let text = event.render();

        if event.is_terminal() {
            if let Err(e) = bot.send_message(chat, text).await {
                warn!(chat = %chat, "Failed to send final progress message: {}", e);
            }
            break;
        }

        match status_message {
            Some(id) => {
                // "message is not modified" lands here too
                if let Err(e) = bot.edit_message_text(chat, id, text).await {
                    debug!(chat = %chat, "Progress edit failed: {}", e);
                }
            }
            None => match bot.send_message(chat, text).await {
                Ok(message) => status_message = Some(message.id),
                Err(e) => warn!(chat = %chat, "Failed to send progress message: {}", e),
            },
        }
    }
}
