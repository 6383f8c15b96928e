//! Telegram bot front end.
//!
//! Admin commands and forwarded messages drive the indexer; anyone can
//! search the catalog by sending a title.

mod commands;
mod forward;
mod handlers;
mod pending;
mod progress;
mod text;

pub use commands::{parse_index_args, CallbackAction, Command};
pub use forward::{decide_forward, ForwardDecision};
pub use pending::PendingUploads;
pub use progress::TelegramProgress;

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, User, UserId};
use teloxide::utils::command::BotCommands;
use tokio::sync::Mutex;
use tracing::{info, warn};

use cinedex_core::{
    AdminList, CatalogStore, ChannelIndexer, ChannelRef, IndexError, IndexRequest,
    MessageSource, NotifierSet, StatusBoard,
};

type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
type HandlerResult = Result<(), HandlerError>;

/// Everything the handlers need, injected as a dptree dependency.
pub struct BotContext {
    indexer: Arc<ChannelIndexer>,
    source: Arc<dyn MessageSource>,
    catalog: Arc<dyn CatalogStore>,
    status: Arc<StatusBoard>,
    admins: AdminList,
    /// Manual uploads awaiting a category, keyed by the prompt message.
    pending: Mutex<PendingUploads>,
}

impl BotContext {
    pub fn new(
        indexer: Arc<ChannelIndexer>,
        source: Arc<dyn MessageSource>,
        catalog: Arc<dyn CatalogStore>,
        status: Arc<StatusBoard>,
        admins: AdminList,
    ) -> Self {
        Self {
            indexer,
            source,
            catalog,
            status,
            admins,
            pending: Mutex::new(PendingUploads::default()),
        }
    }

    /// Check the sender against the admin allow-list.
    fn authorize(&self, user: Option<&User>) -> Result<(), IndexError> {
        check_sender(&self.admins, user.map(|u| u.id))
    }

    /// Take the run lock and sweep `channel` in the background, reporting to
    /// `chat`. The category comes from the channel's configuration.
    fn start_run(
        &self,
        bot: &Bot,
        chat: ChatId,
        status_message: Option<MessageId>,
        channel: ChannelRef,
        upper_message_id: i64,
    ) -> Result<IndexRequest, IndexError> {
        let category = self.indexer.channels().category_of(channel).ok_or_else(|| {
            IndexError::Authorization(format!("channel {} is not configured", channel))
        })?;
        let request = IndexRequest {
            channel,
            category,
            upper_message_id,
        };
        let permit = self.indexer.try_begin(request)?;

        let notifier = NotifierSet::new()
            .with(self.status.clone())
            .with(Arc::new(TelegramProgress::spawn(
                bot.clone(),
                chat,
                status_message,
            )));
        self.indexer.spawn(permit, Arc::new(notifier));

        info!(channel = %channel, category = %category, upper = upper_message_id, "Index run started from Telegram");
        Ok(request)
    }
}

/// Telegram user ids are unsigned; an id outside `i64` can never be an admin.
fn check_sender(admins: &AdminList, sender: Option<UserId>) -> Result<(), IndexError> {
    let sender =
        sender.ok_or_else(|| IndexError::Authorization("message has no sender".to_string()))?;
    let id = i64::try_from(sender.0).map_err(|_| {
        IndexError::Authorization(format!("user {} is not an administrator", sender.0))
    })?;
    admins.check(id)
}

/// Update routing: commands, then other messages, then button presses.
pub fn schema() -> UpdateHandler<HandlerError> {
    let commands = teloxide::filter_command::<Command, _>().endpoint(handlers::handle_command);

    let messages = Update::filter_message()
        .branch(commands)
        .branch(dptree::endpoint(handlers::handle_message));

    let callbacks = Update::filter_callback_query().endpoint(handlers::handle_callback);

    dptree::entry().branch(messages).branch(callbacks)
}

/// Run the dispatcher until the task is aborted.
pub async fn run_bot(bot: Bot, ctx: Arc<BotContext>) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }

    info!("Telegram bot dispatcher started");
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![ctx])
        .default_handler(|_| async {})
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in Telegram handler",
        ))
        .build()
        .dispatch()
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_sender_uses_allow_list() {
        let admins = AdminList::new(vec![42]);

        assert!(check_sender(&admins, Some(UserId(42))).is_ok());
        assert!(matches!(
            check_sender(&admins, Some(UserId(7))),
            Err(IndexError::Authorization(_))
        ));
        assert!(matches!(
            check_sender(&admins, None),
            Err(IndexError::Authorization(_))
        ));
    }

    #[test]
    fn test_check_sender_rejects_ids_outside_i64() {
        // u64::MAX would wrap to -1 under a plain cast.
        let admins = AdminList::new(vec![-1, i64::MAX]);

        assert!(matches!(
            check_sender(&admins, Some(UserId(u64::MAX))),
            Err(IndexError::Authorization(_))
        ));
        assert!(matches!(
            check_sender(&admins, Some(UserId(i64::MAX as u64 + 1))),
            Err(IndexError::Authorization(_))
        ));
        assert!(check_sender(&admins, Some(UserId(i64::MAX as u64))).is_ok());
    }
}
