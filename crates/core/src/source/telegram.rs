//! Telegram Bot API message source.
//!
//! The Bot API cannot read channel history directly, so each message id is
//! probed by forwarding it into a private probe chat: the forwarded copy
//! exposes the attachment and is deleted right after. Ids the API reports as
//! missing become gaps.

use async_trait::async_trait;
use std::ops::Range;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, UserId};
use teloxide::{ApiError, RequestError};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::{ChannelRef, MediaAttachment, MediaFile, MessageSource, SourceError, SourceMessage};

pub struct TelegramSource {
    bot: Bot,
    probe_chat: ChatId,
    bot_user: OnceCell<UserId>,
}

impl TelegramSource {
    pub fn new(bot: Bot, probe_chat_id: i64) -> Self {
        Self {
            bot,
            probe_chat: ChatId(probe_chat_id),
            bot_user: OnceCell::new(),
        }
    }

    /// Convert a Bot API message into a source message with id `id`.
    pub fn to_source_message(id: i64, message: &Message) -> SourceMessage {
        let document = message.document().map(|d| MediaFile {
            file_id: d.file.id.to_string(),
            file_name: d.file_name.clone(),
        });
        let video = message.video().map(|v| MediaFile {
            file_id: v.file.id.to_string(),
            file_name: v.file_name.clone(),
        });

        SourceMessage {
            id,
            media: MediaAttachment::select(document, video),
            caption: message.caption().map(str::to_string),
        }
    }

    async fn probe(&self, channel: ChannelRef, id: i64) -> Result<Option<SourceMessage>, SourceError> {
        let message_id = i32::try_from(id)
            .map(MessageId)
            .map_err(|_| SourceError::InvalidReference(format!("message id {} out of range", id)))?;

        let result = self
            .bot
            .forward_message(self.probe_chat, ChatId(channel.0), message_id)
            .disable_notification(true)
            .await;

        match result {
            Ok(copy) => {
                let message = Self::to_source_message(id, &copy);
                if let Err(e) = self.bot.delete_message(self.probe_chat, copy.id).await {
                    debug!(error = %e, "failed to delete probe copy");
                }
                Ok(Some(message))
            }
            Err(RequestError::Api(ApiError::MessageToForwardNotFound))
            | Err(RequestError::Api(ApiError::MessageIdInvalid)) => Ok(None),
            Err(e) => Err(map_request_error(channel, e)),
        }
    }

    async fn bot_user_id(&self) -> Result<UserId, SourceError> {
        self.bot_user
            .get_or_try_init(|| async {
                self.bot
                    .get_me()
                    .await
                    .map(|me| me.user.id)
                    .map_err(|e| SourceError::Request(e.to_string()))
            })
            .await
            .copied()
    }
}

fn map_request_error(channel: ChannelRef, e: RequestError) -> SourceError {
    match e {
        RequestError::Api(ApiError::ChatNotFound) | RequestError::Api(ApiError::BotKicked) => {
            SourceError::Permission {
                channel,
                message: e.to_string(),
            }
        }
        RequestError::RetryAfter(_) => SourceError::RateLimited(e.to_string()),
        other => SourceError::Request(other.to_string()),
    }
}

#[async_trait]
impl MessageSource for TelegramSource {
    async fn fetch_range(
        &self,
        channel: ChannelRef,
        ids: Range<i64>,
    ) -> Result<Vec<Option<SourceMessage>>, SourceError> {
        let mut slots = Vec::with_capacity((ids.end - ids.start).max(0) as usize);
        for id in ids {
            slots.push(self.probe(channel, id).await?);
        }
        Ok(slots)
    }

    async fn is_authorized_admin(&self, channel: ChannelRef) -> Result<bool, SourceError> {
        let me = self.bot_user_id().await?;
        match self.bot.get_chat_member(ChatId(channel.0), me).await {
            Ok(member) => Ok(member.kind.is_privileged()),
            Err(RequestError::Api(ApiError::ChatNotFound))
            | Err(RequestError::Api(ApiError::BotKicked)) => {
                warn!(channel = %channel, "bot has no access to channel");
                Ok(false)
            }
            Err(e) => Err(map_request_error(channel, e)),
        }
    }
}
