use std::sync::Arc;
use std::time::Instant;

use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MaybeInaccessibleMessage, MessageId,
    MessageOrigin,
};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

use cinedex_core::{
    extract_media, Category, ChannelRef, IndexError, MediaRequest, TelegramSource,
};

use super::commands::{parse_index_args, CallbackAction, Command};
use super::forward::{decide_forward, ForwardDecision};
use super::text;
use super::{BotContext, HandlerResult};
use crate::metrics::BOT_UPDATES_TOTAL;

pub(super) async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<BotContext>,
) -> HandlerResult {
    BOT_UPDATES_TOTAL.with_label_values(&["command"]).inc();
    let chat = msg.chat.id;

    match cmd {
        Command::Start => {
            bot.send_message(chat, text::welcome()).await?;
            return Ok(());
        }
        Command::Help => {
            bot.send_message(chat, Command::descriptions().to_string())
                .await?;
            return Ok(());
        }
        _ => {}
    }

    if let Err(e) = ctx.authorize(msg.from.as_ref()) {
        debug!("Rejected update: {}", e);
        bot.send_message(chat, text::not_admin()).await?;
        return Ok(());
    }

    let reply = match cmd {
        Command::Index(args) => match parse_index_args(&args) {
            Ok((channel, upper)) => match ctx.start_run(&bot, chat, None, channel, upper) {
                Ok(_) => None,
                Err(e) => Some(text::index_error(&e)),
            },
            Err(e) => Some(text::index_error(&e)),
        },
        Command::Setskip(raw) => match ctx.indexer.session().set_resume_offset_str(&raw) {
            Ok(offset) => Some(format!(
                "✅ The next run will skip the latest {} messages.",
                offset
            )),
            Err(e) => Some(text::index_error(&e)),
        },
        Command::Cancel => {
            ctx.indexer.session().request_cancel();
            if ctx.indexer.is_running() {
                Some("🛑 Cancel requested. The run stops after its current window.".to_string())
            } else {
                Some("💤 No indexing run in progress.".to_string())
            }
        }
        Command::Status => {
            let status = ctx.status.snapshot().await;
            Some(text::status(
                &status,
                ctx.indexer.session().resume_offset(),
            ))
        }
        Command::Start | Command::Help => None,
    };

    if let Some(reply) = reply {
        bot.send_message(chat, reply).await?;
    }
    Ok(())
}

pub(super) async fn handle_message(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> HandlerResult {
    let chat = msg.chat.id;

    if let Some(MessageOrigin::Channel {
        chat: origin,
        message_id,
        ..
    }) = msg.forward_origin()
    {
        BOT_UPDATES_TOTAL.with_label_values(&["forward"]).inc();
        if let Err(e) = ctx.authorize(msg.from.as_ref()) {
            debug!("Rejected update: {}", e);
            bot.send_message(chat, text::not_admin()).await?;
            return Ok(());
        }
        let channel = ChannelRef(origin.id.0);
        let message_id = i64::from(message_id.0);
        return offer_channel_actions(&bot, chat, &ctx, channel, message_id).await;
    }

    if msg.document().is_some() || msg.video().is_some() {
        BOT_UPDATES_TOTAL.with_label_values(&["upload"]).inc();
        if let Err(e) = ctx.authorize(msg.from.as_ref()) {
            debug!("Rejected update: {}", e);
            bot.send_message(chat, text::not_admin()).await?;
            return Ok(());
        }
        let message = TelegramSource::to_source_message(i64::from(msg.id.0), &msg);
        let Some(media) = extract_media(&message) else {
            return Ok(());
        };

        let keyboard = InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback(
                "🎬 Movie",
                CallbackAction::Classify(Category::Movie).encode(),
            ),
            InlineKeyboardButton::callback(
                "📺 TV show",
                CallbackAction::Classify(Category::TvShow).encode(),
            ),
        ]]);
        let prompt = bot
            .send_message(chat, format!("Where should \"{}\" go?", media.title))
            .reply_markup(keyboard)
            .await?;
        ctx.pending
            .lock()
            .await
            .insert((chat, prompt.id), media, Instant::now());
        return Ok(());
    }

    if let Some(query) = msg.text() {
        BOT_UPDATES_TOTAL.with_label_values(&["search"]).inc();
        if query.trim().is_empty() {
            return Ok(());
        }
        let results: Vec<_> = Category::ALL
            .iter()
            .map(|&category| (category, ctx.catalog.search(category, query)))
            .collect();
        let mut reply = text::search_results(query, &results);

        if results.iter().all(|(_, hits)| hits.is_empty()) {
            let user_id = msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok());
            match ctx
                .catalog
                .record_request(MediaRequest::new(query.trim(), user_id))
            {
                Ok(_) => reply.push_str(&format!("\n{}", text::request_noted())),
                Err(e) => warn!("Failed to record request: {}", e),
            }
        }
        bot.send_message(chat, reply).await?;
    }

    Ok(())
}

async fn offer_channel_actions(
    bot: &Bot,
    chat: ChatId,
    ctx: &BotContext,
    channel: ChannelRef,
    message_id: i64,
) -> HandlerResult {
    let category =
        match decide_forward(ctx.indexer.channels(), ctx.source.as_ref(), channel).await {
            ForwardDecision::Offer(category) => category,
            ForwardDecision::UnknownChannel => {
                bot.send_message(
                    chat,
                    format!("❌ Channel {} is not configured for indexing.", channel),
                )
                .await?;
                return Ok(());
            }
            ForwardDecision::BotNotAdmin => {
                bot.send_message(
                    chat,
                    format!("❌ The bot is not an administrator of channel {}.", channel),
                )
                .await?;
                return Ok(());
            }
            ForwardDecision::CheckFailed(e) => {
                warn!(channel = %channel, "Admin check failed: {}", e);
                bot.send_message(chat, format!("⚠️ Could not check channel {}: {}", channel, e))
                    .await?;
                return Ok(());
            }
        };

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "📡 Index whole channel",
            CallbackAction::IndexFull {
                channel,
                message_id,
            }
            .encode(),
        )],
        vec![InlineKeyboardButton::callback(
            "📄 Index this message only",
            CallbackAction::IndexSingle {
                channel,
                message_id,
            }
            .encode(),
        )],
    ]);
    bot.send_message(
        chat,
        format!(
            "Channel {} ({}), message {}. What should I index?",
            channel, category, message_id
        ),
    )
    .reply_markup(keyboard)
    .await?;
    Ok(())
}

pub(super) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    ctx: Arc<BotContext>,
) -> HandlerResult {
    BOT_UPDATES_TOTAL.with_label_values(&["callback"]).inc();
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(prompt) = q.message.as_ref() else {
        debug!("Callback without a message, ignoring");
        return Ok(());
    };
    let (chat, prompt_id) = prompt_location(prompt);

    if let Err(e) = ctx.authorize(Some(&q.from)) {
        debug!("Rejected update: {}", e);
        bot.send_message(chat, text::not_admin()).await?;
        return Ok(());
    }

    let action = match q.data.as_deref().unwrap_or_default().parse::<CallbackAction>() {
        Ok(action) => action,
        Err(e) => {
            warn!("Ignoring callback: {}", e);
            return Ok(());
        }
    };

    let reply = match action {
        CallbackAction::IndexFull {
            channel,
            message_id,
        } => match ctx.start_run(&bot, chat, Some(prompt_id), channel, message_id) {
            Ok(_) => None,
            Err(e) => Some(text::index_error(&e)),
        },
        CallbackAction::IndexSingle {
            channel,
            message_id,
        } => {
            if ctx.indexer.is_running() {
                Some(text::already_running().to_string())
            } else {
                Some(match ctx.indexer.index_single(channel, message_id).await {
                    Ok(outcome) => text::single_outcome(&outcome),
                    Err(e) => text::index_error(&e),
                })
            }
        }
        CallbackAction::Classify(category) => {
            classify_upload(&ctx, chat, prompt_id, category).await
        }
    };

    if let Some(reply) = reply {
        bot.edit_message_text(chat, prompt_id, reply).await?;
    }
    Ok(())
}

async fn classify_upload(
    ctx: &BotContext,
    chat: ChatId,
    prompt_id: MessageId,
    category: Category,
) -> Option<String> {
    if ctx.indexer.is_running() {
        return Some(text::already_running().to_string());
    }

    let Some(media) = ctx
        .pending
        .lock()
        .await
        .take(&(chat, prompt_id), Instant::now())
    else {
        return Some("⚠️ That upload is no longer pending. Send the file again.".to_string());
    };

    match ctx.indexer.add_media(category, media.clone()).await {
        Ok(outcome) => {
            info!(category = %category, file_id = %media.file_id, "Manual upload classified");
            Some(text::single_outcome(&outcome))
        }
        Err(e @ IndexError::Persistence(_)) => {
            ctx.pending
                .lock()
                .await
                .insert((chat, prompt_id), media, Instant::now());
            Some(text::index_error(&e))
        }
        Err(e) => Some(text::index_error(&e)),
    }
}

fn prompt_location(message: &MaybeInaccessibleMessage) -> (ChatId, MessageId) {
    (message.chat().id, message.id())
}
