//! Bot commands and inline-keyboard callback payloads.

use std::str::FromStr;

use teloxide::utils::command::BotCommands;

use cinedex_core::{Category, ChannelRef, ChannelTarget, IndexError};

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "list commands")]
    Help,
    #[command(description = "index a channel: /index <channel id | t.me link> [last message id]")]
    Index(String),
    #[command(description = "skip the latest N messages on the next run")]
    Setskip(String),
    #[command(description = "stop the active run after its current window")]
    Cancel,
    #[command(description = "show indexing status")]
    Status,
}

/// Parse `/index` arguments into a channel and an upper message id.
///
/// The upper bound is the explicit second argument, or the message id
/// carried by a `t.me/c/<id>/<msg>` link.
pub fn parse_index_args(raw: &str) -> Result<(ChannelRef, i64), IndexError> {
    let mut parts = raw.split_whitespace();
    let target: ChannelTarget = parts
        .next()
        .ok_or_else(|| {
            IndexError::Validation(
                "usage: /index <channel id | t.me link> [last message id]".to_string(),
            )
        })?
        .parse()
        .map_err(|e: cinedex_core::SourceError| IndexError::Validation(e.to_string()))?;

    let upper = match parts.next() {
        Some(raw_id) => raw_id.parse::<i64>().map_err(|_| {
            IndexError::Validation(format!("last message id must be a number, got {:?}", raw_id))
        })?,
        None => target.message_id.ok_or_else(|| {
            IndexError::Validation("last message id required (or send a message link)".to_string())
        })?,
    };

    if parts.next().is_some() {
        return Err(IndexError::Validation(
            "too many arguments for /index".to_string(),
        ));
    }

    Ok((target.channel, upper))
}

/// Payload of an inline-keyboard button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Sweep the whole channel backward from the forwarded message.
    IndexFull { channel: ChannelRef, message_id: i64 },
    /// Save only the forwarded message's attachment.
    IndexSingle { channel: ChannelRef, message_id: i64 },
    /// Category chosen for a pending manual upload.
    Classify(Category),
}

impl CallbackAction {
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::IndexFull {
                channel,
                message_id,
            } => format!("index_full:{}:{}", channel, message_id),
            CallbackAction::IndexSingle {
                channel,
                message_id,
            } => format!("index_single:{}:{}", channel, message_id),
            CallbackAction::Classify(Category::Movie) => "classify:movie".to_string(),
            CallbackAction::Classify(Category::TvShow) => "classify:tv_show".to_string(),
        }
    }
}

impl FromStr for CallbackAction {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IndexError::Validation(format!("unrecognized callback data {:?}", s));
        let mut parts = s.split(':');

        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(kind @ ("index_full" | "index_single")), Some(chat), Some(msg), None) => {
                let channel = ChannelRef(chat.parse().map_err(|_| invalid())?);
                let message_id = msg.parse().map_err(|_| invalid())?;
                Ok(if kind == "index_full" {
                    CallbackAction::IndexFull {
                        channel,
                        message_id,
                    }
                } else {
                    CallbackAction::IndexSingle {
                        channel,
                        message_id,
                    }
                })
            }
            (Some("classify"), Some(category), None, None) => category
                .parse()
                .map(CallbackAction::Classify)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index_with_explicit_upper() {
        let (channel, upper) = parse_index_args("-1001234 250").unwrap();
        assert_eq!(channel, ChannelRef(-1001234));
        assert_eq!(upper, 250);
    }

    #[test]
    fn test_parse_index_from_link() {
        let (channel, upper) = parse_index_args("https://t.me/c/1234/77").unwrap();
        assert_eq!(channel, ChannelRef(-1001234));
        assert_eq!(upper, 77);

        // Explicit id overrides the link's
        let (_, upper) = parse_index_args("t.me/c/1234/77 500").unwrap();
        assert_eq!(upper, 500);
    }

    #[test]
    fn test_parse_index_rejects_bad_input() {
        for raw in ["", "   ", "-1001234", "-1001234 abc", "@channel 10", "-100 1 2"] {
            assert!(
                matches!(parse_index_args(raw), Err(IndexError::Validation(_))),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_callback_encoding() {
        let full = CallbackAction::IndexFull {
            channel: ChannelRef(-1001234),
            message_id: 99,
        };
        assert_eq!(full.encode(), "index_full:-1001234:99");
        assert_eq!("index_full:-1001234:99".parse::<CallbackAction>().unwrap(), full);

        let single: CallbackAction = "index_single:-1001:5".parse().unwrap();
        assert_eq!(
            single,
            CallbackAction::IndexSingle {
                channel: ChannelRef(-1001),
                message_id: 5
            }
        );

        assert_eq!(
            CallbackAction::Classify(Category::TvShow).encode(),
            "classify:tv_show"
        );
        assert_eq!(
            "classify:movie".parse::<CallbackAction>().unwrap(),
            CallbackAction::Classify(Category::Movie)
        );
    }

    #[test]
    fn test_callback_rejects_garbage() {
        for raw in ["", "index_full", "index_full:x:1", "index_full:1:2:3", "classify:music", "other:1:2"] {
            assert!(raw.parse::<CallbackAction>().is_err(), "{:?}", raw);
        }
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(
            Command::parse("/index -1001 250", "cinedex_bot").unwrap(),
            Command::Index("-1001 250".to_string())
        );
        assert_eq!(
            Command::parse("/setskip 100", "cinedex_bot").unwrap(),
            Command::Setskip("100".to_string())
        );
        assert_eq!(Command::parse("/cancel", "cinedex_bot").unwrap(), Command::Cancel);
    }
}
