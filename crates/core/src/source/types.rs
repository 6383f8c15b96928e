//! Types exchanged with a message source.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reference to a source channel (a Telegram chat id, `-100…` for channels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelRef(pub i64);

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Private channel links: `https://t.me/c/<internal id>/<message id>`.
static PRIVATE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:t|telegram)\.me/c/(\d+)(?:/(\d+))?/?$")
        .expect("valid link pattern")
});

/// A channel reference parsed from admin input, optionally carrying the
/// message id a link pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelTarget {
    pub channel: ChannelRef,
    pub message_id: Option<i64>,
}

impl FromStr for ChannelTarget {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(caps) = PRIVATE_LINK.captures(s) {
            let internal: i64 = caps[1]
                .parse()
                .map_err(|_| SourceError::InvalidReference(s.to_string()))?;
            let message_id = caps
                .get(2)
                .map(|m| m.as_str().parse::<i64>())
                .transpose()
                .map_err(|_| SourceError::InvalidReference(s.to_string()))?;
            // Bot API ids for channels are the internal id prefixed with -100.
            let channel = format!("-100{}", internal)
                .parse()
                .map(ChannelRef)
                .map_err(|_| SourceError::InvalidReference(s.to_string()))?;
            return Ok(Self {
                channel,
                message_id,
            });
        }

        s.parse::<i64>()
            .map(|id| Self {
                channel: ChannelRef(id),
                message_id: None,
            })
            .map_err(|_| SourceError::InvalidReference(s.to_string()))
    }
}

/// File fields shared by every attachment kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Indexable attachment carried by a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaAttachment {
    Document(MediaFile),
    Video(MediaFile),
}

impl MediaAttachment {
    /// Choose the attachment of a message that may expose both payloads.
    /// The document wins.
    pub fn select(document: Option<MediaFile>, video: Option<MediaFile>) -> Option<Self> {
        document
            .map(MediaAttachment::Document)
            .or_else(|| video.map(MediaAttachment::Video))
    }

    pub fn file(&self) -> &MediaFile {
        match self {
            MediaAttachment::Document(file) | MediaAttachment::Video(file) => file,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MediaAttachment::Document(_) => "document",
            MediaAttachment::Video(_) => "video",
        }
    }
}

/// One message returned by a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMessage {
    pub id: i64,
    #[serde(default)]
    pub media: Option<MediaAttachment>,
    #[serde(default)]
    pub caption: Option<String>,
}

impl SourceMessage {
    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }
}

/// `(title, file_id)` pulled out of an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMedia {
    pub title: String,
    pub file_id: String,
}

/// Extract catalog fields from a message.
///
/// The title is the attachment's file name, falling back to the caption and
/// then to `<kind>-<message id>`.
pub fn extract_media(message: &SourceMessage) -> Option<ExtractedMedia> {
    let media = message.media.as_ref()?;
    let file = media.file();
    let title = file
        .file_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| {
            message
                .caption
                .as_ref()
                .map(|c| c.lines().next().unwrap_or_default().trim().to_string())
                .filter(|c| !c.is_empty())
        })
        .unwrap_or_else(|| format!("{}-{}", media.kind(), message.id));

    Some(ExtractedMedia {
        title,
        file_id: file.file_id.clone(),
    })
}

/// Errors raised by a message source.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Source request failed: {0}")]
    Request(String),

    #[error("Permission denied in channel {channel}: {message}")]
    Permission { channel: ChannelRef, message: String },

    #[error("Rate limited by source: {0}")]
    RateLimited(String),

    #[error("Invalid channel reference: {0}")]
    InvalidReference(String),
}
