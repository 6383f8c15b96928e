//! Testing utilities and in-memory implementations of the core traits.
//!
//! # Example
//!
//! ```rust,ignore
//! use cinedex_core::testing::{fixtures, MemoryCatalogStore, MockMessageSource};
//!
//! let source = MockMessageSource::new();
//! source.add_message(fixtures::document(250, "Heat.1995.mkv", "F250")).await;
//!
//! let catalog = MemoryCatalogStore::new();
//! // Wire both into a ChannelIndexer...
//! ```

mod memory_catalog;
mod mock_source;
mod recording_notifier;

pub use memory_catalog::MemoryCatalogStore;
pub use mock_source::{MockMessageSource, RecordedFetch};
pub use recording_notifier::RecordingNotifier;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::source::{MediaAttachment, MediaFile, SourceMessage};

    /// A message with a named document attachment.
    pub fn document(id: i64, file_name: &str, file_id: &str) -> SourceMessage {
        SourceMessage {
            id,
            media: Some(MediaAttachment::Document(MediaFile {
                file_id: file_id.to_string(),
                file_name: Some(file_name.to_string()),
            })),
            caption: None,
        }
    }

    /// A message with an unnamed video attachment and an optional caption.
    pub fn video(id: i64, file_id: &str, caption: Option<&str>) -> SourceMessage {
        SourceMessage {
            id,
            media: Some(MediaAttachment::Video(MediaFile {
                file_id: file_id.to_string(),
                file_name: None,
            })),
            caption: caption.map(str::to_string),
        }
    }

    /// A message without media.
    pub fn text(id: i64) -> SourceMessage {
        SourceMessage {
            id,
            media: None,
            caption: Some(format!("announcement {}", id)),
        }
    }

    /// Documents for every id in `ids`, named `file-<id>.mkv` with file id `F<id>`.
    pub fn documents(ids: impl IntoIterator<Item = i64>) -> Vec<SourceMessage> {
        ids.into_iter()
            .map(|id| document(id, &format!("file-{}.mkv", id), &format!("F{}", id)))
            .collect()
    }
}
