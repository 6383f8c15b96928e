//! Channel indexer.
//!
//! Sweeps a channel's history backward in windows, extracts media and merges
//! it into the category catalog. One run at a time per process; progress is
//! reported through a [`ProgressNotifier`].

mod config;
mod notifier;
mod runner;
mod session;
mod status;
mod types;
mod window;

pub use config::IndexerConfig;
pub use notifier::{NoopNotifier, NotifierSet, ProgressEvent, ProgressNotifier};
pub use runner::ChannelIndexer;
pub use session::IndexSession;
pub use status::{IndexStatus, RunState, RunStatus, StatusBoard};
pub use types::{IndexError, IndexOutcome, IndexRequest, RunPermit, SingleOutcome};
pub use window::window_at;
