//! Indexer configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the backward sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Message ids fetched per window.
    #[serde(default = "default_window_size")]
    pub window_size: u32,

    /// Emit a progress notification every this many newly added records.
    #[serde(default = "default_progress_every")]
    pub progress_every: u32,

    /// Pause between windows (milliseconds), a courtesy to the source's
    /// rate limits.
    #[serde(default = "default_window_delay")]
    pub window_delay_ms: u64,
}

fn default_window_size() -> u32 {
    100
}

fn default_progress_every() -> u32 {
    20
}

fn default_window_delay() -> u64 {
    500
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            progress_every: default_progress_every(),
            window_delay_ms: default_window_delay(),
        }
    }
}
