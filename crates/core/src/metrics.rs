//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Index runs (outcomes, duration)
//! - Catalog growth
//! - Message source traffic

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Indexer
// =============================================================================

/// Index runs total by outcome.
pub static INDEX_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cinedex_index_runs_total", "Total index runs"),
        &["outcome"], // "completed", "canceled", "failed"
    )
    .unwrap()
});

/// Index run duration in seconds.
pub static INDEX_RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "cinedex_index_run_duration_seconds",
            "Duration of index runs",
        )
        .buckets(vec![1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 1800.0, 3600.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Media files newly added to a catalog.
pub static FILES_INDEXED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cinedex_files_indexed_total", "Media files added to the catalog"),
        &["category"],
    )
    .unwrap()
});

// =============================================================================
// Message source
// =============================================================================

/// Windows fetched that contained at least one message.
pub static WINDOWS_FETCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "cinedex_windows_fetched_total",
        "Message windows fetched from the source",
    )
    .unwrap()
});

/// Failed window fetches.
pub static SOURCE_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("cinedex_source_errors_total", "Failed message source fetches").unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(INDEX_RUNS.clone()),
        Box::new(INDEX_RUN_DURATION.clone()),
        Box::new(FILES_INDEXED.clone()),
        Box::new(WINDOWS_FETCHED.clone()),
        Box::new(SOURCE_ERRORS.clone()),
    ]
}
