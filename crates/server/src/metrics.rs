//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the cinedex server:
//! - HTTP request metrics (latency, counts, auth failures)
//! - Telegram bot traffic
//! - Catalog size and indexer activity (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};
use regex_lite::Regex;
use tracing::warn;

use cinedex_core::Category;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "cinedex_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cinedex_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "cinedex_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cinedex_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Bot Metrics
// =============================================================================

/// Telegram updates handled, by kind.
pub static BOT_UPDATES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cinedex_bot_updates_total", "Telegram updates handled"),
        &["kind"], // "command", "forward", "upload", "search", "callback"
    )
    .unwrap()
});

/// Progress updates dropped because the delivery queue was full.
pub static BOT_PROGRESS_DROPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "cinedex_bot_progress_dropped_total",
        "Progress updates dropped by the Telegram notifier",
    )
    .unwrap()
});

// =============================================================================
// Catalog & Indexer Metrics (collected dynamically)
// =============================================================================

/// Records per catalog category.
pub static CATALOG_ENTRIES: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("cinedex_catalog_entries", "Number of records per catalog"),
        &["category"],
    )
    .unwrap()
});

/// 1 while an index run holds the run lock.
pub static INDEX_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("cinedex_index_running", "Whether an index run is active").unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // Bot
    registry
        .register(Box::new(BOT_UPDATES_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(BOT_PROGRESS_DROPPED.clone()))
        .unwrap();

    // Catalog & indexer
    registry
        .register(Box::new(CATALOG_ENTRIES.clone()))
        .unwrap();
    registry.register(Box::new(INDEX_RUNNING.clone())).unwrap();

    // Core metrics (index runs, source traffic)
    for metric in cinedex_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let running = state.indexer().is_some_and(|i| i.is_running());
    INDEX_RUNNING.set(i64::from(running));

    for category in Category::ALL {
        let entries = state.catalog().load(category).len();
        CATALOG_ENTRIES
            .with_label_values(&[category.slug()])
            .set(entries as i64);
    }
}

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/-?\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace numeric ids with placeholders).
pub fn normalize_path(path: &str) -> String {
    // Applied twice: adjacent numeric segments share a slash
    let once = NUMERIC_SEGMENT.replace_all(path, "/{id}$1");
    NUMERIC_SEGMENT.replace_all(&once, "/{id}$1").into_owned()
}
