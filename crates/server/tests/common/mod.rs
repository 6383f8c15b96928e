//! Common test utilities for API testing with mocks.
//!
//! Builds an in-process router over an in-memory catalog and a scripted
//! message source, so the HTTP surface can be driven without Telegram.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use cinedex_core::{
    testing::{MemoryCatalogStore, MockMessageSource},
    AuthConfig, AuthMethod, ChannelIndexer, ChannelsConfig, Config, IndexSession, IndexerConfig,
    NoneAuthenticator, ServerConfig, StatusBoard, StorageConfig,
};

pub use cinedex_core::testing::fixtures;

pub const MOVIES_CHANNEL: i64 = -1001;
pub const SHOWS_CHANNEL: i64 = -1002;

pub struct TestFixture {
    pub router: Router,
    pub catalog: Arc<MemoryCatalogStore>,
    pub source: Arc<MockMessageSource>,
    pub session: Arc<IndexSession>,
    pub indexer: Option<Arc<ChannelIndexer>>,
    pub status: Arc<StatusBoard>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Fixture with an indexer over the mock source.
    pub fn new() -> Self {
        Self::build(MemoryCatalogStore::new(), true)
    }

    /// Fixture with a pre-filled catalog.
    pub fn with_catalog(catalog: MemoryCatalogStore) -> Self {
        Self::build(catalog, true)
    }

    /// Fixture as started without a `[telegram]` section.
    pub fn without_indexer() -> Self {
        Self::build(MemoryCatalogStore::new(), false)
    }

    fn build(catalog: MemoryCatalogStore, with_indexer: bool) -> Self {
        let catalog = Arc::new(catalog);
        let source = Arc::new(MockMessageSource::new());
        let session = Arc::new(IndexSession::new());
        let status = Arc::new(StatusBoard::new());

        let channels = ChannelsConfig {
            movies: vec![MOVIES_CHANNEL],
            tv_shows: vec![SHOWS_CHANNEL],
        };
        let indexer_config = IndexerConfig {
            window_size: 100,
            progress_every: 20,
            window_delay_ms: 0,
        };

        let config = Config {
            auth: AuthConfig {
                method: AuthMethod::None,
                api_key: None,
            },
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0,
            },
            storage: StorageConfig::default(),
            channels: channels.clone(),
            indexer: indexer_config.clone(),
            telegram: None,
        };

        let indexer = with_indexer.then(|| {
            Arc::new(ChannelIndexer::new(
                indexer_config,
                channels,
                catalog.clone(),
                source.clone(),
                session.clone(),
            ))
        });

        let state = Arc::new(cinedex_server::state::AppState::new(
            config,
            Arc::new(NoneAuthenticator),
            catalog.clone(),
            session.clone(),
            indexer.clone(),
            status.clone(),
        ));
        let router = cinedex_server::api::create_router(state);

        Self {
            router,
            catalog,
            source,
            session,
            indexer,
            status,
        }
    }

    /// Poll the status endpoint until no run is active.
    pub async fn wait_until_idle(&self) -> TestResponse {
        for _ in 0..200 {
            let response = self.get("/api/v1/admin/index/status").await;
            if response.body["running"] == false && !response.body["last"].is_null() {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("index run did not finish in time");
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
