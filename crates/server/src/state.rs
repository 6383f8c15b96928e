use std::sync::Arc;

use cinedex_core::{
    Authenticator, CatalogStore, ChannelIndexer, Config, IndexSession, SanitizedConfig,
    StatusBoard,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    catalog: Arc<dyn CatalogStore>,
    session: Arc<IndexSession>,
    /// Absent when no message source is configured.
    indexer: Option<Arc<ChannelIndexer>>,
    status: Arc<StatusBoard>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        catalog: Arc<dyn CatalogStore>,
        session: Arc<IndexSession>,
        indexer: Option<Arc<ChannelIndexer>>,
        status: Arc<StatusBoard>,
    ) -> Self {
        Self {
            config,
            authenticator,
            catalog,
            session,
            indexer,
            status,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogStore> {
        &self.catalog
    }

    pub fn session(&self) -> &Arc<IndexSession> {
        &self.session
    }

    pub fn indexer(&self) -> Option<&Arc<ChannelIndexer>> {
        self.indexer.as_ref()
    }

    pub fn status(&self) -> &Arc<StatusBoard> {
        &self.status
    }
}
