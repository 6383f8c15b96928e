pub mod auth;
pub mod catalog;
pub mod config;
pub mod indexer;
pub mod metrics;
pub mod source;
pub mod testing;

pub use auth::{
    create_authenticator, AdminList, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator,
    Identity, NoneAuthenticator,
};
pub use catalog::{
    CatalogError, CatalogStore, Category, JsonCatalogStore, MediaRecord, MediaRequest,
    WorkingCatalog,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, ChannelsConfig,
    Config, ConfigError, SanitizedConfig, ServerConfig, StorageConfig, TelegramConfig,
};
pub use indexer::{
    ChannelIndexer, IndexError, IndexOutcome, IndexRequest, IndexSession, IndexStatus,
    IndexerConfig, NoopNotifier, NotifierSet, ProgressEvent, ProgressNotifier, SingleOutcome,
    StatusBoard,
};
pub use source::{
    extract_media, ChannelRef, ChannelTarget, ExtractedMedia, MessageSource, SourceError,
    SourceMessage, TelegramSource,
};
