use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::catalog::Category;
use crate::indexer::IndexerConfig;
use crate::source::ChannelRef;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration for the HTTP admin surface
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Required when method = "api_key"
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Where catalog documents live.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Channels the indexer is allowed to sweep, per category.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChannelsConfig {
    #[serde(default)]
    pub movies: Vec<i64>,
    #[serde(default)]
    pub tv_shows: Vec<i64>,
}

impl ChannelsConfig {
    /// Category a channel is configured for, if any.
    pub fn category_of(&self, channel: ChannelRef) -> Option<Category> {
        if self.movies.contains(&channel.0) {
            Some(Category::Movie)
        } else if self.tv_shows.contains(&channel.0) {
            Some(Category::TvShow)
        } else {
            None
        }
    }

    pub fn is_authorized(&self, channel: ChannelRef, category: Category) -> bool {
        self.channels_for(category).contains(&channel.0)
    }

    pub fn channels_for(&self, category: Category) -> &[i64] {
        match category {
            Category::Movie => &self.movies,
            Category::TvShow => &self.tv_shows,
        }
    }
}

/// Telegram bot configuration. The bot front end and the Telegram message
/// source are only started when this section is present.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// User ids allowed to run administrative commands.
    #[serde(default)]
    pub admins: Vec<i64>,
    /// Chat the bot forwards channel messages into to read them.
    pub probe_chat_id: i64,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub channels: ChannelsConfig,
    pub indexer: IndexerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<SanitizedTelegramConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub api_key_configured: bool,
}

/// Sanitized Telegram config (bot token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTelegramConfig {
    pub bot_token_configured: bool,
    pub admin_count: usize,
    pub probe_chat_id: i64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
                api_key_configured: config
                    .auth
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
            },
            server: config.server.clone(),
            storage: config.storage.clone(),
            channels: config.channels.clone(),
            indexer: config.indexer.clone(),
            telegram: config.telegram.as_ref().map(|t| SanitizedTelegramConfig {
                bot_token_configured: !t.bot_token.is_empty(),
                admin_count: t.admins.len(),
                probe_chat_id: t.probe_chat_id,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[auth]
method = "none"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.auth.method, AuthMethod::None);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert!(config.channels.movies.is_empty());
        assert_eq!(config.indexer.window_size, 100);
        assert!(config.telegram.is_none());
    }

    #[test]
    fn test_deserialize_missing_auth_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[auth]
method = "api_key"
api_key = "s3cret"

[server]
host = "127.0.0.1"
port = 9000

[storage]
data_dir = "/var/lib/cinedex"

[channels]
movies = [-1001111]
tv_shows = [-1002222, -1003333]

[indexer]
window_size = 50
progress_every = 10
window_delay_ms = 0

[telegram]
bot_token = "123:abc"
admins = [42, 43]
probe_chat_id = -1009999
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.auth.method, AuthMethod::ApiKey);
        assert_eq!(config.auth.api_key.as_deref(), Some("s3cret"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/cinedex"));
        assert_eq!(config.channels.tv_shows, vec![-1002222, -1003333]);
        assert_eq!(config.indexer.window_size, 50);
        assert_eq!(config.indexer.progress_every, 10);

        let telegram = config.telegram.unwrap();
        assert_eq!(telegram.admins, vec![42, 43]);
        assert_eq!(telegram.probe_chat_id, -1009999);
    }

    #[test]
    fn test_channel_category_lookup() {
        let channels = ChannelsConfig {
            movies: vec![-100_1],
            tv_shows: vec![-100_2],
        };
        assert_eq!(channels.category_of(ChannelRef(-100_1)), Some(Category::Movie));
        assert_eq!(channels.category_of(ChannelRef(-100_2)), Some(Category::TvShow));
        assert_eq!(channels.category_of(ChannelRef(7)), None);

        assert!(channels.is_authorized(ChannelRef(-100_1), Category::Movie));
        assert!(!channels.is_authorized(ChannelRef(-100_1), Category::TvShow));
    }

    #[test]
    fn test_sanitized_config_hides_secrets() {
        let config = Config {
            auth: AuthConfig {
                method: AuthMethod::ApiKey,
                api_key: Some("secret-key".to_string()),
            },
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            channels: ChannelsConfig::default(),
            indexer: IndexerConfig::default(),
            telegram: Some(TelegramConfig {
                bot_token: "123:token".to_string(),
                admins: vec![1, 2, 3],
                probe_chat_id: -100,
            }),
        };

        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.auth.method, "api_key");
        assert!(sanitized.auth.api_key_configured);

        let telegram = sanitized.telegram.as_ref().unwrap();
        assert!(telegram.bot_token_configured);
        assert_eq!(telegram.admin_count, 3);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));
        assert!(!json.contains("123:token"));
    }
}
