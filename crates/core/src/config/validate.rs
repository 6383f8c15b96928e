use super::{
    types::{AuthMethod, Config},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - api_key auth has a key
/// - Indexer tunables are non-zero (except the delay)
/// - No channel is configured for both categories
/// - Telegram section (if present) has a token
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_deref().unwrap_or("").is_empty()
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method = \"api_key\"".to_string(),
        ));
    }

    if config.indexer.window_size == 0 {
        return Err(ConfigError::ValidationError(
            "indexer.window_size cannot be 0".to_string(),
        ));
    }
    if config.indexer.progress_every == 0 {
        return Err(ConfigError::ValidationError(
            "indexer.progress_every cannot be 0".to_string(),
        ));
    }

    if let Some(shared) = config
        .channels
        .movies
        .iter()
        .find(|id| config.channels.tv_shows.contains(id))
    {
        return Err(ConfigError::ValidationError(format!(
            "channel {} is configured for both movies and tv_shows",
            shared
        )));
    }

    if let Some(telegram) = &config.telegram {
        if telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "telegram.bot_token cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AuthConfig, ChannelsConfig, ServerConfig, StorageConfig, TelegramConfig,
    };
    use crate::indexer::IndexerConfig;

    fn base_config() -> Config {
        Config {
            auth: AuthConfig {
                method: AuthMethod::None,
                api_key: None,
            },
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            channels: ChannelsConfig::default(),
            indexer: IndexerConfig::default(),
            telegram: None,
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = base_config();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_api_key_required() {
        let mut config = base_config();
        config.auth.method = AuthMethod::ApiKey;
        assert!(validate_config(&config).is_err());

        config.auth.api_key = Some("key".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_window_fails() {
        let mut config = base_config();
        config.indexer.window_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_progress_interval_fails() {
        let mut config = base_config();
        config.indexer.progress_every = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_overlapping_channels_fails() {
        let mut config = base_config();
        config.channels.movies = vec![-1001, -1002];
        config.channels.tv_shows = vec![-1002];
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("-1002"));
    }

    #[test]
    fn test_validate_empty_bot_token_fails() {
        let mut config = base_config();
        config.telegram = Some(TelegramConfig {
            bot_token: "  ".to_string(),
            admins: vec![1],
            probe_chat_id: 1,
        });
        assert!(validate_config(&config).is_err());
    }
}
