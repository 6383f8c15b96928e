use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::Bot;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinedex_core::{
    create_authenticator, load_config, validate_config, AdminList, Authenticator, CatalogStore,
    ChannelIndexer, IndexSession, JsonCatalogStore, MessageSource, StatusBoard, TelegramSource,
};
use cinedex_server::api::create_router;
use cinedex_server::bot::{run_bot, BotContext};
use cinedex_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("CINEDEX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!("Data directory: {:?}", config.storage.data_dir);
    info!(
        movies = config.channels.movies.len(),
        tv_shows = config.channels.tv_shows.len(),
        "Configured channels"
    );

    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    let catalog: Arc<dyn CatalogStore> =
        Arc::new(JsonCatalogStore::new(config.storage.data_dir.clone()));
    let session = Arc::new(IndexSession::new());
    let status = Arc::new(StatusBoard::new());

    let (indexer, bot_handle) = match &config.telegram {
        Some(telegram) => {
            let bot = Bot::new(telegram.bot_token.clone());
            let source: Arc<dyn MessageSource> =
                Arc::new(TelegramSource::new(bot.clone(), telegram.probe_chat_id));
            let indexer = Arc::new(ChannelIndexer::new(
                config.indexer.clone(),
                config.channels.clone(),
                Arc::clone(&catalog),
                Arc::clone(&source),
                Arc::clone(&session),
            ));

            let ctx = Arc::new(BotContext::new(
                Arc::clone(&indexer),
                source,
                Arc::clone(&catalog),
                Arc::clone(&status),
                AdminList::new(telegram.admins.iter().copied()),
            ));
            info!(admins = telegram.admins.len(), "Starting Telegram bot");
            let handle = tokio::spawn(run_bot(bot, ctx));
            (Some(indexer), Some(handle))
        }
        None => {
            warn!("No [telegram] section configured, indexing is disabled");
            (None, None)
        }
    };

    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        catalog,
        session,
        indexer,
        status,
    ));
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    if let Some(handle) = bot_handle {
        handle.abort();
    }
    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
