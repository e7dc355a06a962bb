//! Vortex Backend Service
//!
//! Main entry point for the live match notifier.
//! This service provides:
//! - Change detection over the live `matches` store (poll or change-feed triggered)
//! - Telegram notifications for goals, kickoffs, breaks and cards
//! - WebSocket server for browser push, with a plain status page on the same port

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use vortex_backend::config::{AppConfig, TriggerMode};
use vortex_backend::database::{create_pool, run_migrations};
use vortex_backend::detector::DetectorConfig;
use vortex_backend::error::{map_to_app_error, AppError, AppResult};
use vortex_backend::repositories::MatchRepository;
use vortex_backend::services::{ChangeFeedListener, MatchWatcher, Notifier, SnapshotSource, StoreSource, TelegramSink};
use vortex_backend::websocket::WebSocketServer;

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("vortex_backend={},sqlx=warn", config.log_level).into()
    });

    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    init_tracing(&config);

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║             Vortex Match Watcher Starting                 ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("Trigger mode: {}", config.watcher.trigger_mode.as_str());

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created (max {} connections)", config.database.max_connections);

    info!("Running database migrations...");
    run_migrations(&pool, None).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;
    info!("Database migrations completed successfully");

    // =========================================================================
    // NOTIFIERS
    // =========================================================================
    let ws_server = Arc::new(WebSocketServer::new());
    let mut notifier = Notifier::new().with_sink(ws_server.clone());

    match &config.telegram {
        Some(telegram) => {
            let sink = map_to_app_error(TelegramSink::new(telegram), "Telegram client")?;
            notifier = notifier.with_sink(Arc::new(sink));
            info!("✓ Telegram notifications enabled (chat {})", telegram.chat_id);
        }
        None => warn!("TELEGRAM_BOT_TOKEN not configured - Telegram notifications disabled"),
    }
    info!("✓ Notifier ready with sinks: {:?}", notifier.sink_names());

    // =========================================================================
    // MATCH WATCHER
    // =========================================================================
    let repo = Arc::new(MatchRepository::new(pool.clone()));
    let source: Arc<dyn SnapshotSource> = Arc::new(StoreSource::new(repo));

    let detector_config = DetectorConfig {
        notify_second_half: config.watcher.notify_second_half,
    };
    let watcher = MatchWatcher::new(source.clone(), notifier, detector_config)
        .with_poll_interval(config.watcher.poll_interval());

    let watcher_handle = match config.watcher.trigger_mode {
        TriggerMode::Poll => {
            info!("✓ Polling match store every {:?}", config.watcher.poll_interval());
            tokio::spawn(watcher.start())
        }
        TriggerMode::Feed => {
            let (tx, rx) = mpsc::channel(16);
            let listener = ChangeFeedListener::new(pool.clone(), source)
                .with_retry_delay(config.watcher.feed_retry_delay())
                .with_debounce(config.watcher.feed_debounce());
            tokio::spawn(listener.run(tx));
            info!("✓ Change feed listener started");
            tokio::spawn(watcher.start_feed(rx))
        }
    };

    // =========================================================================
    // WEBSOCKET SERVER
    // =========================================================================
    let ws_handle = if let Some(http_port) = config.http_port {
        let ws_addr: SocketAddr = format!("0.0.0.0:{}", http_port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid WebSocket address: {}", e)))?;

        let listener = TcpListener::bind(ws_addr)
            .await
            .map_err(|e| AppError::Message(format!("Failed to bind WebSocket server: {}", e)))?;

        let ws_server_clone = ws_server.clone();
        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        debug!("New connection from {}", addr);
                        let ws = ws_server_clone.clone();
                        tokio::spawn(async move {
                            if let Err(e) = ws.handle_connection(stream).await {
                                error!("WebSocket connection error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("WebSocket accept error: {}", e);
                    }
                }
            }
        });

        info!("✓ WebSocket server started on {}", ws_addr);
        Some(handle)
    } else {
        warn!("HTTP_PORT not configured - WebSocket server not started");
        None
    };

    info!("Vortex match watcher ready. Press Ctrl+C to shutdown");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
        _ = watcher_handle => {
            error!("Match watcher exited unexpectedly");
        }
        _ = async {
            if let Some(handle) = ws_handle {
                handle.await.ok();
            } else {
                // Never completes if WebSocket is not running
                futures::future::pending::<()>().await;
            }
        } => {
            error!("WebSocket server exited unexpectedly");
        }
    }

    info!("Vortex match watcher shutdown complete");
    Ok(())
}
