//! stockdash - dashboard client entry point
//!
//! This binary:
//! 1. Loads configuration
//! 2. Restores the persisted session (if any)
//! 3. Reports authentication state
//! 4. Refreshes pinned quotes periodically until Ctrl+C

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use stockdash::api::ApiClient;
use stockdash::config;
use stockdash::core::{FileTokenStore, MarketDataService, QueryCache, SessionManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenvy::dotenv().ok();

    // Initialize logging
    config::init_logging();

    info!("stockdash client starting...");

    // Load configuration from YAML
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    let config = match config::load_config(Path::new(&config_path)) {
        Ok(cfg) => {
            info!(base_url = %cfg.api.base_url, "[CONFIG] Configuration loaded");
            cfg
        }
        Err(e) => {
            error!("[ERROR] Configuration failed: {}", e);
            std::process::exit(1);
        }
    };

    let client = ApiClient::with_timeout(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
    );
    let cache = Arc::new(QueryCache::new(Duration::from_secs(config.cache.ttl_secs)));
    let store = FileTokenStore::new(&config.session.token_path);
    let manager = Arc::new(SessionManager::new(client.clone(), store, Arc::clone(&cache)));

    // Restore any persisted session; failures land logged out
    let session = manager.hydrate().await?;
    match &session.user {
        Some(user) => info!(
            username = %user.username,
            tier = %user.subscription.tier,
            "[SESSION] Restored authenticated session"
        ),
        None => info!("[SESSION] No valid session, starting logged out"),
    }

    let market = MarketDataService::new(client, cache, manager.handle());

    // Create shutdown broadcast channel
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

    // Spawn SIGINT handler task
    let shutdown_signal = shutdown_tx.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("[SHUTDOWN] Graceful shutdown initiated");
                let _ = shutdown_signal.send(());
            }
            Err(err) => {
                eprintln!("Failed to listen for Ctrl+C signal: {}", err);
            }
        }
    });

    // Pinned symbols come from the user's settings when logged in
    let pinned: Vec<String> = session
        .user
        .as_ref()
        .map(|u| u.settings.default_assets.clone())
        .unwrap_or_default();
    if pinned.is_empty() {
        info!("[QUOTE] No pinned symbols, idling until shutdown");
    }

    let mut refresh = tokio::time::interval(Duration::from_secs(config.cache.ttl_secs));
    loop {
        tokio::select! {
            _ = refresh.tick() => {
                if pinned.is_empty() {
                    continue;
                }
                match market.quotes(&pinned).await {
                    Ok(quotes) => {
                        for quote in &quotes {
                            info!(
                                symbol = %quote.symbol,
                                last = %quote.last,
                                change_percent = %quote.change_percent,
                                "[QUOTE] Refreshed"
                            );
                        }
                    }
                    Err(e) => warn!(error = %e, "[QUOTE] Refresh failed"),
                }
            }
            _ = shutdown_rx.recv() => {
                info!("[SHUTDOWN] Shutdown signal received in main task");
                break;
            }
        }
    }

    info!("[SHUTDOWN] Clean exit");
    Ok(())
}
