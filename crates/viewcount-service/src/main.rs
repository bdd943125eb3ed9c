//! View-counter service binary.
//!
//! Wires the persistent counter, the increment service, the broadcast
//! publisher and the HTTP server together, then serves until it receives
//! SIGINT or SIGTERM.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `viewcount-config.yaml` (or `$VIEWCOUNT_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the configured counter store
//! 4. Load the starting count into the increment service
//! 5. Start the NATS relay if `pubsub.nats_url` is set
//! 6. Serve HTTP until shutdown

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use viewcount_core::config::{LogFormat, LoggingConfig, StorageBackend, StorageConfig};
use viewcount_core::{BroadcastPublisher, IncrementService, NatsRelay, ServiceConfig};
use viewcount_server::AppState;
use viewcount_store::{CounterBackend, DragonflyStore, FileStore};

use crate::error::ServiceError;

/// Config file read when `VIEWCOUNT_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "viewcount-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::var("VIEWCOUNT_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, config_found) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("viewcount-service starting");
    if config_found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Open the counter store.
    let store = open_store(&config.storage).await?;

    // 4. Load the starting count.
    let publisher = BroadcastPublisher::new(
        config.pubsub.broadcast_capacity,
        &config.pubsub.channel,
        &config.pubsub.event,
    );
    let service = IncrementService::open(store, publisher, config.storage.on_malformed)
        .await
        .map_err(ServiceError::from)?;
    let state = Arc::new(AppState::new(service));
    info!(
        channel = config.pubsub.channel,
        event = config.pubsub.event,
        "Broadcast publisher ready"
    );

    // 5. Start the NATS relay.
    let relay_handle = match &config.pubsub.nats_url {
        Some(url) => {
            match NatsRelay::connect(url, &config.pubsub.channel, &config.pubsub.event).await {
                Ok(relay) => Some(relay.spawn(state.subscribe())),
                Err(e) => {
                    warn!(error = %e, "NATS relay unavailable, continuing without it");
                    None
                }
            }
        }
        None => None,
    };

    // 6. Serve until shutdown.
    viewcount_server::start_server(&config.server, Arc::clone(&state), shutdown_signal())
        .await
        .map_err(ServiceError::from)?;

    if let Some(handle) = relay_handle {
        handle.abort();
    }

    info!("viewcount-service shutdown complete");
    Ok(())
}

/// Load configuration from `path`, falling back to defaults when it is
/// missing. Environment overrides apply either way.
///
/// Returns the configuration and whether the file existed.
fn load_config(path: &Path) -> Result<(ServiceConfig, bool), ServiceError> {
    if path.exists() {
        Ok((ServiceConfig::from_file(path)?, true))
    } else {
        let mut config = ServiceConfig::default();
        config.apply_env_overrides()?;
        Ok((config, false))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.level`.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Open the store selected by `config.backend`.
async fn open_store(config: &StorageConfig) -> Result<CounterBackend, ServiceError> {
    let backend = match config.backend {
        StorageBackend::File => {
            info!(path = %config.file_path.display(), "Using file counter store");
            CounterBackend::from(FileStore::open(&config.file_path).await?)
        }
        StorageBackend::Dragonfly => {
            info!(url = config.dragonfly_url, key = config.key, "Using Dragonfly counter store");
            CounterBackend::from(DragonflyStore::connect(&config.dragonfly_url, &config.key).await?)
        }
    };
    Ok(backend)
}

/// Resolve on SIGINT or SIGTERM (Ctrl-C elsewhere).
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "failed to register signal handlers, falling back to Ctrl-C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received");
}
