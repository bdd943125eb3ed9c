//! HTTP server lifecycle management.
//!
//! Provides [`start_server`] which binds to a TCP port and runs the Axum
//! server until the supplied shutdown future resolves. In-flight requests,
//! including increments holding the counter lock, finish before it returns.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use viewcount_core::config::ServerConfig;
use viewcount_store::CounterStore;

use crate::router::build_router;
use crate::state::AppState;

/// Start the HTTP server.
///
/// Binds to the configured address, builds the router, and serves
/// requests until `shutdown` completes. Returns `Ok(())` on clean
/// shutdown, or an error if binding or serving fails.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind or the server
/// encounters a fatal I/O error.
pub async fn start_server<S, F>(
    config: &ServerConfig,
    state: Arc<AppState<S>>,
    shutdown: F,
) -> Result<(), ServerError>
where
    S: CounterStore,
    F: Future<Output = ()> + Send + 'static,
{
    let addr = socket_addr(config)?;
    let router = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "viewcount server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!("viewcount server stopped");
    Ok(())
}

/// Resolve the configured host and port into a socket address.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the pair is not a valid address.
pub fn socket_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
    format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))
}

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_addr_accepts_ip_and_port() {
        let config = ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 4000,
        };
        assert_eq!(
            socket_addr(&config).ok(),
            Some(SocketAddr::from(([127, 0, 0, 1], 4000)))
        );
    }

    #[test]
    fn socket_addr_rejects_hostname() {
        let config = ServerConfig {
            host: "not an address".to_owned(),
            port: 4000,
        };
        assert!(matches!(socket_addr(&config), Err(ServerError::Bind(_))));
    }
}
