//! Server lifecycle management: bind, serve, shut down gracefully.

use std::sync::Arc;
use tracing::{error, info};

use huddle_core::relay::RelayManager;
use huddle_core::service::{ChatService, SessionService};
use huddle_core::Config;

/// Container for shared services
#[derive(Clone)]
pub struct Services {
    pub session_service: Arc<SessionService>,
    pub chat_service: Arc<ChatService>,
    pub relay: Arc<RelayManager>,
}

/// Huddle server - owns the HTTP listener lifetime
pub struct HuddleServer {
    config: Config,
    services: Services,
}

impl HuddleServer {
    #[must_use]
    pub const fn new(config: Config, services: Services) -> Self {
        Self { config, services }
    }

    /// Start the HTTP server and wait for a shutdown signal
    pub async fn start(self) -> anyhow::Result<()> {
        let router = huddle_api::http::create_router(
            self.services.session_service,
            self.services.chat_service,
            self.services.relay,
            &self.config.server.cors_origins,
        );

        let http_address = self.config.http_address();
        let listener = tokio::net::TcpListener::bind(&http_address)
            .await
            .map_err(|e| {
                error!("Failed to bind HTTP address {}: {}", http_address, e);
                anyhow::anyhow!("Failed to bind {http_address}: {e}")
            })?;

        info!("HTTP server listening on {}", http_address);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server shut down gracefully");
        Ok(())
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT/Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("Received Ctrl+C"); }
        () = terminate => { info!("Received SIGTERM"); }
    }
}
