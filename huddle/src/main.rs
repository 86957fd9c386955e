mod server;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use huddle_core::{
    bootstrap::init_database,
    logging,
    relay::RelayManager,
    repository::{ChatRepository, SessionRepository},
    service::{ChatService, SessionService},
    Config,
};

use server::{HuddleServer, Services};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration (optional path as the first argument)
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("Huddle server starting...");
    info!("HTTP address: {}", config.http_address());

    // 3. Initialize database
    let pool = init_database(&config).await?;

    // 4. Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            error!("Failed to run migrations: {}", e);
            anyhow::anyhow!("Migration failed: {e}")
        })?;
    info!("Migrations completed");

    // 5. Initialize services and the relay
    let session_service = Arc::new(SessionService::new(
        Arc::new(SessionRepository::new(pool.clone())),
        config.session.code_length,
    ));
    let chat_service = Arc::new(ChatService::new(Arc::new(ChatRepository::new(pool))));
    let relay = Arc::new(RelayManager::new());
    info!("Relay initialized");

    let services = Services {
        session_service,
        chat_service,
        relay,
    };

    // 6. Serve until shutdown
    let server = HuddleServer::new(config, services);
    server.start().await?;

    Ok(())
}
