use dotenvy::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use common::{Settings, logger};
use market_data::BinanceClient;
use storage::{CredentialRepository, CredentialStore, Database};

use crate::router::{AppState, create_router};
use crate::services::{CredentialService, DedupWindow, DispatchService};

mod router;
mod services;
#[cfg(test)]
mod test_support;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger("info");

    let settings = Arc::new(Settings::from_env()?);
    info!(?settings, "Relay starting up...");
    if settings.webhook_secret.is_none() {
        warn!("WEBHOOK_SECRET is not set; only per-credential tokens will be accepted");
    }
    if settings.admin_token.is_none() {
        warn!("ADMIN_TOKEN is not set; admin routes will refuse every request");
    }

    let db = Database::connect(&settings.database_path).await?;
    let store: Arc<dyn CredentialStore> = Arc::new(CredentialRepository::new(db.clone()));

    let exchange = Arc::new(BinanceClient::from_settings(&settings)?);
    let dispatcher = Arc::new(DispatchService::new(
        exchange,
        CredentialService::new(store.clone(), &settings),
        DedupWindow::new(settings.idempotency_window),
        settings.request_deadline,
    ));

    let app = create_router(AppState::new(dispatcher, store, settings.clone()));

    let listener = TcpListener::bind(settings.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
