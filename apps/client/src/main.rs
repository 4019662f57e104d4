use std::sync::Arc;

use anyhow::Result;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway_cell::ApiGateway;
use session_cell::SessionManager;
use shared_config::AppConfig;

/// Composition root: wires the gateway and session manager, probes the
/// backend, and runs the startup session revalidation. The presentation layer
/// builds on top of these services.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting MedBook client");

    let config = AppConfig::from_env();
    let gateway = Arc::new(ApiGateway::new(&config));

    match gateway.health().await {
        Ok(envelope) if envelope.success => info!("Backend reachable at {}", gateway.base_url()),
        Ok(envelope) => warn!("Backend unhealthy: {}", envelope.message),
        Err(err) => warn!("Backend unreachable: {}", err),
    }

    let mut session = SessionManager::new(Arc::clone(&gateway), &config);
    session.initialize().await;

    match session.user() {
        Some(user) => info!("Session restored for {} ({})", user.username, user.role),
        None => info!("No stored session, starting anonymous"),
    }

    Ok(())
}
