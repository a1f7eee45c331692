//! Storefront API - catalog, reviews and session over REST

use axum_helpers::server::{create_production_app, health_router};
use axum_helpers::{AuditEvent, AuthEvents, AuthState, JwtVerifier};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    let mongo_client =
        database::mongodb::connect_with_retry(&config.mongodb, Some(config.retry.clone())).await?;
    let db = mongo_client.database(config.mongodb.database());

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    // Every sign-in and rejected token lands in the audit log
    let events = AuthEvents::new();
    events.subscribe(|event| AuditEvent::from(event).log()).detach();
    let auth = AuthState::new(Arc::new(JwtVerifier::new(&config.jwt)), events);

    let state = AppState {
        config: config.clone(),
        mongo_client,
        db,
        auth,
    };

    api::init_indexes(&state).await?;

    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes, &config.server)?;
    let app = router.merge(health_router(config.app));

    info!("Starting Storefront API on {}", config.server.address());

    create_production_app(
        app,
        &config.server,
        Duration::from_secs(config.server.shutdown_timeout_secs),
        database::mongodb::disconnect(state.mongo_client),
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Storefront API shutdown complete");
    Ok(())
}
