//! API routes module

pub mod health;
pub mod products;
pub mod session;

use axum::Router;
use domain_products::{MongoCatalogStore, ProductService};

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .merge(products::router(state))
        .merge(session::router(state.auth.clone()))
        .merge(health::router(ProductService::new(MongoCatalogStore::new(&state.db))))
}

/// Initialize database indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    products::init_indexes(state).await
}
