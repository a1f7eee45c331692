//! Catalog routes backed by MongoDB

use axum::Router;
use domain_products::{MongoCatalogStore, ProductService, handlers};

use crate::state::AppState;

/// Create the catalog router (`/products`, reviews, `/categories`)
pub fn router(state: &AppState) -> Router {
    let store = MongoCatalogStore::new(&state.db);
    let service = ProductService::new(store)
        .with_query_config(state.config.catalog.clone())
        .with_read_retry(state.config.retry.clone());
    handlers::router(service, state.auth.clone())
}

/// Initialize catalog indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    let store = MongoCatalogStore::new(&state.db);
    store.init_indexes().await?;
    Ok(())
}
