//! Readiness endpoint; liveness is served by `health_router`

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use domain_products::{CatalogStore, ProductService};
use serde_json::Value;
use std::sync::Arc;

async fn ready<S: CatalogStore>(
    State(service): State<Arc<ProductService<S>>>,
) -> (StatusCode, Json<Value>) {
    let catalog: HealthCheckFuture<'_> =
        Box::pin(async { service.health_check().await.map_err(|e| e.to_string()) });
    run_health_checks(vec![("catalog", catalog)]).await
}

/// `GET /ready`: 200 once the catalog store answers a ping, 503 otherwise
pub fn router<S: CatalogStore + 'static>(service: ProductService<S>) -> Router {
    Router::new()
        .route("/ready", get(ready::<S>))
        .with_state(Arc::new(service))
}
