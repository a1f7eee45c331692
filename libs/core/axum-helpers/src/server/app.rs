use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use crate::http::{create_cors_layer, security_headers};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Wrap API routes with documentation UIs and cross-cutting middleware.
///
/// - OpenAPI docs: `/swagger-ui`, `/redoc`, `/rapidoc`, `/scalar`
///   (spec at `/api-docs/openapi.json`)
/// - `apis` nested under `/api`
/// - JSON 404 fallback
/// - request tracing, security headers, CORS from
///   `server_config.cors_allowed_origins`, response compression
///
/// Health endpoints are merged separately by the app (see `health_router`).
///
/// ```ignore
/// let router = create_router::<ApiDoc>(api_routes, &config.server)?
///     .merge(health_router(app_info!()));
/// ```
pub fn create_router<T>(apis: Router, server_config: &ServerConfig) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let cors_layer = create_cors_layer(&server_config.cors_allowed_origins)?;
    info!(
        origins = ?server_config.cors_allowed_origins,
        "CORS configured"
    );

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Serve `router` until SIGINT/SIGTERM, then run `cleanup` bounded by
/// `shutdown_timeout`.
///
/// In-flight requests are drained before the call returns.
///
/// ```ignore
/// create_production_app(app, &config.server, Duration::from_secs(30), async move {
///     drop(mongo_client);
/// })
/// .await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let coordinator = ShutdownCoordinator::default();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let signal_watcher = coordinator.clone();
    tokio::spawn(async move { signal_watcher.wait_for_signal().await });

    let cleanup_watcher = coordinator.clone();
    let cleanup_handle = tokio::spawn(async move {
        cleanup_watcher.wait_for_shutdown().await;

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(_) => info!("Cleanup completed successfully"),
            Err(_) => tracing::warn!(
                "Cleanup exceeded timeout of {:?}, forcing shutdown",
                shutdown_timeout
            ),
        }
    });

    let server_shutdown = coordinator.clone();
    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { server_shutdown.wait_for_shutdown().await })
        .await
        .inspect_err(|e| tracing::error!("Server encountered an error: {:?}", e));

    // A serve error also has to release the cleanup task
    coordinator.shutdown();
    cleanup_handle.await.ok();

    serve_result
}
