//! # Axum Helpers
//!
//! Shared building blocks for the workspace's Axum services.
//!
//! - **[`auth`]**: bearer-token verification, auth middleware, auth-change subscriptions
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: structured error responses with error codes
//! - **[`extractors`]**: validated JSON bodies
//! - **[`audit`]**: audit logging for security-relevant events

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    AuthError, AuthEvent, AuthEvents, AuthState, AuthUser, JwtConfig, JwtVerifier, Subscription,
    TokenVerifier, require_auth,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{TOTAL_COUNT_HEADER, create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::ValidatedJson;

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers};
