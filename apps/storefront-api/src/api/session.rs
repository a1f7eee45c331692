//! Who am I: echoes the verified caller

use axum::{Json, Router, middleware::from_fn_with_state, routing::get};
use axum_helpers::{
    AuthState, AuthUser,
    errors::responses::{ServiceUnavailableResponse, UnauthorizedResponse},
    require_auth,
};
use domain_products::SessionInfo;

/// Identity behind the presented token
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Session",
    responses(
        (status = 200, description = "Token accepted", body = SessionInfo),
        (status = 401, response = UnauthorizedResponse),
        (status = 503, response = ServiceUnavailableResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn session(user: AuthUser) -> Json<SessionInfo> {
    Json(SessionInfo {
        message: "Access granted".to_string(),
        uid: user.subject_id,
        email: user.email,
    })
}

pub fn router(auth: AuthState) -> Router {
    Router::new()
        .route("/session", get(session))
        .route_layer(from_fn_with_state(auth, require_auth))
}
