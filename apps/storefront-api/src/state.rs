//! Application state management

use axum_helpers::AuthState;
use mongodb::{Client, Database};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
    /// Token verifier plus the auth-change registry
    pub auth: AuthState,
}
