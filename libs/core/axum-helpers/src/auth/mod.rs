//! Bearer-token authentication.
//!
//! - [`TokenVerifier`]: seam to the identity provider, with the HS256
//!   [`JwtVerifier`] as default implementation
//! - [`require_auth`]: middleware reading the token from
//!   `Authorization: Bearer` or the `token` cookie
//! - [`AuthUser`]: extractor for the verified caller
//! - [`AuthEvents`]: auth-change subscriptions
//!
//! ```ignore
//! use axum_helpers::auth::{AuthEvents, AuthState, JwtConfig, JwtVerifier, require_auth};
//! use core_config::FromEnv;
//!
//! let verifier = JwtVerifier::new(&JwtConfig::from_env()?);
//! let auth = AuthState::new(Arc::new(verifier), AuthEvents::new());
//!
//! let protected = Router::new()
//!     .route("/session", get(handler))
//!     .route_layer(axum::middleware::from_fn_with_state(auth, require_auth));
//! ```

pub mod config;
pub mod events;
pub mod jwt;
pub mod middleware;
pub mod verifier;

pub use config::JwtConfig;
pub use events::{AuthEvent, AuthEvents, Subscription};
pub use jwt::{ACCESS_TOKEN_TTL, JwtClaims, JwtVerifier};
pub use middleware::{AuthState, TOKEN_COOKIE, extract_token, require_auth};
pub use verifier::{AuthError, AuthUser, TokenVerifier};
