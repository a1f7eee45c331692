use super::events::{AuthEvent, AuthEvents};
use super::verifier::{AuthError, AuthUser, TokenVerifier};
use crate::audit::extract_ip_from_headers;
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Cookie consulted when no `Authorization` header is present.
pub const TOKEN_COOKIE: &str = "token";

/// Verifier plus the event registry the middleware publishes to.
#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub events: AuthEvents,
}

impl AuthState {
    pub fn new(verifier: Arc<dyn TokenVerifier>, events: AuthEvents) -> Self {
        Self { verifier, events }
    }

    /// Verify the request's token and publish the outcome.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        let token = extract_token(headers).ok_or(AuthError::MissingToken)?;
        let ip = extract_ip_from_headers(headers);

        match self.verifier.verify_token(&token).await {
            Ok(user) => {
                self.events.publish(&AuthEvent::SignedIn {
                    user: user.clone(),
                    ip,
                });
                Ok(user)
            }
            Err(err) => {
                tracing::debug!(error = %err, "Token verification failed");
                self.events.publish(&AuthEvent::Rejected {
                    reason: err.to_string(),
                    ip,
                });
                Err(err)
            }
        }
    }
}

/// Token from `Authorization: Bearer <token>`, falling back to the `token` cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name == TOKEN_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}

/// Reject requests without a valid token; on success the caller's
/// [`AuthUser`] is available to handlers as an extractor.
///
/// ```ignore
/// let protected = Router::new()
///     .route("/products", post(create_product))
///     .route_layer(axum::middleware::from_fn_with_state(auth_state, require_auth));
/// ```
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers().clone();
    let user = auth.authenticate(&headers).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::HeaderValue;

    struct StaticVerifier;

    #[async_trait]
    impl TokenVerifier for StaticVerifier {
        async fn verify_token(&self, token: &str) -> Result<AuthUser, AuthError> {
            match token {
                "good" => Ok(AuthUser {
                    subject_id: "uid-1".into(),
                    email: "ada@example.com".into(),
                }),
                _ => Err(AuthError::InvalidToken("unknown".into())),
            }
        }
    }

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_extract_token_prefers_bearer() {
        let h = headers(&[
            (header::AUTHORIZATION, "Bearer abc"),
            (header::COOKIE, "token=xyz"),
        ]);
        assert_eq!(extract_token(&h).as_deref(), Some("abc"));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let h = headers(&[(header::COOKIE, "theme=dark; token=xyz; lang=en")]);
        assert_eq!(extract_token(&h).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_extract_token_ignores_other_schemes_and_empty_values() {
        let h = headers(&[
            (header::AUTHORIZATION, "Basic dXNlcjpwYXNz"),
            (header::COOKIE, "token="),
        ]);
        assert_eq!(extract_token(&h), None);
        assert_eq!(extract_token(&headers(&[(header::AUTHORIZATION, "Bearer ")])), None);
    }

    #[tokio::test]
    async fn test_authenticate_publishes_outcomes() {
        let events = AuthEvents::new();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = events.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
        let auth = AuthState::new(Arc::new(StaticVerifier), events);

        let ok = auth
            .authenticate(&headers(&[(header::AUTHORIZATION, "Bearer good")]))
            .await;
        assert_eq!(ok.unwrap().email, "ada@example.com");

        let bad = auth
            .authenticate(&headers(&[(header::COOKIE, "token=bad")]))
            .await;
        assert!(matches!(bad, Err(AuthError::InvalidToken(_))));

        let missing = auth.authenticate(&HeaderMap::new()).await;
        assert!(matches!(missing, Err(AuthError::MissingToken)));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[0], AuthEvent::SignedIn { .. }));
        assert!(matches!(seen[1], AuthEvent::Rejected { .. }));
    }
}
