use axum::http::{HeaderName, HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Response header carrying the number of matches before pagination.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// CORS layer for a browser storefront.
///
/// - Allowed origins: `origins` (at least one, each a valid header value)
/// - Methods: GET, POST, PUT, DELETE, PATCH, OPTIONS
/// - Headers: Content-Type, Authorization, Accept, Cookie
/// - Exposed: `X-Total-Count`
/// - Credentials allowed, 1 hour max age
pub fn create_cors_layer(origins: &[String]) -> io::Result<CorsLayer> {
    let allowed_origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS origin: {e}"),
            )
        })?;

    if allowed_origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "At least one CORS origin is required",
        ));
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::COOKIE,
        ])
        .expose_headers([HeaderName::from_static(TOTAL_COUNT_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_valid_origins() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "https://shop.example.com".to_string(),
        ];
        assert!(create_cors_layer(&origins).is_ok());
    }

    #[test]
    fn test_cors_layer_rejects_empty_list() {
        let err = create_cors_layer(&[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        let err = create_cors_layer(&["bad\norigin".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Invalid CORS origin"));
    }
}
