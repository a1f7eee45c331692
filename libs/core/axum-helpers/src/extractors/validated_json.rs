//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor that runs `Validate` before the handler sees the value.
///
/// Malformed JSON is rejected with the `JSON_EXTRACTION` code; a body that
/// parses but fails validation is rejected with `VALIDATION_ERROR` and the
/// per-field errors in `details`.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct NewReview {
///     #[validate(range(min = 1, max = 5))]
///     rating: u8,
/// }
///
/// async fn add_review(ValidatedJson(review): ValidatedJson<NewReview>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode, header},
        routing::post,
    };
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Payload {
        #[validate(range(min = 1, max = 5))]
        rating: u8,
    }

    fn app() -> Router {
        Router::new().route(
            "/",
            post(|ValidatedJson(p): ValidatedJson<Payload>| async move { p.rating.to_string() }),
        )
    }

    fn request(body: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_payload_passes() {
        let response = app().oneshot(request(r#"{"rating":4}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"4");
    }

    #[tokio::test]
    async fn test_out_of_range_rejected_with_details() {
        let response = app().oneshot(request(r#"{"rating":9}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["details"]["rating"].is_array());
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let response = app().oneshot(request("{rating")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
