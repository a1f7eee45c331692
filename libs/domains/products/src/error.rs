use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, AuthError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Review {review_id} not found on product {product_id}")]
    ReviewNotFound {
        product_id: String,
        review_id: String,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// The catalog store could not be reached or failed mid-operation.
    #[error("Catalog store failure: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProductError {
    /// Transient failures worth retrying on reads.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProductError::Upstream(_))
    }
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::ReviewNotFound {
                product_id,
                review_id,
            } => AppError::NotFound(format!(
                "Review {} not found on product {}",
                review_id, product_id
            )),
            ProductError::Unauthorized(msg) => AppError::Unauthorized(msg),
            ProductError::Forbidden(msg) => AppError::Forbidden(msg),
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::Upstream(detail) => AppError::Upstream {
                public: "The product catalog is temporarily unavailable".to_string(),
                detail,
            },
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Upstream(err.to_string())
    }
}

impl From<AuthError> for ProductError {
    fn from(err: AuthError) -> Self {
        ProductError::Unauthorized(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ProductError::NotFound("1".into()), StatusCode::NOT_FOUND),
            (
                ProductError::ReviewNotFound {
                    product_id: "1".into(),
                    review_id: "r".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (ProductError::Unauthorized("no token".into()), StatusCode::UNAUTHORIZED),
            (ProductError::Forbidden("not yours".into()), StatusCode::FORBIDDEN),
            (ProductError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ProductError::Upstream("timeout".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ProductError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_only_upstream_is_transient() {
        assert!(ProductError::Upstream("reset".into()).is_transient());
        assert!(!ProductError::NotFound("1".into()).is_transient());
        assert!(!ProductError::Internal("x".into()).is_transient());
    }
}
