//! OpenAPI documentation configuration

use axum_helpers::errors::responses::ServiceUnavailableResponse;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::session;

/// Combined OpenAPI documentation for the Storefront API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = "Product catalog with fuzzy search, reviews and token-based sessions",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3003", description = "Local development server")
    ),
    paths(session::session),
    components(
        schemas(domain_products::SessionInfo),
        responses(ServiceUnavailableResponse)
    ),
    nest(
        (path = "/api", api = domain_products::ApiDoc)
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Session", description = "Signed-in caller")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected operations.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_catalog_and_session_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/api/products", "/api/products/{id}/reviews", "/api/categories", "/api/session"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_openapi_declares_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
