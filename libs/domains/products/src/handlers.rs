//! HTTP handlers for the storefront catalog

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use axum_helpers::{
    AuthState, AuthUser, TOTAL_COUNT_HEADER, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ForbiddenResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
    require_auth,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{
    CreateProduct, Product, ProductSummary, Review, ReviewInput, ReviewListParams, ReviewSort,
};
use crate::query::{ProductListParams, SortOrder};
use crate::repository::CatalogStore;
use crate::service::ProductService;

/// OpenAPI documentation for the catalog endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        list_reviews,
        add_review,
        get_review,
        update_review,
        delete_review,
        list_categories,
    ),
    components(
        schemas(Product, ProductSummary, CreateProduct, Review, ReviewInput, ReviewSort, SortOrder),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product listing, search and detail"),
        (name = "Reviews", description = "Product reviews"),
        (name = "Categories", description = "Category browsing")
    )
)]
pub struct ApiDoc;

/// Create the catalog router
///
/// Writes (`POST /products`, `POST/PUT/DELETE` on reviews) sit behind
/// [`require_auth`]; everything else is public.
pub fn router<S: CatalogStore + 'static>(service: ProductService<S>, auth: AuthState) -> Router {
    let shared_service = Arc::new(service);
    let authenticated = from_fn_with_state(auth, require_auth);

    Router::new()
        .route(
            "/products",
            get(list_products).merge(post(create_product).route_layer(authenticated.clone())),
        )
        .route("/products/{id}", get(get_product))
        .route(
            "/products/{id}/reviews",
            get(list_reviews).merge(post(add_review).route_layer(authenticated.clone())),
        )
        .route(
            "/products/{id}/reviews/{review_id}",
            get(get_review).merge(
                put(update_review)
                    .delete(delete_review)
                    .route_layer(authenticated),
            ),
        )
        .route("/categories", get(list_categories))
        .with_state(shared_service)
}

/// List products: filter, fuzzy search, sort, paginate
///
/// Malformed paging or sort values are clamped, never rejected. The number of
/// matches before pagination is returned in `X-Total-Count`.
#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    params(ProductListParams),
    responses(
        (status = 200, description = "Page of products (summaries when summary=true)", body = Vec<Product>,
            headers(("x-total-count" = usize, description = "Matches before pagination"))),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<S: CatalogStore>(
    State(service): State<Arc<ProductService<S>>>,
    Query(params): Query<ProductListParams>,
) -> ProductResult<Response> {
    let query = params.normalize(service.query_config());
    let page = service.list_products(&query).await?;
    let total = [(TOTAL_COUNT_HEADER, page.total.to_string())];

    if params.wants_summary() {
        let summaries: Vec<ProductSummary> = page.items.iter().map(ProductSummary::from).collect();
        Ok((total, Json(summaries)).into_response())
    } else {
        Ok((total, Json(page.items)).into_response())
    }
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/products",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_product<S: CatalogStore>(
    State(service): State<Arc<ProductService<S>>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<S: CatalogStore>(
    State(service): State<Arc<ProductService<S>>>,
    Path(id): Path<String>,
) -> ProductResult<Json<Product>> {
    let product = service.get_product(&id).await?;
    Ok(Json(product))
}

/// List a product's reviews
#[utoipa::path(
    get,
    path = "/products/{id}/reviews",
    tag = "Reviews",
    params(("id" = String, Path, description = "Product ID"), ReviewListParams),
    responses(
        (status = 200, description = "Reviews, ties ordered by review id", body = Vec<Review>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_reviews<S: CatalogStore>(
    State(service): State<Arc<ProductService<S>>>,
    Path(id): Path<String>,
    Query(params): Query<ReviewListParams>,
) -> ProductResult<Json<Vec<Review>>> {
    let sort = ReviewSort::parse_lenient(params.sort.as_deref());
    let reviews = service.list_reviews(&id, sort).await?;
    Ok(Json(reviews))
}

/// Add a review as the signed-in user
#[utoipa::path(
    post,
    path = "/products/{id}/reviews",
    tag = "Reviews",
    params(("id" = String, Path, description = "Product ID")),
    request_body = ReviewInput,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn add_review<S: CatalogStore>(
    State(service): State<Arc<ProductService<S>>>,
    Path(id): Path<String>,
    user: AuthUser,
    ValidatedJson(input): ValidatedJson<ReviewInput>,
) -> ProductResult<impl IntoResponse> {
    let review = service.add_review(&id, &user, input).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Get a single review
#[utoipa::path(
    get,
    path = "/products/{id}/reviews/{review_id}",
    tag = "Reviews",
    params(
        ("id" = String, Path, description = "Product ID"),
        ("review_id" = String, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review found", body = Review),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_review<S: CatalogStore>(
    State(service): State<Arc<ProductService<S>>>,
    Path((id, review_id)): Path<(String, String)>,
) -> ProductResult<Json<Review>> {
    let review = service.get_review(&id, &review_id).await?;
    Ok(Json(review))
}

/// Edit your own review
#[utoipa::path(
    put,
    path = "/products/{id}/reviews/{review_id}",
    tag = "Reviews",
    params(
        ("id" = String, Path, description = "Product ID"),
        ("review_id" = String, Path, description = "Review ID")
    ),
    request_body = ReviewInput,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_review<S: CatalogStore>(
    State(service): State<Arc<ProductService<S>>>,
    Path((id, review_id)): Path<(String, String)>,
    user: AuthUser,
    ValidatedJson(input): ValidatedJson<ReviewInput>,
) -> ProductResult<Json<Review>> {
    let review = service.update_review(&id, &review_id, &user, input).await?;
    Ok(Json(review))
}

/// Delete your own review
#[utoipa::path(
    delete,
    path = "/products/{id}/reviews/{review_id}",
    tag = "Reviews",
    params(
        ("id" = String, Path, description = "Product ID"),
        ("review_id" = String, Path, description = "Review ID")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_review<S: CatalogStore>(
    State(service): State<Arc<ProductService<S>>>,
    Path((id, review_id)): Path<(String, String)>,
    user: AuthUser,
) -> ProductResult<StatusCode> {
    service.delete_review(&id, &review_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Sorted, de-duplicated category names
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "Category names", body = Vec<String>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<S: CatalogStore>(
    State(service): State<Arc<ProductService<S>>>,
) -> ProductResult<Json<Vec<String>>> {
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}
