//! Products Domain
//!
//! Storefront catalog: product listing with fuzzy search, product detail,
//! embedded reviews and category browsing, backed by MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, auth layer on writes
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌──────────────┐
//! │   Service   │ ──► │ Query Engine │  ← filter → search → sort → paginate
//! └──────┬──────┘     └──────────────┘
//!        │
//! ┌──────▼──────┐
//! │ CatalogStore│  ← Data access (trait + MongoDB / in-memory implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{AuthEvents, AuthState, JwtConfig, JwtVerifier};
//! use domain_products::{handlers, mongodb::MongoCatalogStore, service::ProductService};
//! use mongodb::Client;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("storefront");
//!
//! let store = MongoCatalogStore::new(&db);
//! let service = ProductService::new(store);
//!
//! let verifier = JwtVerifier::new(&JwtConfig::new("a-secret-of-at-least-thirty-two-chars")?);
//! let auth = AuthState::new(Arc::new(verifier), AuthEvents::new());
//!
//! let router = handlers::router(service, auth);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod query;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use memory::InMemoryCatalog;
pub use models::{
    CreateProduct, Product, ProductSummary, Review, ReviewInput, ReviewListParams, ReviewSort,
    SessionInfo,
};
pub use mongodb::MongoCatalogStore;
pub use query::{
    EditDistanceMatcher, ProductListParams, ProductQuery, QueryConfig, QueryEngine, QueryPage,
    SortOrder, TitleMatcher,
};
pub use repository::CatalogStore;
pub use service::ProductService;
