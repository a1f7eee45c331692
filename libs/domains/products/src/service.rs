//! Product Service - Business logic layer

use axum_helpers::{AuditEvent, AuditOutcome, AuthUser};
use database::{RetryConfig, retry_if};
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, Review, ReviewInput, ReviewSort};
use crate::query::{ProductQuery, QueryConfig, QueryEngine, QueryPage};
use crate::repository::CatalogStore;

/// Product service providing business logic operations
///
/// Listing goes through the [`QueryEngine`]; review writes enforce that only
/// the author may change or delete a review. Catalog reads are retried on
/// upstream failures, writes are not.
pub struct ProductService<S: CatalogStore> {
    store: Arc<S>,
    engine: QueryEngine,
    query_config: QueryConfig,
    read_retry: RetryConfig,
}

impl<S: CatalogStore> ProductService<S> {
    /// Create a new ProductService with default query settings
    pub fn new(store: S) -> Self {
        let query_config = QueryConfig::default();
        Self {
            store: Arc::new(store),
            engine: QueryEngine::new(&query_config),
            query_config,
            read_retry: RetryConfig::default(),
        }
    }

    pub fn with_query_config(mut self, config: QueryConfig) -> Self {
        self.engine = QueryEngine::new(&config);
        self.query_config = config;
        self
    }

    /// Replace the engine, e.g. to plug in another title matcher.
    pub fn with_engine(mut self, engine: QueryEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_read_retry(mut self, config: RetryConfig) -> Self {
        self.read_retry = config;
        self
    }

    pub fn query_config(&self) -> &QueryConfig {
        &self.query_config
    }

    async fn fetch_product(&self, id: &str) -> ProductResult<Product> {
        retry_if(
            || self.store.get_product(id),
            self.read_retry.clone(),
            ProductError::is_transient,
        )
        .await?
        .ok_or_else(|| ProductError::NotFound(id.to_string()))
    }

    /// Run a listing query against a fresh catalog snapshot
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> ProductResult<QueryPage> {
        let catalog = retry_if(
            || self.store.list_products(),
            self.read_retry.clone(),
            ProductError::is_transient,
        )
        .await?;

        let page = self.engine.run(catalog, query);
        tracing::debug!(total = page.total, returned = page.items.len(), "Listing query served");
        Ok(page)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> ProductResult<Product> {
        self.fetch_product(id).await
    }

    /// Sorted, de-duplicated category names
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> ProductResult<Vec<String>> {
        let mut categories = retry_if(
            || self.store.list_categories(),
            self.read_retry.clone(),
            ProductError::is_transient,
        )
        .await?;
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let product = Product::new(input);
        self.store.insert_product(product.clone()).await?;
        Ok(product)
    }

    /// Reviews of a product in the requested order
    #[instrument(skip(self))]
    pub async fn list_reviews(&self, product_id: &str, sort: ReviewSort) -> ProductResult<Vec<Review>> {
        let mut reviews = self.fetch_product(product_id).await?.reviews;
        sort.apply(&mut reviews);
        Ok(reviews)
    }

    #[instrument(skip(self))]
    pub async fn get_review(&self, product_id: &str, review_id: &str) -> ProductResult<Review> {
        let product = self.fetch_product(product_id).await?;
        product
            .find_review(review_id)
            .cloned()
            .ok_or_else(|| review_not_found(product_id, review_id))
    }

    /// Append a review authored by `author`
    #[instrument(skip(self, author, input), fields(author = %author.subject_id))]
    pub async fn add_review(
        &self,
        product_id: &str,
        author: &AuthUser,
        input: ReviewInput,
    ) -> ProductResult<Review> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let review = Review::new(author.email.clone(), input);
        if !self.store.append_review(product_id, review.clone()).await? {
            return Err(ProductError::NotFound(product_id.to_string()));
        }

        audit(author, "review.create", product_id, &review.id, AuditOutcome::Success);
        Ok(review)
    }

    /// Edit rating and comment of the caller's own review
    #[instrument(skip(self, author, input), fields(author = %author.subject_id))]
    pub async fn update_review(
        &self,
        product_id: &str,
        review_id: &str,
        author: &AuthUser,
        input: ReviewInput,
    ) -> ProductResult<Review> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let mut review = self.owned_review(product_id, review_id, author, "review.update").await?;
        review.apply_edit(input);

        // The review may have been deleted since it was read
        if !self.store.replace_review(product_id, review.clone()).await? {
            return Err(review_not_found(product_id, review_id));
        }

        audit(author, "review.update", product_id, review_id, AuditOutcome::Success);
        Ok(review)
    }

    /// Delete the caller's own review
    #[instrument(skip(self, author), fields(author = %author.subject_id))]
    pub async fn delete_review(
        &self,
        product_id: &str,
        review_id: &str,
        author: &AuthUser,
    ) -> ProductResult<()> {
        self.owned_review(product_id, review_id, author, "review.delete").await?;

        if !self.store.remove_review(product_id, review_id).await? {
            return Err(review_not_found(product_id, review_id));
        }

        audit(author, "review.delete", product_id, review_id, AuditOutcome::Success);
        Ok(())
    }

    async fn owned_review(
        &self,
        product_id: &str,
        review_id: &str,
        author: &AuthUser,
        action: &str,
    ) -> ProductResult<Review> {
        let review = self.get_review(product_id, review_id).await?;
        if review.reviewer_email != author.email {
            audit(author, action, product_id, review_id, AuditOutcome::Denied);
            return Err(ProductError::Forbidden(
                "Only the author can change this review".to_string(),
            ));
        }
        Ok(review)
    }

    /// Whether the catalog store is reachable
    pub async fn health_check(&self) -> ProductResult<()> {
        self.store.ping().await
    }
}

fn review_not_found(product_id: &str, review_id: &str) -> ProductError {
    ProductError::ReviewNotFound {
        product_id: product_id.to_string(),
        review_id: review_id.to_string(),
    }
}

fn audit(author: &AuthUser, action: &str, product_id: &str, review_id: &str, outcome: AuditOutcome) {
    AuditEvent::new(
        Some(author.subject_id.clone()),
        action,
        Some(format!("product:{}/review:{}", product_id, review_id)),
        outcome,
    )
    .log();
}
