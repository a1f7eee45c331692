use async_trait::async_trait;

use crate::error::ProductResult;
use crate::models::{Product, Review};

/// Catalog store trait for Product persistence
///
/// Reviews are embedded in their product, so review writes address the
/// product first. Write methods return `false` when the product (or review)
/// does not exist instead of failing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Every product in the catalog
    async fn list_products(&self) -> ProductResult<Vec<Product>>;

    /// Get a product by ID
    async fn get_product(&self, id: &str) -> ProductResult<Option<Product>>;

    /// Distinct category names, sorted
    async fn list_categories(&self) -> ProductResult<Vec<String>>;

    /// Insert a new product
    async fn insert_product(&self, product: Product) -> ProductResult<()>;

    /// Append a review; `false` when the product does not exist
    async fn append_review(&self, product_id: &str, review: Review) -> ProductResult<bool>;

    /// Replace the review with the same id; `false` when product or review is missing
    async fn replace_review(&self, product_id: &str, review: Review) -> ProductResult<bool>;

    /// Remove a review; `false` when product or review is missing
    async fn remove_review(&self, product_id: &str, review_id: &str) -> ProductResult<bool>;

    /// Whether the store is reachable
    async fn ping(&self) -> ProductResult<()>;
}
