//! In-memory implementation of CatalogStore for tests and local runs

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::error::ProductResult;
use crate::models::{Product, Review};
use crate::repository::CatalogStore;

/// Products keyed by id; iteration order is id order.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<BTreeMap<String, Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with `products`; later duplicates of an id replace earlier ones.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            products: RwLock::new(products),
        }
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn list_products(&self) -> ProductResult<Vec<Product>> {
        Ok(self.products.read().await.values().cloned().collect())
    }

    async fn get_product(&self, id: &str) -> ProductResult<Option<Product>> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn list_categories(&self) -> ProductResult<Vec<String>> {
        let categories: BTreeSet<String> = self
            .products
            .read()
            .await
            .values()
            .filter_map(|p| p.category.clone())
            .collect();
        Ok(categories.into_iter().collect())
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn insert_product(&self, product: Product) -> ProductResult<()> {
        self.products.write().await.insert(product.id.clone(), product);
        Ok(())
    }

    #[instrument(skip(self, review), fields(review_id = %review.id))]
    async fn append_review(&self, product_id: &str, review: Review) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(product_id) else {
            return Ok(false);
        };
        product.reviews.push(review);
        Ok(true)
    }

    #[instrument(skip(self, review), fields(review_id = %review.id))]
    async fn replace_review(&self, product_id: &str, review: Review) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        let slot = products
            .get_mut(product_id)
            .and_then(|p| p.reviews.iter_mut().find(|r| r.id == review.id));
        match slot {
            Some(existing) => {
                *existing = review;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[instrument(skip(self))]
    async fn remove_review(&self, product_id: &str, review_id: &str) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(product_id) else {
            return Ok(false);
        };
        let before = product.reviews.len();
        product.reviews.retain(|r| r.id != review_id);
        Ok(product.reviews.len() < before)
    }

    async fn ping(&self) -> ProductResult<()> {
        Ok(())
    }
}
