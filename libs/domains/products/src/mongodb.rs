//! MongoDB implementation of CatalogStore

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::mongodb::check_health_detailed;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::IndexOptions,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, Review};
use crate::repository::CatalogStore;

/// Stored shape of a product; only this type knows the id lives in `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    price: f64,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    stock: u32,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    reviews: Vec<Review>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDocument {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            price: p.price,
            category: p.category,
            rating: p.rating,
            stock: p.stock,
            tags: p.tags,
            images: p.images,
            thumbnail: p.thumbnail,
            reviews: p.reviews,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<ProductDocument> for Product {
    fn from(d: ProductDocument) -> Self {
        Self {
            id: d.id,
            title: d.title,
            description: d.description,
            price: d.price,
            category: d.category,
            rating: d.rating,
            stock: d.stock,
            tags: d.tags,
            images: d.images,
            thumbnail: d.thumbnail,
            reviews: d.reviews,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

/// MongoDB implementation of the CatalogStore
///
/// Reviews live in the product document's `reviews` array and are written with
/// single-document updates (`$push`, positional `$set`, `$pull`).
pub struct MongoCatalogStore {
    db: Database,
    collection: Collection<ProductDocument>,
}

impl MongoCatalogStore {
    /// Create a store over the `products` collection
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, "products")
    }

    /// Create a store with a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            db: db.clone(),
            collection: db.collection::<ProductDocument>(collection_name),
        }
    }

    /// Initialize indexes for optimal query performance
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let index = |keys, name: &str| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(name.to_string()).build())
                .build()
        };

        let indexes = vec![
            index(doc! { "category": 1 }, "idx_category"),
            index(doc! { "price": 1 }, "idx_price"),
            index(doc! { "title": 1 }, "idx_title"),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    fn product_filter(product_id: &str) -> Document {
        doc! { "_id": product_id }
    }

    /// Matches the product only while it still holds the review
    fn review_filter(product_id: &str, review_id: &str) -> Document {
        doc! { "_id": product_id, "reviews.id": review_id }
    }

    fn append_review_update(review: &Review, now: DateTime<Utc>) -> ProductResult<Document> {
        Ok(doc! {
            "$push": { "reviews": review_to_bson(review)? },
            "$set": { "updated_at": stamp(now) }
        })
    }

    /// Positional update of the review matched by [`Self::review_filter`]
    fn replace_review_update(review: &Review, now: DateTime<Utc>) -> ProductResult<Document> {
        Ok(doc! {
            "$set": { "reviews.$": review_to_bson(review)?, "updated_at": stamp(now) }
        })
    }

    fn remove_review_update(review_id: &str, now: DateTime<Utc>) -> Document {
        doc! {
            "$pull": { "reviews": { "id": review_id } },
            "$set": { "updated_at": stamp(now) }
        }
    }

    /// Non-string values (missing or malformed categories) are skipped
    fn category_names(values: Vec<Bson>) -> Vec<String> {
        let mut categories: Vec<String> = values
            .into_iter()
            .filter_map(|v| match v {
                Bson::String(s) => Some(s),
                _ => None,
            })
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }
}

fn review_to_bson(review: &Review) -> ProductResult<Bson> {
    to_bson(review).map_err(|e| ProductError::Internal(format!("Failed to encode review: {}", e)))
}

// Same RFC 3339 text chrono's serde impl writes for the timestamp fields
fn stamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339()
}

#[async_trait]
impl CatalogStore for MongoCatalogStore {
    #[instrument(skip(self))]
    async fn list_products(&self) -> ProductResult<Vec<Product>> {
        let cursor = self.collection.find(doc! {}).await?;
        let documents: Vec<ProductDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: &str) -> ProductResult<Option<Product>> {
        let document = self.collection.find_one(Self::product_filter(id)).await?;
        Ok(document.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> ProductResult<Vec<String>> {
        let values = self.collection.distinct("category", doc! {}).await?;
        Ok(Self::category_names(values))
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn insert_product(&self, product: Product) -> ProductResult<()> {
        let document = ProductDocument::from(product);
        self.collection.insert_one(&document).await?;
        tracing::info!(product_id = %document.id, "Product created successfully");
        Ok(())
    }

    #[instrument(skip(self, review), fields(review_id = %review.id))]
    async fn append_review(&self, product_id: &str, review: Review) -> ProductResult<bool> {
        let update = Self::append_review_update(&review, Utc::now())?;
        let result = self
            .collection
            .update_one(Self::product_filter(product_id), update)
            .await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self, review), fields(review_id = %review.id))]
    async fn replace_review(&self, product_id: &str, review: Review) -> ProductResult<bool> {
        let filter = Self::review_filter(product_id, &review.id);
        let update = Self::replace_review_update(&review, Utc::now())?;
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn remove_review(&self, product_id: &str, review_id: &str) -> ProductResult<bool> {
        let filter = Self::review_filter(product_id, review_id);
        let update = Self::remove_review_update(review_id, Utc::now());
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn ping(&self) -> ProductResult<()> {
        let status = check_health_detailed(self.db.client()).await;
        tracing::debug!(latency_ms = status.response_time_ms, healthy = status.healthy, "Catalog ping");
        if status.healthy {
            Ok(())
        } else {
            Err(ProductError::Upstream(
                status.message.unwrap_or_else(|| "ping failed".to_string()),
            ))
        }
    }
}
