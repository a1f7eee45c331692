use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Product entity as exposed over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier (`_id` in the MongoDB document)
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Non-negative price
    pub price: f64,
    /// Category name; products without one never match a category filter
    #[serde(default)]
    pub category: Option<String>,
    /// Average rating on a 0-5 scale
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Image URLs in display order
    #[serde(default)]
    pub images: Vec<String>,
    /// Listing card image
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Listing projection returned when `summary=true`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub category: Option<String>,
    pub rating: f64,
    pub thumbnail: Option<String>,
}

/// A review embedded in its product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    /// Generated when the review is appended
    pub id: String,
    /// Verified email of the author
    pub reviewer_email: String,
    /// 1-5
    pub rating: u8,
    pub comment: String,
    pub date: DateTime<Utc>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// DTO for posting or editing a review; the author comes from the token
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReviewInput {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(max = 2000))]
    pub comment: String,
}

/// Ordering for a product's reviews
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReviewSort {
    #[default]
    Newest,
    Oldest,
    Highest,
    Lowest,
}

/// Query parameters for the review listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewListParams {
    /// newest (default), oldest, highest or lowest; unknown values fall back to newest
    pub sort: Option<String>,
}

/// Response of `GET /session`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionInfo {
    pub message: String,
    pub uid: String,
    pub email: String,
}

impl Product {
    /// Create a new product from CreateProduct DTO
    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            title: input.title,
            description: input.description,
            price: input.price,
            category: input.category,
            rating: input.rating,
            stock: input.stock,
            tags: input.tags,
            images: input.images,
            thumbnail: input.thumbnail,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> ProductSummary {
        ProductSummary::from(self)
    }

    pub fn find_review(&self, review_id: &str) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id == review_id)
    }
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            category: product.category.clone(),
            rating: product.rating,
            thumbnail: product.thumbnail.clone(),
        }
    }
}

impl Review {
    /// New review authored by `reviewer_email`, stamped now.
    pub fn new(reviewer_email: impl Into<String>, input: ReviewInput) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            reviewer_email: reviewer_email.into(),
            rating: input.rating,
            comment: input.comment,
            date: Utc::now(),
        }
    }

    /// Replace rating and comment and refresh the timestamp.
    pub fn apply_edit(&mut self, input: ReviewInput) {
        self.rating = input.rating;
        self.comment = input.comment;
        self.date = Utc::now();
    }
}

impl ReviewSort {
    /// Lenient parse: unknown or absent values give the default.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse().ok()).unwrap_or_default()
    }

    /// Sort in place; ties resolve by review id.
    pub fn apply(self, reviews: &mut [Review]) {
        reviews.sort_by(|a, b| {
            let primary = match self {
                ReviewSort::Newest => b.date.cmp(&a.date),
                ReviewSort::Oldest => a.date.cmp(&b.date),
                ReviewSort::Highest => b.rating.cmp(&a.rating),
                ReviewSort::Lowest => a.rating.cmp(&b.rating),
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn review(id: &str, rating: u8, age_days: i64) -> Review {
        Review {
            id: id.to_string(),
            reviewer_email: "ada@example.com".to_string(),
            rating,
            comment: String::new(),
            date: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn test_product_and_summary_share_id_key() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "1",
            "title": "Red Shoe",
            "price": 50.0,
            "category": "shoes"
        }))
        .unwrap();
        assert_eq!(product.category.as_deref(), Some("shoes"));
        assert!(product.reviews.is_empty());

        let full = serde_json::to_value(&product).unwrap();
        let summary = serde_json::to_value(product.summary()).unwrap();
        assert_eq!(full["id"], "1");
        assert_eq!(summary["id"], "1");
        assert!(full.get("_id").is_none());
    }

    #[test]
    fn test_review_input_validation() {
        let ok = ReviewInput {
            rating: 5,
            comment: "great".into(),
        };
        assert!(ok.validate().is_ok());

        let zero = ReviewInput {
            rating: 0,
            comment: String::new(),
        };
        assert!(zero.validate().is_err());

        let long = ReviewInput {
            rating: 3,
            comment: "x".repeat(2001),
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_create_product_validation() {
        let input: CreateProduct = serde_json::from_value(serde_json::json!({
            "title": "",
            "price": -1.0
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("price"));
    }

    #[test]
    fn test_review_sort_parse_lenient() {
        assert_eq!(ReviewSort::parse_lenient(Some("HIGHEST")), ReviewSort::Highest);
        assert_eq!(ReviewSort::parse_lenient(Some("bogus")), ReviewSort::Newest);
        assert_eq!(ReviewSort::parse_lenient(None), ReviewSort::Newest);
    }

    #[test]
    fn test_review_sort_orders_with_id_tiebreak() {
        let mut reviews = vec![review("b", 4, 1), review("a", 4, 3), review("c", 2, 2)];

        ReviewSort::Highest.apply(&mut reviews);
        let ids: Vec<_> = reviews.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);

        ReviewSort::Newest.apply(&mut reviews);
        let ids: Vec<_> = reviews.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn test_summary_projection() {
        let product = Product::new(CreateProduct {
            title: "Red Hat".into(),
            description: "wool".into(),
            price: 20.0,
            category: Some("hats".into()),
            rating: 4.5,
            stock: 3,
            tags: vec![],
            images: vec![],
            thumbnail: Some("https://cdn.example.com/hat.png".into()),
        });
        let summary = product.summary();
        assert_eq!(summary.id, product.id);
        assert_eq!(summary.thumbnail, product.thumbnail);
    }
}
