//! Category filter stage.

use crate::models::Product;

/// Keep products whose category equals `category` exactly (case-sensitive).
///
/// `None` passes everything through; a category nobody carries yields an
/// empty set.
pub fn filter_by_category(products: Vec<Product>, category: Option<&str>) -> Vec<Product> {
    match category {
        Some(wanted) => products
            .into_iter()
            .filter(|p| p.category.as_deref() == Some(wanted))
            .collect(),
        None => products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::test_support::catalog;

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_filter_exact_match() {
        let shoes = filter_by_category(catalog(), Some("shoes"));
        assert_eq!(ids(&shoes), ["1", "2"]);
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        assert!(filter_by_category(catalog(), Some("Shoes")).is_empty());
    }

    #[test]
    fn test_unknown_category_is_empty_not_error() {
        assert!(filter_by_category(catalog(), Some("gloves")).is_empty());
    }

    #[test]
    fn test_absent_category_passes_through() {
        assert_eq!(filter_by_category(catalog(), None).len(), 3);
    }
}
