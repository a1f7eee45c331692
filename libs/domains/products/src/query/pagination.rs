//! Pagination stage.

use crate::models::Product;

/// The contiguous slice `[offset, offset + limit)`; empty when `offset` is
/// past the end.
pub fn paginate(products: Vec<Product>, offset: usize, limit: usize) -> Vec<Product> {
    products.into_iter().skip(offset).take(limit).collect()
}

/// Offset of a 1-indexed page. Page 0 is treated as page 1.
pub fn page_to_offset(page: usize, limit: usize) -> usize {
    page.saturating_sub(1).saturating_mul(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::test_support::catalog;

    #[test]
    fn test_paginate_slices() {
        let page = paginate(catalog(), 1, 1);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "2");
    }

    #[test]
    fn test_paginate_past_end_is_empty() {
        assert!(paginate(catalog(), 3, 20).is_empty());
        assert!(paginate(catalog(), usize::MAX, 20).is_empty());
    }

    #[test]
    fn test_page_to_offset() {
        assert_eq!(page_to_offset(1, 20), 0);
        assert_eq!(page_to_offset(3, 20), 40);
        assert_eq!(page_to_offset(0, 20), 0);
        assert_eq!(page_to_offset(usize::MAX, 100), usize::MAX);
    }
}
