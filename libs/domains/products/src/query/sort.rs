//! Price sort stage.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::models::Product;

/// Price ordering requested through `?sort=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum SortOrder {
    #[strum(to_string = "asc", serialize = "price_asc", serialize = "ascending", serialize = "price")]
    PriceAsc,
    #[strum(to_string = "desc", serialize = "price_desc", serialize = "descending", serialize = "-price")]
    PriceDesc,
}

impl SortOrder {
    /// Unknown values are ignored rather than rejected.
    pub fn parse_lenient(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
    }
}

/// Prices that cannot be compared meaningfully sort as zero.
fn sort_key(price: f64) -> f64 {
    if price.is_nan() || price <= 0.0 { 0.0 } else { price }
}

/// Compare by price in `order`, ties by id ascending regardless of direction.
pub fn compare(a: &Product, b: &Product, order: SortOrder) -> Ordering {
    let by_price = sort_key(a.price).total_cmp(&sort_key(b.price));
    let by_price = match order {
        SortOrder::PriceAsc => by_price,
        SortOrder::PriceDesc => by_price.reverse(),
    };
    by_price.then_with(|| a.id.cmp(&b.id))
}

pub fn sort_by_price(products: &mut [Product], order: SortOrder) {
    products.sort_by(|a, b| compare(a, b, order));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::test_support::{catalog, product};

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(SortOrder::parse_lenient(Some("asc")), Some(SortOrder::PriceAsc));
        assert_eq!(SortOrder::parse_lenient(Some("DESC")), Some(SortOrder::PriceDesc));
        assert_eq!(SortOrder::parse_lenient(Some(" price_desc ")), Some(SortOrder::PriceDesc));
        assert_eq!(SortOrder::parse_lenient(Some("rating")), None);
        assert_eq!(SortOrder::parse_lenient(Some("")), None);
        assert_eq!(SortOrder::parse_lenient(None), None);
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(SortOrder::PriceAsc.to_string(), "asc");
        assert_eq!(SortOrder::PriceDesc.to_string(), "desc");
    }

    #[test]
    fn test_sort_both_directions() {
        let mut products = catalog();
        sort_by_price(&mut products, SortOrder::PriceAsc);
        assert_eq!(ids(&products), ["3", "2", "1"]);

        sort_by_price(&mut products, SortOrder::PriceDesc);
        assert_eq!(ids(&products), ["1", "2", "3"]);
    }

    #[test]
    fn test_ties_break_by_id_in_both_directions() {
        let mut products = vec![
            product("b", "B", 10.0, None),
            product("c", "C", 10.0, None),
            product("a", "A", 10.0, None),
        ];
        sort_by_price(&mut products, SortOrder::PriceAsc);
        assert_eq!(ids(&products), ["a", "b", "c"]);

        sort_by_price(&mut products, SortOrder::PriceDesc);
        assert_eq!(ids(&products), ["a", "b", "c"]);
    }

    #[test]
    fn test_malformed_prices_sort_as_zero() {
        let mut products = vec![
            product("1", "A", 5.0, None),
            product("2", "B", f64::NAN, None),
            product("3", "C", -4.0, None),
            product("4", "D", -0.0, None),
        ];
        sort_by_price(&mut products, SortOrder::PriceAsc);
        assert_eq!(ids(&products), ["2", "3", "4", "1"]);
    }
}
