//! Product Query Engine
//!
//! Runs a listing query over a catalog snapshot in a fixed order:
//!
//! ```text
//! catalog ─► filter (category) ─► search (title) ─► sort (price) ─► paginate ─► page
//! ```
//!
//! Sorting and paginating after search keeps relevance ranking intact before
//! slicing, so the stage order must not change. Malformed input never fails a
//! query; it is clamped to the nearest valid value instead.

pub mod filter;
pub mod pagination;
pub mod search;
pub mod sort;

use core_config::{ConfigError, FromEnv, env_parse};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::models::Product;

pub use filter::filter_by_category;
pub use pagination::{page_to_offset, paginate};
pub use search::{DEFAULT_THRESHOLD, EditDistanceMatcher, TitleMatcher, search_titles};
pub use sort::{SortOrder, sort_by_price};

/// Tuning for listing queries.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    /// Fuzzy search threshold on a 0-1 scale (0 = exact)
    pub search_threshold: f64,
    /// Page size when the request gives none or an unparseable one
    pub default_limit: usize,
    /// Upper bound for any requested page size
    pub max_limit: usize,
    /// Longer search text is cut to this many characters
    pub max_search_len: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            search_threshold: DEFAULT_THRESHOLD,
            default_limit: 20,
            max_limit: 100,
            max_search_len: 200,
        }
    }
}

impl QueryConfig {
    /// Bring out-of-range settings back into their valid ranges.
    fn normalized(mut self) -> Self {
        self.search_threshold = EditDistanceMatcher::new(self.search_threshold).threshold();
        self.max_limit = self.max_limit.max(1);
        self.default_limit = self.default_limit.clamp(1, self.max_limit);
        self.max_search_len = self.max_search_len.max(1);
        self
    }
}

/// Environment variables:
/// - `CATALOG_SEARCH_THRESHOLD` (default: 0.3, clamped into 0-1)
/// - `CATALOG_DEFAULT_PAGE_SIZE` (default: 20)
/// - `CATALOG_MAX_PAGE_SIZE` (default: 100)
/// - `CATALOG_MAX_SEARCH_LENGTH` (default: 200 characters)
impl FromEnv for QueryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            search_threshold: env_parse("CATALOG_SEARCH_THRESHOLD", defaults.search_threshold)?,
            default_limit: env_parse("CATALOG_DEFAULT_PAGE_SIZE", defaults.default_limit)?,
            max_limit: env_parse("CATALOG_MAX_PAGE_SIZE", defaults.max_limit)?,
            max_search_len: env_parse("CATALOG_MAX_SEARCH_LENGTH", defaults.max_search_len)?,
        }
        .normalized())
    }
}

/// A normalized listing query. Pagination is always expressed as an offset.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    pub limit: usize,
    pub offset: usize,
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<SortOrder>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            limit: QueryConfig::default().default_limit,
            offset: 0,
            search: None,
            category: None,
            sort: None,
        }
    }
}

/// Raw `GET /products` query string. Every field is kept as text so that
/// malformed values are clamped during normalization instead of rejected by
/// the extractor.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListParams {
    /// Page size, clamped into 1..=max (default 20)
    pub limit: Option<String>,
    /// 1-indexed page; ignored when `skip` is present
    pub page: Option<String>,
    /// Number of matches to skip
    pub skip: Option<String>,
    /// Fuzzy title search
    pub search: Option<String>,
    /// Exact, case-sensitive category
    pub category: Option<String>,
    /// `asc` or `desc` by price; unknown values are ignored
    pub sort: Option<String>,
    /// `true` returns summary records
    pub summary: Option<String>,
}

/// Integer value of a query parameter. Fractions truncate; anything that is
/// not a finite number is `None`.
fn parse_number(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty()).map(String::from)
}

fn to_usize(n: i64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

impl ProductListParams {
    /// Clamp the raw parameters into a [`ProductQuery`].
    ///
    /// - `limit` < 1 becomes 1, above `max_limit` becomes `max_limit`,
    ///   unparseable falls back to `default_limit`
    /// - `skip` wins over `page`; negative skip becomes 0, page < 1 becomes 1
    /// - `offset = (page - 1) * limit`, saturating
    /// - search text is trimmed and cut to `max_search_len` characters
    pub fn normalize(&self, config: &QueryConfig) -> ProductQuery {
        let limit = match parse_number(self.limit.as_deref()) {
            Some(n) => to_usize(n.max(1)).min(config.max_limit.max(1)),
            None => config.default_limit.clamp(1, config.max_limit.max(1)),
        };

        let offset = match parse_number(self.skip.as_deref()) {
            Some(skip) => to_usize(skip.max(0)),
            None => {
                let page = parse_number(self.page.as_deref()).unwrap_or(1).max(1);
                page_to_offset(to_usize(page), limit)
            }
        };

        ProductQuery {
            limit,
            offset,
            search: non_blank(self.search.as_deref())
                .map(|text| text.trim().chars().take(config.max_search_len.max(1)).collect()),
            category: non_blank(self.category.as_deref()),
            sort: SortOrder::parse_lenient(self.sort.as_deref()),
        }
    }

    /// `summary=true` (or `1`) asks for the reduced listing shape.
    pub fn wants_summary(&self) -> bool {
        matches!(
            self.summary.as_deref().map(str::trim),
            Some(s) if s.eq_ignore_ascii_case("true") || s == "1"
        )
    }
}

/// One page of results plus the match count before pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    pub items: Vec<Product>,
    pub total: usize,
}

/// Storage-independent listing pipeline.
///
/// Cloning is cheap; the matcher is shared.
#[derive(Clone)]
pub struct QueryEngine {
    matcher: Arc<dyn TitleMatcher>,
    max_limit: usize,
}

impl QueryEngine {
    pub fn new(config: &QueryConfig) -> Self {
        Self::with_matcher(config, EditDistanceMatcher::new(config.search_threshold))
    }

    /// Use a different fuzzy matcher.
    pub fn with_matcher(config: &QueryConfig, matcher: impl TitleMatcher + 'static) -> Self {
        Self {
            matcher: Arc::new(matcher),
            max_limit: config.max_limit.max(1),
        }
    }

    /// Filter, search, sort, paginate.
    ///
    /// Without an explicit sort, a search keeps relevance order and a plain
    /// listing falls back to ascending price.
    pub fn run(&self, catalog: Vec<Product>, query: &ProductQuery) -> QueryPage {
        let filtered = filter_by_category(catalog, query.category.as_deref());

        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let mut matched = match search {
            Some(text) => search_titles(filtered, text, self.matcher.as_ref()),
            None => filtered,
        };

        match (query.sort, search) {
            (Some(order), _) => sort_by_price(&mut matched, order),
            (None, Some(_)) => {}
            (None, None) => sort_by_price(&mut matched, SortOrder::PriceAsc),
        }

        let total = matched.len();
        let limit = query.limit.clamp(1, self.max_limit);
        QueryPage {
            items: paginate(matched, query.offset, limit),
            total,
        }
    }
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(&QueryConfig::default())
    }
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("max_limit", &self.max_limit)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{catalog, product};
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ProductListParams {
        let mut p = ProductListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "limit" => p.limit = value,
                "page" => p.page = value,
                "skip" => p.skip = value,
                "search" => p.search = value,
                "category" => p.category = value,
                "sort" => p.sort = value,
                "summary" => p.summary = value,
                other => panic!("unknown param {other}"),
            }
        }
        p
    }

    fn ids(page: &QueryPage) -> Vec<&str> {
        page.items.iter().map(|p| p.id.as_str()).collect()
    }

    fn run(pairs: &[(&str, &str)]) -> QueryPage {
        let config = QueryConfig::default();
        QueryEngine::new(&config).run(catalog(), &params(pairs).normalize(&config))
    }

    #[test]
    fn test_category_with_ascending_sort() {
        let page = run(&[("category", "shoes"), ("sort", "asc")]);
        assert_eq!(ids(&page), ["2", "1"]);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_search_second_page_of_one() {
        let page = run(&[("search", "shoe"), ("limit", "1"), ("page", "2")]);
        assert_eq!(ids(&page), ["2"]);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let page = run(&[("page", "99"), ("limit", "20")]);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_default_listing_is_price_ascending() {
        assert_eq!(ids(&run(&[])), ["3", "2", "1"]);
    }

    #[test]
    fn test_explicit_sort_overrides_relevance() {
        let page = run(&[("search", "shoe"), ("sort", "desc")]);
        assert_eq!(ids(&page), ["1", "2"]);
        let page = run(&[("search", "shoe"), ("sort", "asc")]);
        assert_eq!(ids(&page), ["2", "1"]);
    }

    #[test]
    fn test_normalize_clamps_limit() {
        let config = QueryConfig::default();
        assert_eq!(params(&[("limit", "0")]).normalize(&config).limit, 1);
        assert_eq!(params(&[("limit", "-5")]).normalize(&config).limit, 1);
        assert_eq!(params(&[("limit", "5000")]).normalize(&config).limit, 100);
        assert_eq!(params(&[("limit", "abc")]).normalize(&config).limit, 20);
        assert_eq!(params(&[("limit", "7.9")]).normalize(&config).limit, 7);
        assert_eq!(params(&[]).normalize(&config).limit, 20);
    }

    #[test]
    fn test_normalize_pagination() {
        let config = QueryConfig::default();
        assert_eq!(params(&[("page", "3"), ("limit", "10")]).normalize(&config).offset, 20);
        assert_eq!(params(&[("page", "0")]).normalize(&config).offset, 0);
        assert_eq!(params(&[("page", "x")]).normalize(&config).offset, 0);
        assert_eq!(params(&[("skip", "-4")]).normalize(&config).offset, 0);
        assert_eq!(
            params(&[("skip", "5"), ("page", "3"), ("limit", "10")])
                .normalize(&config)
                .offset,
            5
        );
        assert_eq!(
            params(&[("page", "9223372036854775807"), ("limit", "100")])
                .normalize(&config)
                .offset,
            usize::MAX
        );
    }

    #[test]
    fn test_normalize_text_fields() {
        let config = QueryConfig::default();
        let query = params(&[("search", "  "), ("category", ""), ("sort", "rating")]).normalize(&config);
        assert_eq!(query.search, None);
        assert_eq!(query.category, None);
        assert_eq!(query.sort, None);
    }

    #[test]
    fn test_normalize_caps_search_length() {
        let config = QueryConfig {
            max_search_len: 5,
            ..QueryConfig::default()
        };
        let long = format!("  shoe{}", "é".repeat(10_000));
        let query = params(&[("search", long.as_str())]).normalize(&config);
        assert_eq!(query.search.as_deref(), Some("shoeé"));

        let default_cap = QueryConfig::default().max_search_len;
        let query = params(&[("search", "x".repeat(5_000).as_str())]).normalize(&QueryConfig::default());
        assert_eq!(query.search.map(|s| s.chars().count()), Some(default_cap));
    }

    #[test]
    fn test_wants_summary() {
        assert!(params(&[("summary", "true")]).wants_summary());
        assert!(params(&[("summary", "TRUE")]).wants_summary());
        assert!(params(&[("summary", "1")]).wants_summary());
        assert!(!params(&[("summary", "no")]).wants_summary());
        assert!(!params(&[]).wants_summary());
    }

    #[test]
    fn test_engine_clamps_direct_queries() {
        let config = QueryConfig {
            max_limit: 2,
            ..QueryConfig::default()
        };
        let engine = QueryEngine::new(&config);
        let query = ProductQuery {
            limit: 0,
            ..ProductQuery::default()
        };
        assert_eq!(engine.run(catalog(), &query).items.len(), 1);

        let query = ProductQuery {
            limit: 50,
            ..ProductQuery::default()
        };
        assert_eq!(engine.run(catalog(), &query).items.len(), 2);
    }

    #[test]
    fn test_custom_matcher_is_used() {
        struct PrefixMatcher;
        impl TitleMatcher for PrefixMatcher {
            fn score(&self, pattern: &str, title: &str) -> Option<f64> {
                title.starts_with(pattern).then_some(0.0)
            }
        }

        let engine = QueryEngine::with_matcher(&QueryConfig::default(), PrefixMatcher);
        let query = ProductQuery {
            search: Some("red".into()),
            ..ProductQuery::default()
        };
        let page = engine.run(
            vec![
                product("1", "Red Shoe", 50.0, None),
                product("2", "Shoe Red", 30.0, None),
                product("3", "Red Hat", 20.0, None),
            ],
            &query,
        );
        assert_eq!(ids(&page), ["1", "3"]);
    }

    #[test]
    fn test_query_config_from_env() {
        temp_env::with_vars(
            [
                ("CATALOG_SEARCH_THRESHOLD", Some("4")),
                ("CATALOG_DEFAULT_PAGE_SIZE", Some("500")),
                ("CATALOG_MAX_PAGE_SIZE", Some("50")),
                ("CATALOG_MAX_SEARCH_LENGTH", Some("0")),
            ],
            || {
                let config = QueryConfig::from_env().unwrap();
                assert_eq!(config.search_threshold, 1.0);
                assert_eq!(config.max_limit, 50);
                assert_eq!(config.default_limit, 50);
                assert_eq!(config.max_search_len, 1);
            },
        );

        temp_env::with_vars([("CATALOG_MAX_PAGE_SIZE", Some("lots"))], || {
            assert!(QueryConfig::from_env().is_err());
        });

        temp_env::with_vars_unset(
            [
                "CATALOG_SEARCH_THRESHOLD",
                "CATALOG_DEFAULT_PAGE_SIZE",
                "CATALOG_MAX_PAGE_SIZE",
                "CATALOG_MAX_SEARCH_LENGTH",
            ],
            || assert_eq!(QueryConfig::from_env().unwrap(), QueryConfig::default()),
        );
    }
}
