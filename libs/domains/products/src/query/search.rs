//! Fuzzy title search stage.
//!
//! Scores are on a 0-1 scale where 0 is an exact match. A pattern that occurs
//! verbatim in the title always scores below any pattern that needs an edit,
//! so substring hits outrank fuzzy-only hits.

use std::cmp::Ordering;

use crate::models::Product;

/// Default match threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Approximate string matching used by the search stage.
///
/// Implementations receive lower-cased, trimmed input and return a score in
/// `[0, threshold]` for titles that match, `None` otherwise.
pub trait TitleMatcher: Send + Sync {
    fn score(&self, pattern: &str, title: &str) -> Option<f64>;
}

/// Optimal-string-alignment edit distance between the pattern and the best
/// matching substring of the title, normalized by pattern length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditDistanceMatcher {
    threshold: f64,
}

impl EditDistanceMatcher {
    /// Threshold is clamped into `[0, 1]`; NaN falls back to the default.
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_nan() {
            DEFAULT_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for EditDistanceMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl TitleMatcher for EditDistanceMatcher {
    fn score(&self, pattern: &str, title: &str) -> Option<f64> {
        let pattern: Vec<char> = pattern.chars().collect();
        let title: Vec<char> = title.chars().collect();
        let m = pattern.len();
        if m == 0 {
            return Some(0.0);
        }

        if contains(&title, &pattern) {
            // Stays below min(threshold, 1/m) / 2, the floor of any fuzzy score
            let coverage = m as f64 / title.len() as f64;
            let ceiling = self.threshold.min(1.0 / m as f64);
            return Some((1.0 - coverage) * ceiling * 0.5);
        }

        let score = substring_distance(&pattern, &title) as f64 / m as f64;
        (score <= self.threshold).then_some(score)
    }
}

fn contains(haystack: &[char], needle: &[char]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Fewest insertions, deletions, substitutions or adjacent transpositions
/// turning `pattern` into some substring of `text`.
fn substring_distance(pattern: &[char], text: &[char]) -> usize {
    let n = text.len();
    // Row 0 is all zeros: a match may start anywhere in the text
    let mut before_prev = vec![0usize; n + 1];
    let mut prev = vec![0usize; n + 1];
    let mut cur = vec![0usize; n + 1];

    for i in 1..=pattern.len() {
        cur[0] = i;
        for j in 1..=n {
            let cost = usize::from(pattern[i - 1] != text[j - 1]);
            let mut best = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + cost);
            if i > 1
                && j > 1
                && pattern[i - 1] == text[j - 2]
                && pattern[i - 2] == text[j - 1]
            {
                best = best.min(before_prev[j - 2] + 1);
            }
            cur[j] = best;
        }
        std::mem::swap(&mut before_prev, &mut prev);
        std::mem::swap(&mut prev, &mut cur);
    }

    prev.into_iter().min().unwrap_or(pattern.len())
}

/// Keep products whose title matches `text`, best score first, ties by id.
///
/// Blank text passes the input through unchanged.
pub fn search_titles(products: Vec<Product>, text: &str, matcher: &dyn TitleMatcher) -> Vec<Product> {
    let pattern = text.trim().to_lowercase();
    if pattern.is_empty() {
        return products;
    }

    let mut scored: Vec<(f64, Product)> = products
        .into_iter()
        .filter_map(|p| {
            let title = p.title.to_lowercase();
            matcher.score(&pattern, &title).map(|score| (score, p))
        })
        .collect();

    scored.sort_by(|(sa, a), (sb, b)| compare_ranked(*sa, a, *sb, b));
    scored.into_iter().map(|(_, p)| p).collect()
}

fn compare_ranked(sa: f64, a: &Product, sb: f64, b: &Product) -> Ordering {
    sa.total_cmp(&sb).then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::test_support::{catalog, product};

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    fn matcher() -> EditDistanceMatcher {
        EditDistanceMatcher::default()
    }

    #[test]
    fn test_exact_title_scores_zero() {
        assert_eq!(matcher().score("red shoe", "red shoe"), Some(0.0));
    }

    #[test]
    fn test_substring_score_prefers_higher_coverage() {
        let red = matcher().score("shoe", "red shoe").unwrap();
        let blue = matcher().score("shoe", "blue shoe").unwrap();
        assert!(red < blue);
        assert!(blue < 0.125);
    }

    #[test]
    fn test_tolerates_typos_transpositions_and_partial_terms() {
        let m = matcher();
        assert_eq!(m.score("shoo", "red shoe"), Some(0.25));
        assert_eq!(m.score("sheo", "red shoe"), Some(0.25));
        assert!(m.score("blu sho", "blue shoe").is_some());
    }

    #[test]
    fn test_rejects_distant_titles() {
        assert_eq!(matcher().score("shoe", "red hat"), None);
        assert_eq!(matcher().score("shoe", ""), None);
    }

    #[test]
    fn test_substring_always_outranks_fuzzy() {
        let m = EditDistanceMatcher::new(1.0);
        let substring = m.score("ab", "xxxxxxxxxxab").unwrap();
        let fuzzy = m.score("ab", "ba").unwrap();
        assert!(substring < fuzzy);
    }

    #[test]
    fn test_zero_threshold_is_exact_substring_only() {
        let m = EditDistanceMatcher::new(0.0);
        assert_eq!(m.score("shoe", "red shoe"), Some(0.0));
        assert_eq!(m.score("shoo", "red shoe"), None);
    }

    #[test]
    fn test_threshold_is_clamped() {
        assert_eq!(EditDistanceMatcher::new(7.0).threshold(), 1.0);
        assert_eq!(EditDistanceMatcher::new(-1.0).threshold(), 0.0);
        assert_eq!(EditDistanceMatcher::new(f64::NAN).threshold(), DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_substring_distance() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(substring_distance(&chars("shoe"), &chars("red shoe")), 0);
        assert_eq!(substring_distance(&chars("sheo"), &chars("shoe")), 1);
        assert_eq!(substring_distance(&chars("abc"), &chars("")), 3);
    }

    #[test]
    fn test_search_ranks_and_filters() {
        let results = search_titles(catalog(), "Shoe", &matcher());
        assert_eq!(ids(&results), ["1", "2"]);
    }

    #[test]
    fn test_blank_search_passes_through() {
        assert_eq!(ids(&search_titles(catalog(), "   ", &matcher())), ["1", "2", "3"]);
    }

    #[test]
    fn test_equal_scores_order_by_id() {
        let products = vec![
            product("b", "Hat", 1.0, None),
            product("a", "Hat", 2.0, None),
        ];
        assert_eq!(ids(&search_titles(products, "hat", &matcher())), ["a", "b"]);
    }
}
