//! String similarity for currency name matching.
//!
//! Sørensen–Dice coefficient over character bigrams. Whitespace is ignored and
//! comparison is case-insensitive, so `"Bitcoin Cash"` and `"bitcoincash"`
//! score 1.0.

use std::collections::HashMap;

/// Similarity of two strings in `[0, 1]`. Symmetric; identical strings score 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    if a == b {
        return 1.0;
    }
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut bigrams: HashMap<(char, char), usize> = HashMap::with_capacity(a.len());
    for pair in a.windows(2) {
        *bigrams.entry((pair[0], pair[1])).or_default() += 1;
    }

    let mut shared = 0usize;
    for pair in b.windows(2) {
        if let Some(count) = bigrams.get_mut(&(pair[0], pair[1])) {
            if *count > 0 {
                *count -= 1;
                shared += 1;
            }
        }
    }

    (2 * shared) as f64 / ((a.len() - 1) + (b.len() - 1)) as f64
}

fn normalize(s: &str) -> Vec<char> {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_scores_one() {
        assert_eq!(similarity("bitcoin", "bitcoin"), 1.0);
        assert_eq!(similarity("BTC", "btc"), 1.0);
        assert_eq!(similarity("x", "x"), 1.0);
    }

    #[test]
    fn test_disjoint_scores_zero() {
        assert_eq!(similarity("bitcoin", "xmr"), 0.0);
        assert_eq!(similarity("a", "b"), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        // {ab, bc} vs {ab, bd}: one shared bigram out of four.
        assert_eq!(similarity("abc", "abd"), 0.5);
        assert!(similarity("etherium", "ethereum") > 0.45);
        assert!(similarity("tether", "tether usd") > 0.45);
    }

    #[test]
    fn test_repeated_bigrams_counted_once_each() {
        // "aaaa" has three `aa` bigrams, "aa" has one.
        assert_eq!(similarity("aaaa", "aa"), 0.5);
    }

    proptest! {
        #[test]
        fn prop_symmetric(a in "[a-zA-Z0-9 ]{0,12}", b in "[a-zA-Z0-9 ]{0,12}") {
            prop_assert_eq!(similarity(&a, &b), similarity(&b, &a));
        }

        #[test]
        fn prop_bounded(a in ".{0,16}", b in ".{0,16}") {
            let score = similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        #[test]
        fn prop_reflexive(a in ".{0,16}") {
            prop_assert_eq!(similarity(&a, &a), 1.0);
        }
    }
}
