//! # Product Matcher Tests
//!
//! Threshold and exact-match behaviour of fuzzy product matching.

use recipe_basket::catalog::ProductRecord;
use recipe_basket::product_matcher::{find_matches, normalize_name, ProductMatcher, DEFAULT_THRESHOLD};

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<ProductRecord> {
        vec![
            ProductRecord::new("しょうゆ", "10% 108円", "98", 500.0, "ml"),
            ProductRecord::new("濃口しょうゆ", "10% 216円", "196", 1000.0, "ml"),
            ProductRecord::new("玉ねぎ", "8% 162円", "150", 3.0, "個"),
            ProductRecord::new("新玉ねぎ", "8% 216円", "200", 2.0, "個"),
            ProductRecord::new("Olive Oil", "8% 540円", "500", 450.0, "g"),
            ProductRecord::new("Extra Virgin Olive Oil", "8% 864円", "800", 450.0, "g"),
            ProductRecord::new("みりん", "8% 324円", "300", 1.0, "L"),
        ]
    }

    fn names(products: &[ProductRecord]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_default_threshold() {
        assert_eq!(DEFAULT_THRESHOLD, 85);
        assert_eq!(ProductMatcher::default().threshold(), 85);
    }

    #[test]
    fn test_raising_threshold_never_adds_matches() {
        let catalog = catalog();
        let terms = ["しょうゆ", "玉ねぎ小", "新たまねぎ", "olive oil", "extra virgin oil", "みりん風"];

        let mut previous: Option<Vec<String>> = None;
        for threshold in (0..=100u8).step_by(5) {
            let current: Vec<String> = find_matches(&terms, &catalog, threshold)
                .into_iter()
                .map(|p| p.name)
                .collect();
            if let Some(lower) = &previous {
                assert!(
                    current.iter().all(|name| lower.contains(name)),
                    "threshold {threshold} produced {current:?}, not a subset of {lower:?}"
                );
            }
            previous = Some(current);
        }

        let at_85 = find_matches(&terms, &catalog, 85);
        let at_90 = find_matches(&terms, &catalog, 90);
        assert!(at_90.iter().all(|p| at_85.contains(p)));
    }

    #[test]
    fn test_exact_normalized_name_always_matches() {
        let catalog = catalog();
        for record in &catalog {
            let spaced = format!("  {}  ", record.name.to_uppercase());
            for threshold in [0, 50, 85, 99, 100] {
                let found = find_matches(&[spaced.as_str()], &catalog, threshold);
                assert!(
                    found.contains(record),
                    "'{}' missing at threshold {}",
                    record.name,
                    threshold
                );
            }
        }
    }

    #[test]
    fn test_unrelated_terms_do_not_match() {
        assert!(find_matches(&["砂糖", "chicken"], &catalog(), 85).is_empty());
    }

    #[test]
    fn test_each_term_contributes_one_product() {
        let found = find_matches(&["olive oil"], &catalog(), 0);
        assert_eq!(names(&found), vec!["Olive Oil"]);
    }

    #[test]
    fn test_shared_hits_are_deduplicated() {
        let found = find_matches(&["しょうゆ", "しょう ゆ", "SHOUYU", "しょうゆ"], &catalog(), 85);
        assert_eq!(names(&found), vec!["しょうゆ"]);
    }

    #[test]
    fn test_normalized_collision_keeps_last_record() {
        let catalog = vec![
            ProductRecord::new("Soy Sauce", "8% 100円", "92", 1.0, "L"),
            ProductRecord::new("soysauce", "8% 200円", "185", 1.0, "L"),
        ];
        assert_eq!(normalize_name("Soy Sauce"), normalize_name("soysauce"));

        let found = find_matches(&["soy sauce"], &catalog, 100);
        assert_eq!(names(&found), vec!["soysauce"]);
    }
}
