//! Property-Based Tests for the Cache Module
//!
//! Uses proptest to verify the normalization and key-derivation invariants.

use proptest::prelude::*;

use crate::cache::{normalize, CacheKey};

// == Strategies ==
/// Generates query bodies from the characters normalization keeps.
fn plain_query_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9 _-]{0,40}".prop_map(|s| s)
}

/// Interleaves formatting noise (case flips, extra whitespace, punctuation)
/// that must not affect the derived key.
fn noisy_variant(base: &str, seed: u64) -> String {
    let mut out = String::from("  ");
    for (i, c) in base.chars().enumerate() {
        if seed >> (i % 60) & 1 == 1 {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        if c == ' ' && seed >> (i % 59) & 1 == 1 {
            out.push_str("   ");
        }
        if seed >> (i % 57) & 1 == 1 {
            out.push(',');
        }
    }
    out.push('\t');
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Normalization applied twice is the same as applied once, for ANY input.
    #[test]
    fn prop_normalize_idempotent(input in ".*") {
        let once = normalize(&input);
        prop_assert_eq!(normalize(&once), once);
    }

    // Normalized output only ever contains the allowed character set, with
    // no leading, trailing, or doubled spaces.
    #[test]
    fn prop_normalize_output_charset(input in ".*") {
        let out = normalize(&input);
        prop_assert!(out
            .chars()
            .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_'));
        prop_assert_eq!(out.trim(), out.as_str());
        prop_assert!(!out.contains("  "));
    }

    // Case, surrounding whitespace, repeated internal spaces, and stripped
    // punctuation never change the derived cache key.
    #[test]
    fn prop_key_stable_under_formatting_noise(
        base in plain_query_strategy(),
        seed in any::<u64>(),
    ) {
        let noisy = noisy_variant(&base, seed);
        prop_assert_eq!(
            CacheKey::from_query(&base),
            CacheKey::from_query(&noisy),
            "base {:?} vs noisy {:?}", base, noisy
        );
    }

    // Different normalized texts produce different keys (hex digests of
    // different inputs; a collision here would mean serving the wrong track).
    #[test]
    fn prop_distinct_normalized_queries_distinct_keys(
        a in plain_query_strategy(),
        b in plain_query_strategy(),
    ) {
        prop_assume!(normalize(&a) != normalize(&b));
        prop_assert_ne!(CacheKey::from_query(&a), CacheKey::from_query(&b));
    }
}
