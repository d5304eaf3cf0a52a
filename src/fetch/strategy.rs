//! Extraction Strategies
//!
//! Ordered catalog of extraction configurations the fetch engine tries until
//! one succeeds. Earlier entries are the normal path; later ones work around
//! source-side restrictions at the cost of quality or speed.

// == Extraction Strategy ==
/// One named configuration of the external extraction engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionStrategy {
    /// Short name used in logs and failure reports
    pub name: &'static str,
    /// Arguments appended to the base extractor invocation
    pub extra_args: &'static [&'static str],
}

/// Canonical strategy ordering.
///
/// 1. `web` - default client, best quality path.
/// 2. `android-client` - alternate client identity; sidesteps restrictions
///    the source applies to the web client.
/// 3. `generic` - generic extractor fallback, last resort.
pub const DEFAULT_STRATEGIES: [ExtractionStrategy; 3] = [
    ExtractionStrategy {
        name: "web",
        extra_args: &[],
    },
    ExtractionStrategy {
        name: "android-client",
        extra_args: &["--extractor-args", "youtube:player_client=android"],
    },
    ExtractionStrategy {
        name: "generic",
        extra_args: &["--force-generic-extractor"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order_starts_with_plain_client() {
        assert_eq!(DEFAULT_STRATEGIES[0].name, "web");
        assert!(DEFAULT_STRATEGIES[0].extra_args.is_empty());
    }

    #[test]
    fn test_generic_extractor_is_last_resort() {
        let last = DEFAULT_STRATEGIES.last().unwrap();
        assert_eq!(last.name, "generic");
        assert!(last.extra_args.contains(&"--force-generic-extractor"));
    }

    #[test]
    fn test_strategy_names_unique() {
        let mut names: Vec<_> = DEFAULT_STRATEGIES.iter().map(|s| s.name).collect();
        names.dedup();
        assert_eq!(names.len(), DEFAULT_STRATEGIES.len());
    }
}
