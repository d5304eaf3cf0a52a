//! Cache Key Module
//!
//! Query normalization and cache-key derivation. Two queries that differ only
//! in case, surrounding whitespace, repeated internal spaces, or stripped
//! punctuation map to the same key.

use sha2::{Digest, Sha256};

// == Normalization ==
/// Canonicalizes free-text input for stable cache-key derivation.
///
/// Lowercases, strips characters outside {alphanumeric, space, hyphen,
/// underscore}, trims, and collapses internal whitespace runs to single
/// spaces. Always returns a string (possibly empty); idempotent.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes filesystem-hostile characters from a display name so it can be
/// embedded in an artifact filename.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .collect::<String>()
        .trim()
        .to_string()
}

// == Cache Key ==
/// Fixed-length key derived from a normalized query.
///
/// Holds the SHA-256 hex digest of the normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    // == Constructor ==
    /// Derives the key for a raw query.
    ///
    /// The query is normalized first, so unrelated whitespace, case, and
    /// punctuation differences cannot produce distinct keys.
    pub fn from_query(query: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(normalize(query).as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// The hex digest used as the artifact filename prefix.
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
