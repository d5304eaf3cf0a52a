//! Cache Module
//!
//! Query normalization, cache-key derivation, and the filesystem-backed
//! artifact store with its statistics census.

mod key;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use key::{normalize, sanitize_filename, CacheKey};
pub use stats::CacheStats;
pub use store::{CacheStore, CachedArtifact};

// == Public Constants ==
/// Conventional suffix of the target codec
pub const AUDIO_EXT: &str = "mp3";
