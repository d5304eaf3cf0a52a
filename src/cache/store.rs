//! Cache Store Module
//!
//! Filesystem-backed artifact store mapping cache keys to MP3 files. The
//! store exclusively owns its directory namespace; the pipeline orchestrator
//! is the only writer. No eviction, no expiry, no locking.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cache::key::{sanitize_filename, CacheKey};
use crate::cache::{CacheStats, AUDIO_EXT};

/// Longest display-name portion embedded in an artifact filename.
const MAX_DISPLAY_LEN: usize = 80;

// == Cached Artifact ==
/// A committed artifact: a file on disk plus its size and display name.
#[derive(Debug, Clone)]
pub struct CachedArtifact {
    /// Path of the MP3 file inside the cache directory
    pub path: PathBuf,
    /// File size in bytes
    pub size_bytes: u64,
    /// Human-readable name recovered from the filename
    pub display_name: String,
}

// == Cache Store ==
/// Artifact store rooted at a single cache directory.
#[derive(Debug)]
pub struct CacheStore {
    /// Directory holding all committed artifacts
    dir: PathBuf,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store rooted at `dir`, creating the directory if absent.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory this store owns.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // == Key Derivation ==
    /// Deterministic key for a raw query (hash of its normalized form).
    pub fn key_for(&self, query: &str) -> CacheKey {
        CacheKey::from_query(query)
    }

    // == Lookup ==
    /// Returns the artifact for `key` if one exists on disk.
    ///
    /// Existence is the only check; a corrupt or partial file is still a hit.
    pub fn lookup(&self, key: &CacheKey) -> Option<CachedArtifact> {
        let entries = fs::read_dir(&self.dir).ok()?;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let path = entry.path();
            if name.starts_with(key.as_hex()) && has_audio_ext(&path) {
                let size_bytes = entry.metadata().ok()?.len();
                return Some(CachedArtifact {
                    display_name: display_name_of(&path, key),
                    path,
                    size_bytes,
                });
            }
        }
        None
    }

    // == Commit ==
    /// Relocates a produced file into the cache namespace for `key`.
    ///
    /// Any stale artifact for the same key is removed first, so a re-commit
    /// replaces rather than accumulates. The move is a rename where possible,
    /// with a copy-and-remove fallback for cross-filesystem scratch dirs.
    pub fn commit(
        &self,
        key: &CacheKey,
        source: &Path,
        display_name: &str,
    ) -> io::Result<CachedArtifact> {
        self.remove_stale(key);

        let target = self.dir.join(artifact_file_name(key, display_name));
        move_file(source, &target)?;

        let size_bytes = fs::metadata(&target)?.len();
        debug!(key = %key, path = %target.display(), size_bytes, "artifact committed");

        Ok(CachedArtifact {
            display_name: display_name_of(&target, key),
            path: target,
            size_bytes,
        })
    }

    // == Stats ==
    /// Scans the cache directory and returns the artifact census.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        if let Ok(entries) = fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                if has_audio_ext(&entry.path()) {
                    if let Ok(meta) = entry.metadata() {
                        stats.record_artifact(meta.len());
                    }
                }
            }
        }
        stats
    }

    /// Removes existing artifacts for `key` ahead of a commit.
    fn remove_stale(&self, key: &CacheKey) {
        if let Ok(entries) = fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                let name = entry.file_name();
                if name.to_string_lossy().starts_with(key.as_hex()) {
                    let _ = fs::remove_file(entry.path());
                }
            }
        }
    }
}

// == Utility Functions ==

/// True when the path carries the target codec's suffix.
fn has_audio_ext(path: &Path) -> bool {
    path.extension().map(|ext| ext == AUDIO_EXT).unwrap_or(false)
}

/// Builds `<hex>-<sanitized name>.mp3`, or `<hex>.mp3` when the sanitized
/// name comes out empty.
fn artifact_file_name(key: &CacheKey, display_name: &str) -> String {
    let cleaned: String = sanitize_filename(display_name)
        .chars()
        .take(MAX_DISPLAY_LEN)
        .collect();
    if cleaned.is_empty() {
        format!("{}.{}", key.as_hex(), AUDIO_EXT)
    } else {
        format!("{}-{}.{}", key.as_hex(), cleaned, AUDIO_EXT)
    }
}

/// Recovers the human-readable portion of an artifact filename.
fn display_name_of(path: &Path, key: &CacheKey) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.strip_prefix(key.as_hex())
        .map(|rest| rest.trim_start_matches('-').to_string())
        .filter(|rest| !rest.is_empty())
        .unwrap_or(stem)
}

/// Rename with copy-and-remove fallback (scratch dirs may be on another
/// filesystem, where rename fails with EXDEV).
fn move_file(source: &Path, target: &Path) -> io::Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(source, target)?;
            fs::remove_file(source)
        }
    }
}
