//! Fetch Engine Module
//!
//! Drives the external `yt-dlp` extractor to turn a candidate source URL
//! into a local MP3 file. Strategies are tried in order; each attempt is a
//! sum-typed result and the engine folds the list until the first success.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::cache::AUDIO_EXT;
use crate::fetch::strategy::{ExtractionStrategy, DEFAULT_STRATEGIES};
use crate::search::CandidateSource;

/// External extractor binary, expected on PATH with ffmpeg available to it.
const YTDLP_BIN: &str = "yt-dlp";

/// How much of a failed attempt's stderr is kept in the failure reason.
const STDERR_TAIL_BYTES: usize = 300;

// == Fetched Audio ==
/// A produced audio file together with its scratch-directory guard.
///
/// The scratch directory is removed when this value drops, on every exit
/// path; callers move the file out (cache commit) before dropping.
#[derive(Debug)]
pub struct FetchedAudio {
    /// Path of the transcoded file inside the scratch directory
    pub path: PathBuf,
    _scratch: TempDir,
}

impl FetchedAudio {
    /// Wraps a produced file with the scratch dir that owns it.
    pub fn new(path: PathBuf, scratch: TempDir) -> Self {
        Self {
            path,
            _scratch: scratch,
        }
    }

    /// Size of the produced file in bytes.
    pub fn size_bytes(&self) -> io::Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }
}

// == Errors ==
/// A single strategy attempt that did not produce output.
#[derive(Error, Debug)]
#[error("strategy {strategy}: {reason}")]
pub struct StrategyError {
    /// Which strategy failed
    pub strategy: &'static str,
    /// Extractor exit status or stderr tail
    pub reason: String,
}

/// Failure of the whole fetch operation.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Scratch directory could not be created
    #[error("could not create scratch directory: {0}")]
    Scratch(#[from] io::Error),

    /// Every strategy in the ordered list failed
    #[error("all extraction strategies failed: {0}")]
    AllStrategiesFailed(String),
}

// == Fetcher Trait ==
/// Produces a local audio file for a resolved candidate source.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    async fn fetch(&self, source: &CandidateSource) -> Result<FetchedAudio, FetchError>;
}

// == yt-dlp Fetcher ==
/// Fetcher backed by the `yt-dlp` executable.
///
/// One invocation extracts the best available audio stream and transcodes it
/// to MP3 at the configured bitrate, writing `%(title)s.mp3` into a fresh
/// per-request scratch directory.
pub struct YtDlpFetcher {
    bitrate_kbps: u32,
    strategies: Vec<ExtractionStrategy>,
}

impl YtDlpFetcher {
    /// Creates a fetcher with the canonical strategy ordering.
    pub fn new(bitrate_kbps: u32) -> Self {
        Self {
            bitrate_kbps,
            strategies: DEFAULT_STRATEGIES.to_vec(),
        }
    }

    /// Runs one strategy to completion.
    async fn run_strategy(
        &self,
        strategy: &ExtractionStrategy,
        url: &str,
        scratch: &Path,
    ) -> Result<PathBuf, StrategyError> {
        let mut cmd = Command::new(YTDLP_BIN);
        cmd.arg("--quiet")
            .arg("--no-warnings")
            .arg("--no-playlist")
            .arg("--format")
            .arg("bestaudio/best")
            .arg("--extract-audio")
            .arg("--audio-format")
            .arg(AUDIO_EXT)
            .arg("--audio-quality")
            .arg(format!("{}K", self.bitrate_kbps))
            .arg("--output")
            .arg(scratch.join("%(title)s.%(ext)s"));
        for arg in strategy.extra_args {
            cmd.arg(arg);
        }
        cmd.arg(url);

        let output = cmd.output().await.map_err(|e| StrategyError {
            strategy: strategy.name,
            reason: if e.kind() == io::ErrorKind::NotFound {
                format!("{YTDLP_BIN} not found on PATH")
            } else {
                e.to_string()
            },
        })?;

        if !output.status.success() {
            return Err(StrategyError {
                strategy: strategy.name,
                reason: format!(
                    "exit {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr_tail(&output.stderr)
                ),
            });
        }

        find_audio_output(scratch).ok_or_else(|| StrategyError {
            strategy: strategy.name,
            reason: "extractor reported success but produced no audio file".to_string(),
        })
    }
}

#[async_trait]
impl AudioFetcher for YtDlpFetcher {
    async fn fetch(&self, source: &CandidateSource) -> Result<FetchedAudio, FetchError> {
        let scratch = tempfile::Builder::new().prefix("snd_").tempdir()?;
        debug!(url = %source.url, scratch = %scratch.path().display(), "fetch started");

        let scratch_path = scratch.path().to_path_buf();
        let path = first_success(&self.strategies, |strategy| {
            self.run_strategy(strategy, &source.url, &scratch_path)
        })
        .await?;

        Ok(FetchedAudio::new(path, scratch))
    }
}

// == Strategy Fold ==
/// Folds the ordered strategy list until the first successful attempt.
///
/// Failures are logged and accumulated; later strategies are not attempted
/// once one succeeds.
pub(crate) async fn first_success<'a, T, F, Fut>(
    strategies: &'a [ExtractionStrategy],
    mut attempt: F,
) -> Result<T, FetchError>
where
    F: FnMut(&'a ExtractionStrategy) -> Fut,
    Fut: Future<Output = Result<T, StrategyError>>,
{
    let mut failures = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        match attempt(strategy).await {
            Ok(value) => {
                debug!(strategy = strategy.name, "extraction succeeded");
                return Ok(value);
            }
            Err(err) => {
                warn!(strategy = strategy.name, reason = %err.reason, "extraction attempt failed");
                failures.push(err.to_string());
            }
        }
    }
    Err(FetchError::AllStrategiesFailed(failures.join("; ")))
}

// == Utility Functions ==

/// First file with the target extension inside the scratch directory.
fn find_audio_output(scratch: &Path) -> Option<PathBuf> {
    std::fs::read_dir(scratch)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().map(|ext| ext == AUDIO_EXT).unwrap_or(false))
}

/// Last chunk of stderr, enough to identify the failure without flooding logs.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    match text.char_indices().nth_back(STDERR_TAIL_BYTES) {
        Some((idx, _)) => format!("...{}", &text[idx..]),
        None => text.to_string(),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn strategies() -> Vec<ExtractionStrategy> {
        DEFAULT_STRATEGIES.to_vec()
    }

    #[tokio::test]
    async fn test_first_success_returns_first_passing_strategy() {
        let attempts = Cell::new(0);
        let result = first_success(&strategies(), |strategy| {
            attempts.set(attempts.get() + 1);
            let name = strategy.name;
            async move {
                if name == "generic" {
                    Ok(7)
                } else {
                    Err(StrategyError {
                        strategy: name,
                        reason: "blocked".to_string(),
                    })
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.get(), 3, "both earlier strategies must be tried");
    }

    #[tokio::test]
    async fn test_first_success_stops_after_success() {
        let attempts = Cell::new(0);
        let result = first_success(&strategies(), |strategy| {
            attempts.set(attempts.get() + 1);
            let name = strategy.name;
            async move {
                if name == "android-client" {
                    Ok("file")
                } else {
                    Err(StrategyError {
                        strategy: name,
                        reason: "blocked".to_string(),
                    })
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "file");
        assert_eq!(attempts.get(), 2, "strategies after a success must not run");
    }

    #[tokio::test]
    async fn test_first_success_reports_every_failure() {
        let result: Result<(), _> = first_success(&strategies(), |strategy| {
            let name = strategy.name;
            async move {
                Err(StrategyError {
                    strategy: name,
                    reason: "nope".to_string(),
                })
            }
        })
        .await;

        let err = result.unwrap_err();
        let text = err.to_string();
        assert!(matches!(err, FetchError::AllStrategiesFailed(_)));
        assert!(text.contains("web"));
        assert!(text.contains("android-client"));
        assert!(text.contains("generic"));
    }

    #[test]
    fn test_find_audio_output_ignores_other_files() {
        let scratch = tempfile::tempdir().unwrap();
        std::fs::write(scratch.path().join("track.webm"), b"x").unwrap();
        std::fs::write(scratch.path().join("track.mp3"), b"x").unwrap();

        let found = find_audio_output(scratch.path()).unwrap();
        assert_eq!(found.extension().unwrap(), "mp3");
    }

    #[test]
    fn test_find_audio_output_empty_dir() {
        let scratch = tempfile::tempdir().unwrap();
        assert!(find_audio_output(scratch.path()).is_none());
    }

    #[test]
    fn test_stderr_tail_keeps_short_output() {
        assert_eq!(stderr_tail(b"  short error \n"), "short error");
    }

    #[test]
    fn test_stderr_tail_truncates_long_output() {
        let long = "x".repeat(2000);
        let tail = stderr_tail(long.as_bytes());
        assert!(tail.starts_with("..."));
        assert!(tail.len() < 400);
    }

    #[test]
    fn test_scratch_removed_when_fetched_audio_drops() {
        let scratch = tempfile::tempdir().unwrap();
        let inner = scratch.path().to_path_buf();
        let file = inner.join("a.mp3");
        std::fs::write(&file, b"x").unwrap();

        let fetched = FetchedAudio::new(file, scratch);
        assert!(fetched.path.exists());
        drop(fetched);
        assert!(!inner.exists(), "scratch dir must be removed on drop");
    }
}
