//! Configuration Module
//!
//! Handles loading bot configuration and credentials from environment variables.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Error raised when a required credential is missing at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The Telegram bot credential was not provided
    #[error("BOT_TOKEN is not set; provide it via the environment or a .env file")]
    MissingBotToken,
}

/// Bot configuration parameters.
///
/// Loaded once at startup and passed into each component; nothing reads the
/// environment after construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot credential (required)
    pub bot_token: String,
    /// YouTube Data API credential; absence degrades search to zero results
    pub youtube_api_key: Option<String>,
    /// Directory holding cached MP3 artifacts
    pub cache_dir: PathBuf,
    /// Maximum deliverable artifact size in bytes
    pub max_artifact_bytes: u64,
    /// Target MP3 bitrate in kbit/s
    pub audio_bitrate_kbps: u32,
    /// Number of search candidates requested per query
    pub search_results: u8,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BOT_TOKEN` - Telegram bot credential (required)
    /// - `YOUTUBE_API_KEY` - YouTube Data API credential (optional)
    /// - `CACHE_DIR` - Artifact cache directory (default: cache)
    /// - `MAX_TRACK_MB` - Size limit in megabytes (default: 45)
    /// - `AUDIO_BITRATE_KBPS` - MP3 bitrate (default: 192)
    /// - `SEARCH_RESULTS` - Candidates per search (default: 5)
    ///
    /// # Errors
    /// Returns `ConfigError::MissingBotToken` when `BOT_TOKEN` is absent or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = env::var("BOT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingBotToken)?;

        let max_mb: u64 = env::var("MAX_TRACK_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(45);

        Ok(Self {
            bot_token,
            youtube_api_key: env::var("YOUTUBE_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("cache")),
            max_artifact_bytes: max_mb * 1024 * 1024,
            audio_bitrate_kbps: env::var("AUDIO_BITRATE_KBPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(192),
            search_results: env::var("SEARCH_RESULTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        })
    }

    /// Size limit expressed in whole megabytes, for user-facing text.
    pub fn max_artifact_mb(&self) -> u64 {
        self.max_artifact_bytes / (1024 * 1024)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            youtube_api_key: None,
            cache_dir: PathBuf::from("cache"),
            max_artifact_bytes: 45 * 1024 * 1024,
            audio_bitrate_kbps: 192,
            search_results: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_dir, PathBuf::from("cache"));
        assert_eq!(config.max_artifact_bytes, 45 * 1024 * 1024);
        assert_eq!(config.audio_bitrate_kbps, 192);
        assert_eq!(config.search_results, 5);
        assert!(config.youtube_api_key.is_none());
    }

    #[test]
    fn test_max_artifact_mb_rounds_down() {
        let config = Config {
            max_artifact_bytes: 45 * 1024 * 1024 + 512,
            ..Config::default()
        };
        assert_eq!(config.max_artifact_mb(), 45);
    }

    // Env-var tests mutate shared process state, so everything that touches
    // BOT_TOKEN lives in one test to avoid cross-test interference.
    #[test]
    fn test_config_from_env() {
        env::remove_var("BOT_TOKEN");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::MissingBotToken)
        ));

        env::set_var("BOT_TOKEN", "123:abc");
        env::remove_var("YOUTUBE_API_KEY");
        env::remove_var("CACHE_DIR");
        env::remove_var("MAX_TRACK_MB");
        env::remove_var("AUDIO_BITRATE_KBPS");
        env::remove_var("SEARCH_RESULTS");

        let config = Config::from_env().unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert!(config.youtube_api_key.is_none());
        assert_eq!(config.max_artifact_mb(), 45);
        assert_eq!(config.audio_bitrate_kbps, 192);

        env::set_var("MAX_TRACK_MB", "20");
        let config = Config::from_env().unwrap();
        assert_eq!(config.max_artifact_bytes, 20 * 1024 * 1024);

        env::remove_var("MAX_TRACK_MB");
        env::remove_var("BOT_TOKEN");
    }
}
