//! SoundScout - a chat bot that turns track queries into cached MP3s
//!
//! # Startup Sequence
//! 1. Initialize tracing subscriber for logging
//! 2. Load `.env` and configuration from environment variables (the bot
//!    credential is required; startup aborts without it)
//! 3. Open the artifact cache store
//! 4. Build the search resolver and fetch engine
//! 5. Assemble the pipeline and start the long-poll dispatcher
//! 6. Handle graceful shutdown on SIGINT/SIGTERM

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sound_scout::bot::{BotApi, Dispatcher};
use sound_scout::cache::CacheStore;
use sound_scout::config::Config;
use sound_scout::fetch::YtDlpFetcher;
use sound_scout::pipeline::Pipeline;
use sound_scout::search::YouTubeResolver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sound_scout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SoundScout");

    // Secrets may live in a .env file next to the binary
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("configuration error")?;
    info!(
        "Configuration loaded: cache_dir={}, max_track={}MB, bitrate={}kbps, search_key={}",
        config.cache_dir.display(),
        config.max_artifact_mb(),
        config.audio_bitrate_kbps,
        if config.youtube_api_key.is_some() { "present" } else { "absent" }
    );

    let cache = Arc::new(CacheStore::new(&config.cache_dir).context("could not open cache directory")?);
    info!("Cache store initialized: {} tracks on disk", cache.stats().files);

    let http = reqwest::Client::new();
    let resolver = Arc::new(YouTubeResolver::new(
        http,
        config.youtube_api_key.clone(),
        config.search_results,
    ));
    let fetcher = Arc::new(YtDlpFetcher::new(config.audio_bitrate_kbps));
    let pipeline = Arc::new(Pipeline::new(
        cache,
        resolver,
        fetcher,
        config.max_artifact_bytes,
    ));

    let api = Arc::new(BotApi::new(&config.bot_token).context("could not build transport client")?);
    let dispatcher = Dispatcher::new(api, pipeline, config.max_artifact_mb());
    info!("Dispatcher starting, waiting for messages");

    tokio::select! {
        _ = dispatcher.run() => {}
        _ = shutdown_signal() => {}
    }

    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
