//! Dispatcher Module
//!
//! Long-poll loop that turns incoming chat messages into pipeline runs.
//! Each update is handled in its own spawned task, so a slow download never
//! blocks other requesters. Every terminal pipeline state produces exactly
//! one reply.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::bot::api::BotApi;
use crate::bot::types::{Command, Message};
use crate::error::PipelineError;
use crate::pipeline::{Pipeline, ProgressReporter};

/// Long-poll window for getUpdates.
const POLL_TIMEOUT_SECS: u64 = 50;

/// Pause before retrying after a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Performer tag attached to delivered audio.
const PERFORMER_TAG: &str = "SoundScout";

// == Dispatcher ==
/// Update loop wiring the chat transport to the track pipeline.
pub struct Dispatcher {
    api: Arc<BotApi>,
    pipeline: Arc<Pipeline>,
    max_artifact_mb: u64,
}

impl Dispatcher {
    // == Constructor ==
    pub fn new(api: Arc<BotApi>, pipeline: Arc<Pipeline>, max_artifact_mb: u64) -> Self {
        Self {
            api,
            pipeline,
            max_artifact_mb,
        }
    }

    // == Run ==
    /// Polls for updates until the surrounding task is cancelled.
    ///
    /// Poll failures are logged and retried after a short delay; a transport
    /// hiccup must not take the bot down.
    pub async fn run(&self) {
        let mut offset: i64 = 0;
        loop {
            match self.api.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        let Some(message) = update.message else {
                            continue;
                        };
                        let api = Arc::clone(&self.api);
                        let pipeline = Arc::clone(&self.pipeline);
                        let max_mb = self.max_artifact_mb;
                        tokio::spawn(async move {
                            handle_message(api, pipeline, max_mb, message).await;
                        });
                    }
                }
                Err(err) => {
                    warn!(error = %err, "update poll failed, retrying");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }
    }
}

// == Message Handling ==

async fn handle_message(
    api: Arc<BotApi>,
    pipeline: Arc<Pipeline>,
    max_artifact_mb: u64,
    message: Message,
) {
    let chat_id = message.chat.id;
    let Some(text) = message.text else {
        debug!(chat_id, "non-text message ignored");
        return;
    };

    if text.trim_start().starts_with('/') {
        match Command::parse(&text) {
            Some(Command::Start) => {
                reply_text(&api, chat_id, &start_text(max_artifact_mb)).await;
            }
            Some(Command::Info) => {
                let stats = pipeline.cache().stats();
                reply_text(&api, chat_id, &stats.summary(pipeline.cache().dir())).await;
            }
            None => debug!(chat_id, text = %text, "unknown command ignored"),
        }
        return;
    }

    handle_track_query(api, pipeline, chat_id, text).await;
}

async fn handle_track_query(api: Arc<BotApi>, pipeline: Arc<Pipeline>, chat_id: i64, query: String) {
    let progress = ChatProgress {
        api: Arc::clone(&api),
        chat_id,
    };

    match pipeline.handle_query(&query, &progress).await {
        Ok(delivery) => {
            let caption = format!("🎶 {}", delivery.title);
            let send = api
                .send_audio(
                    chat_id,
                    &delivery.artifact.path,
                    &caption,
                    &delivery.title,
                    delivery.uploader.as_deref().or(Some(PERFORMER_TAG)),
                )
                .await;
            match send {
                Ok(()) => info!(
                    chat_id,
                    title = %delivery.title,
                    from_cache = delivery.from_cache,
                    "track delivered"
                ),
                Err(err) => {
                    error!(chat_id, error = %err, "audio send failed");
                    let delivery_err = PipelineError::Delivery(err.to_string());
                    reply_text(&api, chat_id, &delivery_err.user_message()).await;
                }
            }
        }
        Err(err) => {
            info!(chat_id, error = %err, "request ended without delivery");
            reply_text(&api, chat_id, &err.user_message()).await;
        }
    }
}

/// Sends a text reply, logging instead of propagating a send failure. The
/// reply is already the terminal action for its request.
async fn reply_text(api: &BotApi, chat_id: i64, text: &str) {
    if let Err(err) = api.send_message(chat_id, text).await {
        error!(chat_id, error = %err, "text reply failed");
    }
}

fn start_text(max_artifact_mb: u64) -> String {
    format!(
        "🎧 SoundScout\nSend a track name and I'll reply with the MP3.\nSize limit: {max_artifact_mb} MB."
    )
}

// == Chat Progress ==
/// Progress reporter that sends interim status texts to the requester.
struct ChatProgress {
    api: Arc<BotApi>,
    chat_id: i64,
}

#[async_trait]
impl ProgressReporter for ChatProgress {
    async fn searching(&self) {
        reply_text(&self.api, self.chat_id, "Searching for the track...").await;
    }

    async fn downloading(&self, title: &str) {
        reply_text(
            &self.api,
            self.chat_id,
            &format!("Found: {title}\nDownloading audio..."),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_text_names_the_limit() {
        let text = start_text(45);
        assert!(text.contains("45 MB"));
        assert!(text.contains("track name"));
    }
}
