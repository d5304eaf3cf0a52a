//! Telegram Bot API client
//!
//! Minimal long-polling client over reqwest: fetch updates, send text
//! replies, and upload audio attachments. Credentials live only in the
//! request URL; they are never logged.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use thiserror::Error;

use crate::bot::types::{ApiEnvelope, Update};

const API_BASE: &str = "https://api.telegram.org";

/// Connect timeout for all transport requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Overall request timeout; must exceed the long-poll window and leave room
/// for large audio uploads.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// == Transport Error ==
/// Failure talking to the chat transport.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Network-level failure
    #[error("transport request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered `ok: false`
    #[error("bot API error: {0}")]
    Api(String),

    /// Artifact could not be read for upload
    #[error("could not read artifact: {0}")]
    Io(#[from] std::io::Error),
}

// == Bot API Client ==
pub struct BotApi {
    http: Client,
    base: String,
}

impl BotApi {
    // == Constructor ==
    /// Builds a client for the given bot credential.
    pub fn new(token: &str) -> Result<Self, TransportError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base: format!("{API_BASE}/bot{token}"),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base, method)
    }

    // == Get Updates ==
    /// Long-polls for new updates past `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        let envelope: ApiEnvelope<Vec<Update>> = self
            .http
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
                ("allowed_updates", r#"["message"]"#.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;
        unwrap_envelope(envelope)
    }

    // == Send Message ==
    /// Sends a plain text reply.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        let envelope: ApiEnvelope<serde_json::Value> = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await?
            .json()
            .await?;
        unwrap_envelope(envelope).map(|_| ())
    }

    // == Send Audio ==
    /// Uploads an audio file with caption, title, and optional performer tag.
    pub async fn send_audio(
        &self,
        chat_id: i64,
        file: &Path,
        caption: &str,
        title: &str,
        performer: Option<&str>,
    ) -> Result<(), TransportError> {
        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "track.mp3".to_string());
        let audio = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/mpeg")?;

        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .text("title", title.to_string())
            .part("audio", audio);
        if let Some(performer) = performer {
            form = form.text("performer", performer.to_string());
        }

        let envelope: ApiEnvelope<serde_json::Value> = self
            .http
            .post(self.method_url("sendAudio"))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;
        unwrap_envelope(envelope).map(|_| ())
    }
}

// == Utility Functions ==

/// Unwraps the `ok`/`result`/`description` envelope.
fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T, TransportError> {
    if envelope.ok {
        envelope
            .result
            .ok_or_else(|| TransportError::Api("ok response without result".to_string()))
    } else {
        Err(TransportError::Api(
            envelope
                .description
                .unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url_embeds_token() {
        let api = BotApi::new("123:abc").unwrap();
        assert_eq!(
            api.method_url("getUpdates"),
            "https://api.telegram.org/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn test_unwrap_envelope_ok() {
        let envelope = ApiEnvelope {
            ok: true,
            result: Some(5),
            description: None,
        };
        assert_eq!(unwrap_envelope(envelope).unwrap(), 5);
    }

    #[test]
    fn test_unwrap_envelope_error_carries_description() {
        let envelope: ApiEnvelope<i32> = ApiEnvelope {
            ok: false,
            result: None,
            description: Some("Unauthorized".to_string()),
        };
        let err = unwrap_envelope(envelope).unwrap_err();
        assert!(matches!(err, TransportError::Api(ref d) if d == "Unauthorized"));
    }

    #[test]
    fn test_unwrap_envelope_ok_without_result_is_error() {
        let envelope: ApiEnvelope<i32> = ApiEnvelope {
            ok: true,
            result: None,
            description: None,
        };
        assert!(unwrap_envelope(envelope).is_err());
    }
}
