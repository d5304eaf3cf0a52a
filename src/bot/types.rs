//! Telegram wire types
//!
//! The subset of the Bot API payloads the dispatcher consumes, plus command
//! parsing for slash-messages.

use serde::Deserialize;

// == Update Payloads ==

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

// == API Envelope ==
/// Every Bot API response wraps its payload in `ok`/`result`/`description`.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

// == Commands ==
/// Registered bot commands. Any other slash-message is ignored; any
/// non-slash text is treated as a track query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Help and usage text
    Start,
    /// Cache statistics
    Info,
}

impl Command {
    /// Parses a slash-command, tolerating a `@botname` suffix and trailing
    /// arguments. Returns `None` for unknown commands and plain text.
    pub fn parse(text: &str) -> Option<Self> {
        let name = text
            .trim()
            .strip_prefix('/')?
            .split_whitespace()
            .next()
            .unwrap_or("")
            .split('@')
            .next()
            .unwrap_or("");
        match name {
            "start" => Some(Command::Start),
            "info" => Some(Command::Info),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/info"), Some(Command::Info));
    }

    #[test]
    fn test_parse_with_bot_suffix_and_args() {
        assert_eq!(Command::parse("/start@SoundScoutBot"), Some(Command::Start));
        assert_eq!(Command::parse("  /info now "), Some(Command::Info));
    }

    #[test]
    fn test_parse_rejects_unknown_and_plain_text() {
        assert_eq!(Command::parse("/help"), None);
        assert_eq!(Command::parse("never gonna give you up"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_update_deserialize() {
        let json = r#"{
            "update_id": 42,
            "message": {
                "message_id": 7,
                "chat": {"id": 1001, "type": "private"},
                "text": "hello"
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        assert_eq!(update.update_id, 42);
        let message = update.message.unwrap();
        assert_eq!(message.message_id, 7);
        assert_eq!(message.chat.id, 1001);
        assert_eq!(message.text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_update_without_message() {
        let update: Update = serde_json::from_str(r#"{"update_id": 1}"#).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_envelope_error_shape() {
        let envelope: ApiEnvelope<Vec<Update>> =
            serde_json::from_str(r#"{"ok": false, "description": "Unauthorized"}"#).unwrap();
        assert!(!envelope.ok);
        assert!(envelope.result.is_none());
        assert_eq!(envelope.description.as_deref(), Some("Unauthorized"));
    }
}
