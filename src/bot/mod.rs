//! Bot Module
//!
//! Chat transport plumbing: the Telegram Bot API client, wire types, and
//! the long-poll dispatcher that feeds the pipeline.

pub mod api;
pub mod dispatcher;
pub mod types;

pub use api::{BotApi, TransportError};
pub use dispatcher::Dispatcher;
pub use types::{Command, Update};
