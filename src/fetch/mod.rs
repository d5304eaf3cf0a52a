//! Fetch Module
//!
//! Turns a resolved candidate source into a local transcoded audio file via
//! an ordered chain of extraction strategies.

mod engine;
mod strategy;

pub use engine::{AudioFetcher, FetchError, FetchedAudio, StrategyError, YtDlpFetcher};
pub use strategy::{ExtractionStrategy, DEFAULT_STRATEGIES};
