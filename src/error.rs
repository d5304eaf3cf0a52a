//! Error types for the track pipeline
//!
//! Provides unified error handling using thiserror. Every per-request failure
//! is converted into exactly one user-visible reply at the dispatcher boundary.

use thiserror::Error;

// == Pipeline Error Enum ==
/// Unified error type for a single track request.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Query was empty or whitespace-only after normalization
    #[error("empty query")]
    EmptyQuery,

    /// Search completed but returned zero candidates
    #[error("no candidate found for query")]
    NotFound,

    /// Search could not be performed (transport or API failure)
    #[error("search unavailable: {0}")]
    SearchUnavailable(String),

    /// Every extraction strategy failed
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// Produced artifact exceeds the configured size limit
    #[error("artifact is {size} bytes, limit is {limit}")]
    Oversize { size: u64, limit: u64 },

    /// Outbound send to the chat transport failed
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Filesystem error while committing or inspecting an artifact
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    // == User Message ==
    /// Maps a terminal pipeline state to the single reply the requester sees.
    ///
    /// Search outages are reported distinctly from "not found" so an API
    /// failure does not masquerade as a missing track. Oversize rejections
    /// name the size and the limit.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::EmptyQuery => "Enter a track name.".to_string(),
            PipelineError::NotFound => {
                "Couldn't find that track. Try a different title.".to_string()
            }
            PipelineError::SearchUnavailable(_) => {
                "Search is temporarily unavailable. Try again in a minute.".to_string()
            }
            PipelineError::FetchFailed(_) => {
                "Couldn't download that track. Try another one.".to_string()
            }
            PipelineError::Oversize { size, limit } => format!(
                "That track is {:.1} MB, over the {:.0} MB limit, so it can't be sent.",
                *size as f64 / (1024.0 * 1024.0),
                *limit as f64 / (1024.0 * 1024.0),
            ),
            PipelineError::Delivery(_) | PipelineError::Io(_) => {
                "Something went wrong while sending the track. Try again.".to_string()
            }
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the pipeline.
pub type Result<T> = std::result::Result<T, PipelineError>;
