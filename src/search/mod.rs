//! Search Module
//!
//! Query-to-candidate resolution against the remote catalog, with local
//! ranking of the returned candidates.

mod resolver;
mod types;

pub use resolver::{rank, CandidateSource, SearchError, SearchResolver, YouTubeResolver};
pub use types::parse_iso8601_duration;
