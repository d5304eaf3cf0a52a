//! Pipeline Orchestrator
//!
//! Sequences one track request from raw query text to a deliverable
//! artifact: normalize, cache lookup, resolve, fetch, size gate, commit.
//! Every branch terminates in either a `TrackDelivery` or a `PipelineError`
//! that maps to exactly one user-visible reply.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::cache::{normalize, CacheStore, CachedArtifact};
use crate::error::{PipelineError, Result};
use crate::fetch::AudioFetcher;
use crate::search::SearchResolver;

// == Progress Reporter ==
/// Interim status notifications for a request in flight.
///
/// The chat adapter implements this to keep the requester informed between
/// suspension points; defaults are no-ops so tests and batch callers can
/// ignore progress entirely.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// The query missed the cache and a catalog search is starting.
    async fn searching(&self) {}
    /// A candidate was resolved and the download is starting.
    async fn downloading(&self, _title: &str) {}
}

/// Reporter that swallows all notifications.
pub struct NoProgress;

#[async_trait]
impl ProgressReporter for NoProgress {}

// == Track Delivery ==
/// Successful terminal state: an artifact ready to send.
#[derive(Debug)]
pub struct TrackDelivery {
    /// The committed (or cache-hit) artifact
    pub artifact: CachedArtifact,
    /// Title for the caption, from the resolved candidate or the artifact
    pub title: String,
    /// Uploader tag, known only on the fresh-fetch path
    pub uploader: Option<String>,
    /// Whether the artifact came straight from the cache
    pub from_cache: bool,
}

// == Pipeline ==
/// Per-request orchestrator over the cache store, search resolver, and
/// fetch engine.
pub struct Pipeline {
    cache: Arc<CacheStore>,
    resolver: Arc<dyn SearchResolver>,
    fetcher: Arc<dyn AudioFetcher>,
    max_artifact_bytes: u64,
}

impl Pipeline {
    // == Constructor ==
    pub fn new(
        cache: Arc<CacheStore>,
        resolver: Arc<dyn SearchResolver>,
        fetcher: Arc<dyn AudioFetcher>,
        max_artifact_bytes: u64,
    ) -> Self {
        Self {
            cache,
            resolver,
            fetcher,
            max_artifact_bytes,
        }
    }

    /// The cache store this pipeline writes into.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    // == Handle Query ==
    /// Runs one request to a terminal state.
    ///
    /// A cache hit returns immediately with no network calls. On a miss the
    /// query is resolved, fetched through the strategy chain, size-gated,
    /// and committed into the cache before delivery. Oversize output is
    /// discarded without being committed.
    pub async fn handle_query(
        &self,
        raw: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<TrackDelivery> {
        if normalize(raw).is_empty() {
            return Err(PipelineError::EmptyQuery);
        }

        let key = self.cache.key_for(raw);
        if let Some(artifact) = self.cache.lookup(&key) {
            info!(key = %key, "cache hit, serving existing artifact");
            return Ok(TrackDelivery {
                title: artifact.display_name.clone(),
                uploader: None,
                from_cache: true,
                artifact,
            });
        }

        progress.searching().await;
        let candidate = match self.resolver.resolve(raw).await {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return Err(PipelineError::NotFound),
            Err(err) => {
                warn!(error = %err, "search failed, reporting outage to requester");
                return Err(PipelineError::SearchUnavailable(err.to_string()));
            }
        };
        info!(title = %candidate.title, uploader = %candidate.uploader, "candidate resolved");

        progress.downloading(&candidate.title).await;
        let fetched = self
            .fetcher
            .fetch(&candidate)
            .await
            .map_err(|err| PipelineError::FetchFailed(err.to_string()))?;

        let size = fetched.size_bytes()?;
        if size > self.max_artifact_bytes {
            warn!(
                size,
                limit = self.max_artifact_bytes,
                title = %candidate.title,
                "oversize artifact discarded before commit"
            );
            return Err(PipelineError::Oversize {
                size,
                limit: self.max_artifact_bytes,
            });
        }

        let artifact = self.cache.commit(&key, &fetched.path, &candidate.title)?;
        info!(key = %key, size, "artifact committed and ready for delivery");
        Ok(TrackDelivery {
            title: candidate.title,
            uploader: Some(candidate.uploader),
            from_cache: false,
            artifact,
        })
    }
}
