//! Search Resolver Module
//!
//! Resolves a free-text query to a single ranked candidate source via the
//! YouTube Data API, then ranks candidates locally by popularity and
//! closeness to a typical track length.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::search::types::{parse_iso8601_duration, SearchListResponse, VideosListResponse};

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Track length the ranking favors, in seconds. Long uploads score lower the
/// further they sit from this point, which demotes mixes and compilations.
const TYPICAL_TRACK_SECS: f64 = 180.0;

// == Candidate Source ==
/// A single resolved search result, before fetching.
#[derive(Debug, Clone)]
pub struct CandidateSource {
    /// Source video id
    pub video_id: String,
    /// Upload title as reported by the catalog
    pub title: String,
    /// Uploader / channel name
    pub uploader: String,
    /// Watch URL handed to the fetch engine
    pub url: String,
    /// Reported duration in seconds (0 when unknown)
    pub duration_secs: u64,
    /// Popularity signal: the reported view count (0 when unknown)
    pub popularity: u64,
}

// == Search Error ==
/// Failure to perform a search, distinct from "zero results".
#[derive(Error, Debug)]
pub enum SearchError {
    /// Network-level failure reaching the search API
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The search API answered with a non-success status
    #[error("search API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
}

// == Resolver Trait ==
/// Resolves a query to at most one candidate source.
///
/// `Ok(None)` means the catalog had no match; `Err` means the search could
/// not be performed at all. Callers surface the two differently.
#[async_trait]
pub trait SearchResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<Option<CandidateSource>, SearchError>;
}

// == YouTube Resolver ==
/// Catalog search backed by the YouTube Data API v3.
pub struct YouTubeResolver {
    http: Client,
    api_key: Option<String>,
    max_results: u8,
}

impl YouTubeResolver {
    /// Creates a resolver sharing the given HTTP client.
    ///
    /// Without an API key every query resolves to zero results; the bot
    /// stays up but search is degraded.
    pub fn new(http: Client, api_key: Option<String>, max_results: u8) -> Self {
        Self {
            http,
            api_key,
            max_results: max_results.max(1),
        }
    }

    /// Fetches duration and view count for the candidate ids.
    async fn video_details(
        &self,
        api_key: &str,
        ids: &[String],
    ) -> Result<VideosListResponse, SearchError> {
        let response = self
            .http
            .get(VIDEOS_URL)
            .query(&[
                ("part", "contentDetails,statistics".to_string()),
                ("id", ids.join(",")),
                ("key", api_key.to_string()),
            ])
            .send()
            .await?;
        check_status(response).await?.json().await.map_err(Into::into)
    }
}

#[async_trait]
impl SearchResolver for YouTubeResolver {
    async fn resolve(&self, query: &str) -> Result<Option<CandidateSource>, SearchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("no search API key configured, query resolves to zero results");
            return Ok(None);
        };

        let response = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("part", "snippet".to_string()),
                ("q", query.to_string()),
                ("key", api_key.to_string()),
                ("maxResults", self.max_results.to_string()),
                ("type", "video".to_string()),
            ])
            .send()
            .await?;
        let search: SearchListResponse = check_status(response).await?.json().await?;

        let mut candidates: Vec<CandidateSource> = search
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(CandidateSource {
                    url: format!("https://www.youtube.com/watch?v={video_id}"),
                    video_id,
                    title: item.snippet.title,
                    uploader: item.snippet.channel_title,
                    duration_secs: 0,
                    popularity: 0,
                })
            })
            .collect();

        if candidates.is_empty() {
            return Ok(None);
        }

        // Second call fills in the ranking signals; snippet data alone has
        // neither duration nor view count.
        let ids: Vec<String> = candidates.iter().map(|c| c.video_id.clone()).collect();
        let details = self.video_details(api_key, &ids).await?;
        for item in details.items {
            if let Some(candidate) = candidates.iter_mut().find(|c| c.video_id == item.id) {
                candidate.duration_secs = item
                    .content_details
                    .as_ref()
                    .and_then(|d| parse_iso8601_duration(&d.duration))
                    .unwrap_or(0);
                candidate.popularity = item
                    .statistics
                    .as_ref()
                    .and_then(|s| s.view_count.as_deref())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
            }
        }

        let best = rank(candidates);
        if let Some(candidate) = &best {
            debug!(
                title = %candidate.title,
                uploader = %candidate.uploader,
                duration_secs = candidate.duration_secs,
                "query resolved"
            );
        }
        Ok(best)
    }
}

// == Ranking ==
/// Picks the highest-scoring candidate.
///
/// Score is the popularity signal minus the distance from the typical track
/// length, so among comparably popular uploads the one closest to a normal
/// single wins over hour-long mixes.
pub fn rank(candidates: Vec<CandidateSource>) -> Option<CandidateSource> {
    candidates.into_iter().max_by(|a, b| {
        score(a)
            .partial_cmp(&score(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

fn score(candidate: &CandidateSource) -> f64 {
    candidate.popularity as f64 - (candidate.duration_secs as f64 - TYPICAL_TRACK_SECS).abs()
}

/// Converts a non-success HTTP response into `SearchError::Api`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SearchError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(SearchError::Api { status, body })
}
