//! Search API wire types
//!
//! DTOs for the YouTube Data API v3 `search.list` and `videos.list`
//! responses, plus the ISO-8601 duration parsing those responses need.
//! Absent or empty `items` is a valid "not found" response, not an error.

use serde::Deserialize;

// == search.list ==

#[derive(Debug, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: SearchItemId,
    pub snippet: Snippet,
}

#[derive(Debug, Deserialize)]
pub struct SearchItemId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Snippet {
    pub title: String,
    #[serde(rename = "channelTitle", default)]
    pub channel_title: String,
}

// == videos.list ==

#[derive(Debug, Deserialize)]
pub struct VideosListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
pub struct VideoItem {
    pub id: String,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<ContentDetails>,
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
pub struct ContentDetails {
    /// ISO-8601 duration, e.g. "PT3M33S"
    #[serde(default)]
    pub duration: String,
}

#[derive(Debug, Deserialize)]
pub struct Statistics {
    /// The API serializes counters as strings
    #[serde(rename = "viewCount", default)]
    pub view_count: Option<String>,
}

// == Duration Parsing ==
/// Parses an ISO-8601 duration ("PT3M33S", "PT1H2M", "P1DT2H") into seconds.
///
/// Returns `None` for malformed input. "P0D" (used for live streams) parses
/// to zero seconds.
pub fn parse_iso8601_duration(text: &str) -> Option<u64> {
    let rest = text.strip_prefix('P')?;
    let mut seconds: u64 = 0;
    let mut number = String::new();
    let mut saw_component = false;

    for c in rest.chars() {
        match c {
            '0'..='9' => number.push(c),
            'T' => {
                if !number.is_empty() {
                    return None;
                }
            }
            'D' | 'H' | 'M' | 'S' => {
                let value: u64 = number.parse().ok()?;
                let unit = match c {
                    'D' => 86_400,
                    'H' => 3_600,
                    'M' => 60,
                    _ => 1,
                };
                seconds += value * unit;
                number.clear();
                saw_component = true;
            }
            _ => return None,
        }
    }

    if saw_component && number.is_empty() {
        Some(seconds)
    } else {
        None
    }
}
