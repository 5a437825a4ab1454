//! YouTube Data API v3 search client

use async_trait::async_trait;
use serde::Deserialize;

use super::CatalogSearch;
use crate::error::{Error, Result};
use crate::model::Track;

pub const YOUTUBE_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// Searches YouTube videos and maps them to tracks.
#[derive(Clone)]
pub struct YouTubeSearch {
    http: reqwest::Client,
    api_key: Option<String>,
    max_results: u32,
    base_url: String,
}

impl YouTubeSearch {
    pub fn new(api_key: Option<String>, max_results: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            max_results: max_results.clamp(1, 50),
            base_url: YOUTUBE_SEARCH_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (proxies, mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_url(&self, query: &str, api_key: &str) -> String {
        format!(
            "{}?part=snippet&type=video&maxResults={}&q={}&key={}",
            self.base_url,
            self.max_results,
            urlencoding::encode(query),
            urlencoding::encode(api_key),
        )
    }
}

#[async_trait]
impl CatalogSearch for YouTubeSearch {
    async fn search(&self, query: &str) -> Result<Vec<Track>> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(Error::search("no YouTube API key configured"));
        };

        crate::log_api_request!("search", query, max_results = self.max_results);

        let response = self
            .http
            .get(self.request_url(query, api_key))
            .send()
            .await
            .map_err(|e| Error::search(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::search(format!("YouTube returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::search(e.to_string()))?;
        parse_search_response(&body)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    video_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Deserialize, Default)]
struct Thumbnails {
    default: Option<Thumbnail>,
    high: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

impl Thumbnails {
    fn best_url(self) -> String {
        if let Some(high) = self.high {
            return high.url;
        }
        self.default
            .map(|t| t.url.replace("default.jpg", "hqdefault.jpg"))
            .unwrap_or_default()
    }
}

fn parse_search_response(body: &str) -> Result<Vec<Track>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| Error::search(format!("malformed search response: {e}")))?;

    Ok(response
        .items
        .into_iter()
        .filter_map(|item| {
            let id = item.id.video_id?;
            Some(Track {
                id,
                title: item.snippet.title,
                channel_title: item.snippet.channel_title,
                thumbnail_url: item.snippet.thumbnails.best_url(),
            })
        })
        .collect())
}
