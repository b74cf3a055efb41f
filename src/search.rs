use std::time::Duration;

use anyhow::{bail, Context};
use itertools::Itertools;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use tap::Pipe;

pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";

const VIDEO_KIND: &str = "youtube#video";

/// A video returned for an artist query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub video_id: String,
    pub title: String,
}

/// Remote text search over videos.
pub trait VideoSearch {
    /// Videos matching `query`, best ranked first, at most `max_results` of them.
    fn search(&self, query: &str, max_results: u32) -> anyhow::Result<Vec<Candidate>>;
}

/// Client for the YouTube Data API `search.list` endpoint, ranked by view count.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    endpoint: Url,
    key: String,
}

impl YouTubeClient {
    pub fn new(key: impl Into<String>, endpoint: Url) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Http client build failed")?;

        Ok(Self {
            client,
            endpoint,
            key: key.into(),
        })
    }
}

impl VideoSearch for YouTubeClient {
    fn search(&self, query: &str, max_results: u32) -> anyhow::Result<Vec<Candidate>> {
        let max_results = max_results.to_string();
        let resp = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("part", "id,snippet"),
                ("q", query),
                ("maxResults", max_results.as_str()),
                ("order", "viewCount"),
                ("safeSearch", "none"),
                ("key", self.key.as_str()),
            ])
            .send()
            // the url carries the developer key
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("search request for {:?} failed", query))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            bail!("search for {:?} returned {}: {}", query, status, message.trim());
        }

        resp.json::<SearchListResponse>()
            .map_err(reqwest::Error::without_url)
            .context("malformed search response")?
            .pipe(SearchListResponse::into_candidates)
            .pipe(Ok)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: ResourceId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    kind: String,
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl SearchListResponse {
    /// Video results in API order, first occurrence of each id kept.
    pub(crate) fn into_candidates(self) -> Vec<Candidate> {
        self.items
            .into_iter()
            .filter(|item| item.id.kind == VIDEO_KIND)
            .filter_map(|item| {
                Some(Candidate {
                    video_id: item.id.video_id?,
                    title: unescape_html(&item.snippet?.title),
                })
            })
            .unique_by(|c| c.video_id.clone())
            .collect()
    }
}

/// Decodes the handful of entities the API escapes in snippet titles.
fn unescape_html(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
