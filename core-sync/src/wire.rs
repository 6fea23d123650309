//! Request and response shapes for the service's JSON protocol.

use serde::{Deserialize, Serialize};

/// Endpoint paths, relative to the API base URL.
pub const PLAYLISTS_FEED: &str = "playlists";
pub const ENTRIES_FEED: &str = "plentries";
pub const PLAYLIST_BATCH: &str = "playlistbatch";
pub const ENTRY_BATCH: &str = "plentriesbatch";

/// One page of a change feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedResponse<T> {
    #[serde(default = "Option::default")]
    pub data: Option<FeedData<T>>,
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,
}

/// The item container inside a feed page. Pages past the end of the feed
/// omit it entirely.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedData<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> FeedResponse<T> {
    /// Consume the page, yielding its items (empty when `data` is absent).
    pub fn into_items(self) -> Vec<T> {
        self.data.map(|d| d.items).unwrap_or_default()
    }
}

/// Body of a mutation batch POST.
#[derive(Debug, Serialize)]
pub struct MutateRequest<'a, M> {
    pub mutations: &'a [M],
}

/// Body of a mutation batch response.
///
/// Per-mutation results are kept as raw JSON; a 2xx status is what signals
/// acceptance of the batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutateResponse {
    #[serde(default)]
    pub mutate_response: Vec<serde_json::Value>,
}

impl MutateResponse {
    /// The response for a batch that was never sent (empty input).
    pub fn empty() -> Self {
        Self::default()
    }
}
