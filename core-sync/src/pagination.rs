//! Bounded continuation-token pagination over change feeds.

use crate::error::{Result, SyncError};
use crate::wire::FeedResponse;
use std::future::Future;
use tracing::debug;

/// Drain a paginated feed into one `Vec`, following continuation tokens.
///
/// `fetch` is called with `None` for the first page, then with each
/// `nextPageToken` until a page comes back without one. The loop is bounded
/// by `max_pages`; a feed still producing tokens past the bound yields
/// [`SyncError::PageLimitExceeded`] rather than spinning forever on a
/// misbehaving server.
pub async fn consume_pages<T, F, Fut>(mut fetch: F, max_pages: usize) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<FeedResponse<T>>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;

    for page in 0..max_pages {
        let response = fetch(token.take()).await?;
        let next = response.next_page_token.clone();
        let page_items = response.into_items();
        debug!(page, count = page_items.len(), "consumed feed page");
        items.extend(page_items);

        match next {
            Some(t) if !t.is_empty() => token = Some(t),
            _ => return Ok(items),
        }
    }

    Err(SyncError::PageLimitExceeded { limit: max_pages })
}
