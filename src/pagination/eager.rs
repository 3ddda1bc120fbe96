//! Eager pagination: fetch every page before returning.

use super::models::FIRST_PAGE;
use super::source::PageSource;
use crate::api::ApiError;

/// Fetches all pages of `query` and returns their items in page order.
pub async fn fetch_all<S>(source: &S, query: &S::Query) -> Result<Vec<S::Item>, ApiError>
where
    S: PageSource,
{
    fetch_all_map(source, query, |item| item).await
}

/// Like [`fetch_all`], applying `map` to each item as it arrives.
///
/// Pages are requested one after another. Accumulation stops at the last
/// page, at the first empty page, or at a malformed response. Transport and
/// status failures are returned; items gathered so far are dropped.
pub async fn fetch_all_map<S, F, U>(
    source: &S,
    query: &S::Query,
    mut map: F,
) -> Result<Vec<U>, ApiError>
where
    S: PageSource,
    F: FnMut(S::Item) -> U,
{
    if !source.is_ready(query) {
        tracing::debug!(?query, "Skipping fetch, required filter missing");
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut page = FIRST_PAGE;
    loop {
        let result = match source.fetch_page(query, page).await {
            Ok(result) => result,
            Err(e) if e.is_malformed() => {
                tracing::warn!(?query, page, "Treating malformed page as end of list: {}", e);
                break;
            }
            Err(e) => return Err(e),
        };

        // `page` guards against a server that never advances `currentPage`.
        let last = !result.has_next_page() || page >= result.total_page;
        items.extend(result.items.into_iter().map(&mut map));
        if last {
            break;
        }
        page += 1;
    }

    tracing::debug!(?query, pages = page, items = items.len(), "Fetched full list");
    Ok(items)
}
