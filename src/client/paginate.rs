//! Pagination drain shared by every list-returning operation.
//!
//! GitHub paginates list endpoints; every caller here needs the same thing:
//! the complete collection. [`collect_all_pages`] owns that convergence loop
//! once, instead of each call site re-deriving it. The loop blocks until the
//! source is fully drained; callers needing bounded latency impose their
//! own timeout.

use std::future::Future;

use serde::Serialize;

/// Items requested per page (GitHub's maximum).
pub const PER_PAGE: usize = 100;

/// Query parameters for one page of a paginated endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct PageQuery {
    pub per_page: usize,
    pub page: u32,
}

impl PageQuery {
    pub(crate) fn new(page: u32) -> Self {
        PageQuery {
            per_page: PER_PAGE,
            page,
        }
    }
}

/// Drains a page-numbered source into one collection.
///
/// `fetch_page` is called with page numbers starting at 1 and must return
/// one full page of up to [`PER_PAGE`] items. Draining stops at the first
/// short page. Errors abort the drain and propagate unchanged.
pub async fn collect_all_pages<T, E, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let mut all = Vec::new();
    let mut page = 1;

    loop {
        let batch = fetch_page(page).await?;
        let drained = batch.len() < PER_PAGE;
        all.extend(batch);
        if drained {
            return Ok(all);
        }
        page += 1;
    }
}
