//! Pagination walker and issue search paging.
//!
//! [`collect_all`] drives a page fetcher until the listing is exhausted. A
//! failing page, a cursor that does not move, or too many pages end the walk
//! with a [`PaginationError`] that still carries the items gathered so far;
//! callers must treat it as a failure rather than a complete listing.

use std::fmt;
use std::future::Future;

use atladmin_types::{Operation, Page, SearchCursor, StepError, StepRequest};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::executor::StepExecutor;

/// Upper bound on pages fetched by one walk.
pub const MAX_PAGES: usize = 1000;

/// Why a pagination walk ended early.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaginationFailure {
    #[error(transparent)]
    Fetch(StepError),
    #[error("search stopped after {0} pages without reaching the end")]
    PageLimit(usize),
    #[error("search cursor did not advance after page {0}")]
    StalledCursor(usize),
}

/// Terminal pagination error with the items collected before it occurred.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{failure}")]
pub struct PaginationError<T> {
    #[source]
    pub failure: PaginationFailure,
    pub collected: Vec<T>,
    pub pages_fetched: usize,
}

/// Fetch pages starting at `initial` until one reports no next cursor.
///
/// Items are concatenated in page order. A page with no items also ends the
/// walk.
pub async fn collect_all<T, C, F, Fut>(initial: C, mut fetch_page: F) -> Result<Vec<T>, PaginationError<T>>
where
    C: Clone + PartialEq + fmt::Debug,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<Page<T, C>, StepError>>,
{
    let mut collected = Vec::new();
    let mut cursor = initial;
    let mut pages_fetched = 0usize;

    loop {
        if pages_fetched >= MAX_PAGES {
            warn!(pages_fetched, "pagination page limit reached");
            return Err(PaginationError {
                failure: PaginationFailure::PageLimit(MAX_PAGES),
                collected,
                pages_fetched,
            });
        }

        let page = match fetch_page(cursor.clone()).await {
            Ok(page) => page,
            Err(error) => {
                warn!(pages_fetched, cursor = ?cursor, error = %error, "page fetch failed");
                return Err(PaginationError {
                    failure: PaginationFailure::Fetch(error),
                    collected,
                    pages_fetched,
                });
            }
        };
        pages_fetched += 1;

        let Page { items, next } = page;
        let page_was_empty = items.is_empty();
        collected.extend(items);

        match next {
            None => break,
            Some(_) if page_was_empty => break,
            Some(next) if next == cursor => {
                warn!(pages_fetched, cursor = ?cursor, "pagination cursor did not advance");
                return Err(PaginationError {
                    failure: PaginationFailure::StalledCursor(pages_fetched),
                    collected,
                    pages_fetched,
                });
            }
            Some(next) => cursor = next,
        }
    }

    debug!(pages_fetched, items = collected.len(), "pagination exhausted");
    Ok(collected)
}

/// Collect the keys of every issue matched by `jql`.
pub async fn search_issue_keys(
    executor: &StepExecutor,
    jql: &str,
    page_size: u32,
) -> Result<Vec<String>, PaginationError<String>> {
    collect_all(SearchCursor::Offset(0), move |cursor| {
        let request = StepRequest::new(Operation::SearchIssues {
            jql: jql.to_string(),
            cursor: Some(cursor.clone()),
            page_size,
        });
        async move {
            let payload = executor.execute(&request).await.into_result()?;
            parse_search_page(&payload, &cursor)
        }
    })
    .await
}

/// Parse one issue search response into a page of issue keys.
///
/// The next cursor is `nextPageToken` when present and `isLast` is not true;
/// otherwise offset paging continues while `startAt + len` is below `total`.
pub fn parse_search_page(payload: &Value, cursor: &SearchCursor) -> Result<Page<String, SearchCursor>, StepError> {
    let issues = payload
        .get("issues")
        .and_then(Value::as_array)
        .ok_or_else(|| StepError::transport("malformed search response: missing 'issues' array"))?;

    let keys = issues
        .iter()
        .map(|issue| {
            issue
                .get("key")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| StepError::transport("malformed search response: issue without 'key'"))
        })
        .collect::<Result<Vec<String>, StepError>>()?;

    let is_last = payload.get("isLast").and_then(Value::as_bool).unwrap_or(false);
    let next_token = payload
        .get("nextPageToken")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty());

    let next = match (next_token, cursor) {
        (_, _) if is_last || keys.is_empty() => None,
        (Some(token), _) => Some(SearchCursor::Token(token.to_string())),
        (None, SearchCursor::Offset(start_at)) => {
            let following = start_at + keys.len() as u64;
            let total = payload.get("total").and_then(Value::as_u64).unwrap_or(0);
            (following < total).then_some(SearchCursor::Offset(following))
        }
        (None, SearchCursor::Token(_)) => None,
    };

    Ok(Page { items: keys, next })
}
