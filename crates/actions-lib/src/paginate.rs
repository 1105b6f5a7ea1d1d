//! Cursor-based pagination over the Turbonomic REST API
//!
//! Turbonomic returns the first page of a collection together with two
//! headers: `x-next-cursor` (offset of the next page, absent or empty when
//! the collection is complete) and `x-total-record-count`. The remaining
//! pages are fetched concurrently and merged with the first one.

use anyhow::Result;
use futures::stream::{FuturesUnordered, TryStreamExt};
use std::future::Future;
use thiserror::Error;
use tracing::debug;

/// Number of records Turbonomic returns per page
pub const TURBO_PAGE_SIZE: u64 = 500;

/// Header carrying the offset of the next page
pub const NEXT_CURSOR_HEADER: &str = "x-next-cursor";

/// Header carrying the total size of the collection
pub const TOTAL_RECORD_COUNT_HEADER: &str = "x-total-record-count";

/// Malformed pagination headers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageHeaderError {
    #[error("invalid {header} header: {value:?}")]
    Invalid { header: &'static str, value: String },

    #[error("x-total-record-count header missing while x-next-cursor is {cursor}")]
    MissingTotal { cursor: u64 },
}

/// Pagination state reported alongside a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageInfo {
    /// No further pages
    Complete,
    /// More records remain starting at `cursor`, out of `total`
    More { cursor: u64, total: u64 },
}

impl PageInfo {
    /// Decode the raw `x-next-cursor` and `x-total-record-count` values
    pub fn from_header_values(
        next_cursor: Option<&str>,
        total_records: Option<&str>,
    ) -> Result<Self, PageHeaderError> {
        let next_cursor = next_cursor.map(str::trim).unwrap_or_default();
        if next_cursor.is_empty() {
            return Ok(PageInfo::Complete);
        }

        let cursor = parse_count(NEXT_CURSOR_HEADER, next_cursor)?;
        let total = match total_records.map(str::trim) {
            Some(value) if !value.is_empty() => parse_count(TOTAL_RECORD_COUNT_HEADER, value)?,
            _ => return Err(PageHeaderError::MissingTotal { cursor }),
        };

        Ok(PageInfo::More { cursor, total })
    }
}

fn parse_count(header: &'static str, value: &str) -> Result<u64, PageHeaderError> {
    value.parse().map_err(|_| PageHeaderError::Invalid {
        header,
        value: value.to_string(),
    })
}

/// Reassembles a complete result set from a paginated endpoint
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: u64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(TURBO_PAGE_SIZE)
    }
}

impl Paginator {
    /// Create a paginator for the given page size (clamped to at least 1)
    pub fn new(page_size: u64) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Offsets of the pages still to fetch: `cursor, cursor + size, ...` below `total`
    pub fn remaining_offsets(&self, cursor: u64, total: u64) -> Vec<u64> {
        let remaining = total.saturating_sub(cursor);
        let requests = remaining.div_ceil(self.page_size);
        (0..requests).map(|i| cursor + i * self.page_size).collect()
    }

    /// Fetch every page after the first and append them to `first_page`.
    ///
    /// Pages are requested concurrently and appended in completion order.
    /// The first failing page aborts the whole collection.
    pub async fn collect<T, F, Fut>(
        &self,
        first_page: Vec<T>,
        info: PageInfo,
        fetch_page: F,
    ) -> Result<Vec<T>>
    where
        F: Fn(u64) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let PageInfo::More { cursor, total } = info else {
            return Ok(first_page);
        };

        let offsets = self.remaining_offsets(cursor, total);
        debug!(cursor, total, pages = offsets.len(), "Fetching remaining pages");

        let mut pending: FuturesUnordered<Fut> = offsets.into_iter().map(fetch_page).collect();
        let mut records = first_page;
        while let Some(page) = pending.try_next().await? {
            records.extend(page);
        }

        Ok(records)
    }
}
