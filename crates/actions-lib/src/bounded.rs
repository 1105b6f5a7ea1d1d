//! Bounded-concurrency fan-out
//!
//! Runs one async operation per input item with at most `limit` of them in
//! flight at any time, so a run never floods the Turbonomic API.

use anyhow::Result;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;

/// Default number of simultaneous per-group lookups
pub const DEFAULT_CONCURRENCY: usize = 25;

/// Apply `operation` to every item with at most `limit` invocations in flight.
///
/// Results are returned in completion order. The first error is returned and
/// the operations still in flight are dropped. A `limit` of 0 behaves as 1.
pub async fn fetch_bounded<I, F, Fut, R>(limit: usize, items: I, operation: F) -> Result<Vec<R>>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    stream::iter(items)
        .map(operation)
        .buffer_unordered(limit.max(1))
        .try_collect()
        .await
}
