use crate::api::MonitoringApi;
use crate::models::{Group, SearchQuery};
use crate::paginate::{PageInfo, Paginator};
use anyhow::{Context, Result};
use tracing::debug;

/// Excludes pod groups by display-name substring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFilter {
    excluded: Vec<String>,
}

impl GroupFilter {
    pub fn new(excluded: Vec<String>) -> Self {
        Self { excluded }
    }

    /// True when the group's display name contains none of the excluded substrings
    pub fn allows(&self, group: &Group) -> bool {
        !self
            .excluded
            .iter()
            .any(|pattern| group.display_name.contains(pattern.as_str()))
    }
}

/// Retrieve every pod group matching `query`, then drop the excluded ones.
///
/// Filtering happens once, after all pages have been merged.
pub async fn retrieve_groups<A>(
    api: &A,
    paginator: &Paginator,
    query: &SearchQuery,
    filter: &GroupFilter,
) -> Result<Vec<Group>>
where
    A: MonitoringApi + ?Sized,
{
    let groups = fetch_all(api, paginator, query)
        .await
        .context("Error retrieving search results from Turbonomic")?;

    let received = groups.len();
    let groups: Vec<Group> = groups.into_iter().filter(|g| filter.allows(g)).collect();
    debug!(
        received,
        filtered = groups.len(),
        "Received filtered search results"
    );

    Ok(groups)
}

async fn fetch_all<A>(api: &A, paginator: &Paginator, query: &SearchQuery) -> Result<Vec<Group>>
where
    A: MonitoringApi + ?Sized,
{
    let first = api.search_page(query, None).await?;
    if let PageInfo::More { total, .. } = first.info {
        debug!(total, "Total search record count");
    }

    paginator
        .collect(first.records, first.info, |cursor| async move {
            Ok::<_, anyhow::Error>(api.search_page(query, Some(cursor)).await?.records)
        })
        .await
}
