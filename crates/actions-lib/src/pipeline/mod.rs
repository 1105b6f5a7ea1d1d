//! Fetch, expand and correlate pipeline
//!
//! Actions and pod groups are retrieved concurrently, each pod group is
//! expanded into its containers with bounded concurrency, and every expanded
//! group is joined with the action set. Groups without pending actions are
//! dropped from the result.

mod actions;
mod expand;
mod groups;

#[cfg(test)]
mod tests;

pub use actions::{default_action_filter, retrieve_actions};
pub use expand::{expand_group, expand_groups};
pub use groups::{retrieve_groups, GroupFilter};

use crate::api::MonitoringApi;
use crate::bounded::DEFAULT_CONCURRENCY;
use crate::correlate::{correlate, ActionIndex};
use crate::models::{CorrelatedRecord, SearchQuery};
use crate::paginate::Paginator;
use anyhow::Result;
use serde_json::Value;
use tracing::info;

/// Inputs for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Request body selecting which actions to retrieve
    pub action_filter: Value,
    /// Search parameters selecting the pod groups
    pub search_query: SearchQuery,
    /// Pod groups whose display name contains any of these are dropped
    pub group_filter: GroupFilter,
    /// Maximum simultaneous supply-chain lookups
    pub concurrency: usize,
    pub paginator: Paginator,
}

impl PipelineOptions {
    pub fn new(search_query: SearchQuery, excluded_groups: Vec<String>) -> Self {
        Self {
            action_filter: default_action_filter(),
            search_query,
            group_filter: GroupFilter::new(excluded_groups),
            concurrency: DEFAULT_CONCURRENCY,
            paginator: Paginator::default(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Run the whole pipeline, returning one record per group with pending actions
pub async fn collect_container_actions<A>(
    api: &A,
    options: &PipelineOptions,
) -> Result<Vec<CorrelatedRecord>>
where
    A: MonitoringApi + ?Sized,
{
    let (actions, groups) = futures::try_join!(
        retrieve_actions(api, &options.paginator, &options.action_filter),
        retrieve_groups(
            api,
            &options.paginator,
            &options.search_query,
            &options.group_filter
        ),
    )?;

    let expanded = expand_groups(api, groups, options.concurrency).await?;
    let expanded_count = expanded.len();

    let index = ActionIndex::new(&actions);
    let records: Vec<CorrelatedRecord> = expanded
        .into_iter()
        .map(|group| correlate(group, &index))
        .filter(|record| !record.actions.is_empty())
        .collect();

    info!(
        actions = actions.len(),
        groups = expanded_count,
        records = records.len(),
        "Correlated actions with pod groups"
    );

    Ok(records)
}
