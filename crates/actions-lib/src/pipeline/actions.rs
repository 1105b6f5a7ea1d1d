use crate::api::MonitoringApi;
use crate::models::{Action, CONTAINER_SPEC};
use crate::paginate::{PageInfo, Paginator};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::debug;

/// Filter selecting the actions on container specs
pub fn default_action_filter() -> Value {
    json!({ "relatedEntityTypes": [CONTAINER_SPEC] })
}

/// Retrieve every action in the `Market` market matching `filter`
pub async fn retrieve_actions<A>(api: &A, paginator: &Paginator, filter: &Value) -> Result<Vec<Action>>
where
    A: MonitoringApi + ?Sized,
{
    fetch_all(api, paginator, filter)
        .await
        .context("Error retrieving actions from Turbonomic")
}

async fn fetch_all<A>(api: &A, paginator: &Paginator, filter: &Value) -> Result<Vec<Action>>
where
    A: MonitoringApi + ?Sized,
{
    let first = api.actions_page(filter, None).await?;
    if let PageInfo::More { total, .. } = first.info {
        debug!(total, "Total action record count");
    }

    let actions = paginator
        .collect(first.records, first.info, |cursor| async move {
            Ok::<_, anyhow::Error>(api.actions_page(filter, Some(cursor)).await?.records)
        })
        .await?;

    debug!(count = actions.len(), "Actions received");
    Ok(actions)
}
