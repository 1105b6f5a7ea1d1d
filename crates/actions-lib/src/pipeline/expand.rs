use crate::api::MonitoringApi;
use crate::bounded::fetch_bounded;
use crate::models::{Container, ExpandedGroup, Group, CONTAINER_SPEC};
use crate::workload::WorkloadName;
use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Decode a pod group's display name and resolve its containers.
///
/// Returns `Ok(None)` when the display name is not `<Type>/<namespace>/<name>`;
/// such groups are skipped with a warning rather than failing the run.
/// A supply-chain response without container instances yields a group with
/// no containers.
pub async fn expand_group<A>(api: &A, group: Group) -> Result<Option<ExpandedGroup>>
where
    A: MonitoringApi + ?Sized,
{
    let workload = match WorkloadName::parse(&group.display_name) {
        Ok(workload) => workload,
        Err(e) => {
            warn!(
                group_uuid = %group.uuid,
                display_name = %group.display_name,
                error = %e,
                "Skipping pod group with undecodable display name"
            );
            return Ok(None);
        }
    };

    let container_members = containers_of(api, &group.member_uuid_list)
        .await
        .context("Error getting containers from pod from Turbonomic")?;
    debug!(
        group_uuid = %group.uuid,
        workload = %workload,
        containers = container_members.len(),
        "Expanded pod group"
    );

    Ok(Some(ExpandedGroup {
        cluster: group.cluster().map(str::to_string),
        group_uuid: group.uuid,
        resource_type: workload.resource_type,
        resource_name: workload.name,
        resource_namespace: workload.namespace,
        container_members,
    }))
}

/// Expand every group with at most `concurrency` lookups in flight
pub async fn expand_groups<A>(
    api: &A,
    groups: Vec<Group>,
    concurrency: usize,
) -> Result<Vec<ExpandedGroup>>
where
    A: MonitoringApi + ?Sized,
{
    let expanded = fetch_bounded(concurrency, groups, |group| expand_group(api, group)).await?;
    Ok(expanded.into_iter().flatten().collect())
}

async fn containers_of<A>(api: &A, member_uuids: &[String]) -> Result<Vec<Container>>
where
    A: MonitoringApi + ?Sized,
{
    if member_uuids.is_empty() {
        return Ok(Vec::new());
    }

    let chain = api.supply_chain(CONTAINER_SPEC, member_uuids).await?;
    Ok(chain.containers(CONTAINER_SPEC))
}
