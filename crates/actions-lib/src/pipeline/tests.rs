//! Pipeline tests against an in-memory Turbonomic
//!
//! These tests exercise retrieval, expansion and correlation without a
//! network by implementing `MonitoringApi` over fixed pages.

use super::*;
use crate::api::{async_trait, Page};
use crate::models::{Action, Group, SupplyChain};
use crate::paginate::PageInfo;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Fixed-response implementation of the monitoring API
#[derive(Default)]
struct FakeApi {
    action_pages: HashMap<Option<u64>, Page<Action>>,
    search_pages: HashMap<Option<u64>, Page<Group>>,
    /// container uuid -> display name
    containers: HashMap<String, String>,
    /// uuids whose supply-chain lookup fails
    broken_members: Vec<String>,
    lookup_delay: Option<Duration>,
    action_cursors: Mutex<Vec<Option<u64>>>,
    search_cursors: Mutex<Vec<Option<u64>>>,
    lookups: Mutex<Vec<Vec<String>>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeApi {
    fn with_actions(mut self, cursor: Option<u64>, page: Page<Action>) -> Self {
        self.action_pages.insert(cursor, page);
        self
    }

    fn with_groups(mut self, cursor: Option<u64>, page: Page<Group>) -> Self {
        self.search_pages.insert(cursor, page);
        self
    }

    fn with_container(mut self, uuid: &str, display_name: &str) -> Self {
        self.containers
            .insert(uuid.to_string(), display_name.to_string());
        self
    }

    fn lookups(&self) -> Vec<Vec<String>> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl MonitoringApi for FakeApi {
    async fn actions_page(&self, _filter: &Value, cursor: Option<u64>) -> Result<Page<Action>> {
        self.action_cursors.lock().unwrap().push(cursor);
        self.action_pages
            .get(&cursor)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no action page at cursor {:?}", cursor))
    }

    async fn search_page(&self, _query: &SearchQuery, cursor: Option<u64>) -> Result<Page<Group>> {
        self.search_cursors.lock().unwrap().push(cursor);
        self.search_pages
            .get(&cursor)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no search page at cursor {:?}", cursor))
    }

    async fn supply_chain(&self, entity_type: &str, uuids: &[String]) -> Result<SupplyChain> {
        self.lookups.lock().unwrap().push(uuids.to_vec());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if uuids.iter().any(|u| self.broken_members.contains(u)) {
            anyhow::bail!("API error (500 Internal Server Error): supply chain unavailable");
        }

        let instances: serde_json::Map<String, Value> = uuids
            .iter()
            .filter_map(|uuid| {
                self.containers
                    .get(uuid)
                    .map(|name| (uuid.clone(), json!({ "displayName": name })))
            })
            .collect();
        if instances.is_empty() {
            return Ok(SupplyChain::default());
        }

        Ok(serde_json::from_value(json!({
            "seMap": { entity_type: { "instances": instances } }
        }))?)
    }
}

fn group(uuid: &str, display_name: &str, members: &[&str]) -> Group {
    serde_json::from_value(json!({
        "uuid": uuid,
        "displayName": display_name,
        "source": { "displayName": "cluster1" },
        "memberUuidList": members,
    }))
    .unwrap()
}

fn resize_action(target: &str, container_name: &str, commodities: &[&str]) -> Action {
    let compounds: Vec<Value> = commodities
        .iter()
        .map(|commodity| {
            json!({
                "actionType": "RESIZE",
                "target": { "displayName": container_name },
                "risk": {
                    "reasonCommodity": commodity,
                    "subCategory": "Performance",
                    "description": format!("Resize up {} for {}", commodity, container_name)
                },
                "current_value": 1,
                "resizeToValue": 2,
                "valueUnits": "vCPU"
            })
        })
        .collect();

    serde_json::from_value(json!({
        "target": { "uuid": target },
        "risk": {
            "subCategory": "Performance",
            "description": format!("Underprovisioned {}", container_name)
        },
        "compoundActions": compounds,
    }))
    .unwrap()
}

fn options() -> PipelineOptions {
    PipelineOptions::new(SearchQuery::default(), Vec::new())
}

mod end_to_end_tests {
    use super::*;

    #[tokio::test]
    async fn test_single_group_single_action() {
        let api = FakeApi::default()
            .with_actions(
                None,
                Page::complete(vec![resize_action("c1", "container1", &["VCPU"])]),
            )
            .with_groups(
                None,
                Page::complete(vec![group("g1", "Deployment/ns1/app Pods", &["c1"])]),
            )
            .with_container("c1", "container1");

        let records = collect_container_actions(&api, &options()).await.unwrap();

        assert_eq!(records.len(), 1);
        let value = serde_json::to_value(&records).unwrap();
        assert_eq!(
            value,
            json!([{
                "group_uuid": "g1",
                "resource_type": "Deployment",
                "resource_name": "app",
                "resource_namespace": "ns1",
                "cluster": "cluster1",
                "container_members": [{ "uuid": "c1", "displayName": "container1" }],
                "actionsDescription": "Performance: Underprovisioned container1",
                "actions": [{
                    "container_name": "container1",
                    "action_type": "RESIZE",
                    "commodity": "VCPU",
                    "current_value": 1,
                    "resizeToValue": 2,
                    "valueUnits": "vCPU"
                }]
            }])
        );
    }

    #[tokio::test]
    async fn test_groups_without_actions_are_dropped() {
        let api = FakeApi::default()
            .with_actions(
                None,
                Page::complete(vec![resize_action("c1", "web", &["VCPU", "VMem"])]),
            )
            .with_groups(
                None,
                Page::complete(vec![
                    group("g1", "Deployment/shop/web Pods", &["c1"]),
                    group("g2", "Deployment/shop/worker Pods", &["c2"]),
                ]),
            )
            .with_container("c1", "web")
            .with_container("c2", "worker");

        let records = collect_container_actions(&api, &options()).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].group.group_uuid, "g1");
        assert_eq!(records[0].actions.len(), 2);
    }

    #[tokio::test]
    async fn test_actions_merged_across_pages() {
        let api = FakeApi::default()
            .with_actions(
                None,
                Page {
                    records: vec![resize_action("c1", "web", &["VCPU"])],
                    info: PageInfo::More {
                        cursor: 1,
                        total: 3,
                    },
                },
            )
            .with_actions(
                Some(1),
                Page::complete(vec![resize_action("c2", "worker", &["VMem"])]),
            )
            .with_actions(
                Some(2),
                Page::complete(vec![resize_action("c1", "web", &["VMem"])]),
            )
            .with_groups(
                None,
                Page::complete(vec![
                    group("g1", "Deployment/shop/web Pods", &["c1"]),
                    group("g2", "Deployment/shop/worker Pods", &["c2"]),
                ]),
            )
            .with_container("c1", "web")
            .with_container("c2", "worker");

        let mut opts = options();
        opts.paginator = Paginator::new(1);
        let mut records = collect_container_actions(&api, &opts).await.unwrap();
        records.sort_by(|a, b| a.group.group_uuid.cmp(&b.group.group_uuid));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].actions.len(), 2);
        assert_eq!(records[1].actions.len(), 1);

        let mut cursors = api.action_cursors.lock().unwrap().clone();
        cursors.sort();
        assert_eq!(cursors, vec![None, Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_action_page_failure_fails_run() {
        let api = FakeApi::default()
            .with_actions(
                None,
                Page {
                    records: vec![resize_action("c1", "web", &["VCPU"])],
                    info: PageInfo::More {
                        cursor: 500,
                        total: 900,
                    },
                },
            )
            .with_groups(None, Page::complete(Vec::new()));

        let err = collect_container_actions(&api, &options())
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.starts_with("Error retrieving actions from Turbonomic"));
        assert!(message.contains("no action page at cursor Some(500)"));
    }

    #[tokio::test]
    async fn test_search_failure_is_named() {
        let api = FakeApi::default().with_actions(None, Page::complete(Vec::new()));

        let err = collect_container_actions(&api, &options())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error retrieving search results from Turbonomic"
        );
    }
}

mod retrieval_tests {
    use super::*;

    #[tokio::test]
    async fn test_exclusion_applies_to_every_page() {
        let api = FakeApi::default()
            .with_groups(
                None,
                Page {
                    records: vec![
                        group("g1", "Deployment/shop/web Pods", &[]),
                        group("g2", "DaemonSet/kube-system/proxy Pods", &[]),
                    ],
                    info: PageInfo::More {
                        cursor: 2,
                        total: 4,
                    },
                },
            )
            .with_groups(
                Some(2),
                Page::complete(vec![
                    group("g3", "Deployment/kube-system/coredns Pods", &[]),
                    group("g4", "Deployment/shop/worker Pods", &[]),
                ]),
            );

        let filter = GroupFilter::new(vec!["kube-system".to_string()]);
        let mut groups = retrieve_groups(
            &api,
            &Paginator::new(2),
            &SearchQuery::default(),
            &filter,
        )
        .await
        .unwrap();
        groups.sort_by(|a, b| a.uuid.cmp(&b.uuid));

        let uuids: Vec<_> = groups.iter().map(|g| g.uuid.as_str()).collect();
        assert_eq!(uuids, vec!["g1", "g4"]);
    }

    #[tokio::test]
    async fn test_single_page_fetches_once() {
        let api = FakeApi::default().with_actions(
            None,
            Page::complete(vec![resize_action("c1", "web", &["VCPU"])]),
        );

        let actions = retrieve_actions(&api, &Paginator::default(), &default_action_filter())
            .await
            .unwrap();

        assert_eq!(actions.len(), 1);
        assert_eq!(*api.action_cursors.lock().unwrap(), vec![None]);
    }
}

mod expansion_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_supply_chain_yields_no_containers() {
        let api = FakeApi::default();

        let expanded = expand_group(&api, group("g1", "Deployment/ns1/app Pods", &["c9"]))
            .await
            .unwrap()
            .unwrap();

        assert!(expanded.container_members.is_empty());
        assert_eq!(api.lookups(), vec![vec!["c9".to_string()]]);
    }

    #[tokio::test]
    async fn test_undecodable_name_is_skipped() {
        let api = FakeApi::default().with_container("c1", "web");

        let expanded = expand_group(&api, group("g1", "web Pods", &["c1"]))
            .await
            .unwrap();

        assert!(expanded.is_none());
        assert!(api.lookups().is_empty());
    }

    #[tokio::test]
    async fn test_empty_member_list_skips_lookup() {
        let api = FakeApi::default();

        let expanded = expand_group(&api, group("g1", "Deployment/ns1/app Pods", &[]))
            .await
            .unwrap()
            .unwrap();

        assert!(expanded.container_members.is_empty());
        assert!(api.lookups().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_named() {
        let api = FakeApi {
            broken_members: vec!["c1".to_string()],
            ..Default::default()
        };

        let err = expand_group(&api, group("g1", "Deployment/ns1/app Pods", &["c1"]))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error getting containers from pod from Turbonomic"
        );
    }

    #[tokio::test]
    async fn test_expansion_respects_concurrency_limit() {
        let mut api = FakeApi {
            lookup_delay: Some(Duration::from_millis(2)),
            ..Default::default()
        };
        let groups: Vec<Group> = (0..30)
            .map(|i| {
                let member = format!("c{}", i);
                api.containers.insert(member.clone(), format!("container-{}", i));
                group(
                    &format!("g{}", i),
                    &format!("Deployment/ns/app-{} Pods", i),
                    &[member.as_str()],
                )
            })
            .collect();

        let expanded = expand_groups(&api, groups, 5).await.unwrap();

        assert_eq!(expanded.len(), 30);
        assert_eq!(api.lookups().len(), 30);
        assert!(api.peak_in_flight.load(Ordering::SeqCst) <= 5);
        assert!(expanded.iter().all(|g| g.container_members.len() == 1));
    }
}
