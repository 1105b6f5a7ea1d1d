//! Core data models for Turbonomic actions and pod groups

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Entity type whose instances are the containers of a pod group
pub const CONTAINER_SPEC: &str = "ContainerSpec";

/// Reference to another Turbonomic entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Risk metadata attached to an action or compound action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_commodity: Option<String>,
}

/// A pending remediation recommendation from the `Market` market
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<Risk>,
    #[serde(default)]
    pub compound_actions: Vec<CompoundAction>,
}

impl Action {
    /// UUID of the entity this action targets
    pub fn target_uuid(&self) -> Option<&str> {
        self.target.as_ref()?.uuid.as_deref()
    }

    /// Human-readable `"<subCategory>: <description>"` summary
    pub fn description(&self) -> String {
        let risk = self.risk.clone().unwrap_or_default();
        format!(
            "{}: {}",
            risk.sub_category.unwrap_or_default(),
            risk.description.unwrap_or_default()
        )
    }
}

/// One concrete recommended change within an action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<Risk>,
    #[serde(
        rename = "current_value",
        alias = "currentValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize_to_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_units: Option<String>,
}

/// A pod group as returned by the search endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub uuid: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<EntityRef>,
    #[serde(default)]
    pub member_uuid_list: Vec<String>,
}

impl Group {
    /// Display name of the cluster the group was discovered in
    pub fn cluster(&self) -> Option<&str> {
        self.source.as_ref()?.display_name.as_deref()
    }
}

/// A container belonging to a pod group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub uuid: String,
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// A pod group decoded into Kubernetes terms, with its containers resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedGroup {
    pub group_uuid: String,
    pub resource_type: String,
    pub resource_name: String,
    pub resource_namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    pub container_members: Vec<Container>,
}

/// A single compound action flattened onto the container it applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commodity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<Value>,
    #[serde(rename = "resizeToValue", skip_serializing_if = "Option::is_none")]
    pub resize_to_value: Option<Value>,
    #[serde(rename = "valueUnits", skip_serializing_if = "Option::is_none")]
    pub value_units: Option<String>,
}

impl From<&CompoundAction> for ActionDetail {
    fn from(compound: &CompoundAction) -> Self {
        Self {
            container_name: compound
                .target
                .as_ref()
                .and_then(|t| t.display_name.clone()),
            action_type: compound.action_type.clone(),
            commodity: compound
                .risk
                .as_ref()
                .and_then(|r| r.reason_commodity.clone()),
            current_value: compound.current_value.clone(),
            resize_to_value: compound.resize_to_value.clone(),
            value_units: compound.value_units.clone(),
        }
    }
}

/// Output unit: a pod group with the actions pending against its containers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedRecord {
    #[serde(flatten)]
    pub group: ExpandedGroup,
    #[serde(rename = "actionsDescription")]
    pub actions_description: String,
    pub actions: Vec<ActionDetail>,
}

/// Query parameters for the search endpoint, decoded from a JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchQuery(pub Map<String, Value>);

impl SearchQuery {
    /// Flatten into URL query pairs.
    ///
    /// Arrays repeat their key, strings are sent unquoted, `null` is dropped.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.0 {
            match value {
                Value::Array(items) => pairs.extend(
                    items
                        .iter()
                        .filter_map(query_text)
                        .map(|text| (key.clone(), text)),
                ),
                other => {
                    if let Some(text) = query_text(other) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
        }
        pairs
    }
}

fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Supply-chain response, keyed by entity type then by instance UUID
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyChain {
    #[serde(default)]
    pub se_map: Option<BTreeMap<String, Option<SupplyChainTier>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplyChainTier {
    #[serde(default)]
    pub instances: Option<BTreeMap<String, SupplyChainInstance>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyChainInstance {
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SupplyChain {
    /// Containers of the given entity type.
    ///
    /// A response without `seMap.<entity_type>.instances` yields an empty
    /// list: partial supply-chain coverage is an accepted outcome.
    pub fn containers(&self, entity_type: &str) -> Vec<Container> {
        let Some(instances) = self
            .se_map
            .as_ref()
            .and_then(|tiers| tiers.get(entity_type))
            .and_then(Option::as_ref)
            .and_then(|tier| tier.instances.as_ref())
        else {
            return Vec::new();
        };

        instances
            .iter()
            .map(|(uuid, instance)| Container {
                uuid: uuid.clone(),
                display_name: instance.display_name.clone(),
            })
            .collect()
    }
}
