//! Correlation of pending actions with expanded pod groups

use crate::models::{Action, ActionDetail, CorrelatedRecord, ExpandedGroup};
use std::collections::HashMap;

/// Actions grouped by target entity UUID, keeping their original order
#[derive(Debug, Default)]
pub struct ActionIndex<'a> {
    by_target: HashMap<&'a str, Vec<&'a Action>>,
}

impl<'a> ActionIndex<'a> {
    pub fn new(actions: &'a [Action]) -> Self {
        let mut by_target: HashMap<&str, Vec<&Action>> = HashMap::new();
        for action in actions {
            if let Some(target) = action.target_uuid() {
                by_target.entry(target).or_default().push(action);
            }
        }
        Self { by_target }
    }

    /// Actions whose target UUID equals `uuid` exactly
    pub fn targeting(&self, uuid: &str) -> &[&'a Action] {
        self.by_target.get(uuid).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_target.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }
}

/// Join a group's containers with the actions targeting them.
///
/// Details follow member order, then action order, then compound-action order.
/// The description is that of the last action contributing a detail.
pub fn correlate(group: ExpandedGroup, index: &ActionIndex<'_>) -> CorrelatedRecord {
    let mut actions_description = String::new();
    let mut details = Vec::new();

    for container in &group.container_members {
        for action in index.targeting(&container.uuid) {
            for compound in &action.compound_actions {
                details.push(ActionDetail::from(compound));
                actions_description = action.description();
            }
        }
    }

    CorrelatedRecord {
        group,
        actions_description,
        actions: details,
    }
}

/// Correlate a single group against an unindexed action list
pub fn correlate_actions(group: ExpandedGroup, actions: &[Action]) -> CorrelatedRecord {
    correlate(group, &ActionIndex::new(actions))
}
