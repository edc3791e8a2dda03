//! Group membership (`groups.json`).
//!
//! Maps each of the five recognized group keys to a list of indicator names.
//! Unknown keys are ignored and absent keys yield empty groups.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use crate::domain::Group;
use crate::error::{AppError, join_sorted};

/// Validated, disjoint group membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupMembership {
    members: BTreeMap<Group, BTreeSet<String>>,
    index: HashMap<String, Group>,
}

impl GroupMembership {
    /// Build from raw lists, failing if a name appears in more than one group.
    pub fn from_lists<I, S>(lists: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (Group, Vec<S>)>,
        S: Into<String>,
    {
        let mut members: BTreeMap<Group, BTreeSet<String>> = BTreeMap::new();
        for (group, names) in lists {
            members
                .entry(group)
                .or_default()
                .extend(names.into_iter().map(Into::into));
        }

        let mut index = HashMap::new();
        let mut duplicates = BTreeSet::new();
        for (group, names) in &members {
            for name in names {
                if index.insert(name.clone(), *group).is_some() {
                    duplicates.insert(name.clone());
                }
            }
        }
        if !duplicates.is_empty() {
            return Err(AppError::config(format!(
                "Duplicate M names across groups: {}",
                join_sorted(&duplicates)
            )));
        }

        Ok(Self { members, index })
    }

    pub fn group_of(&self, indicator: &str) -> Option<Group> {
        self.index.get(indicator).copied()
    }

    pub fn members(&self, group: Group) -> impl Iterator<Item = &str> {
        self.members
            .get(&group)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }

    /// Every indicator assigned to any group.
    pub fn all_members(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

pub fn load_groups(path: &Path) -> Result<GroupMembership, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::config(format!("Failed to read groups '{}': {e}", path.display())))?;
    parse_groups(&text)
}

pub fn parse_groups(text: &str) -> Result<GroupMembership, AppError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| AppError::config(format!("Invalid groups JSON: {e}")))?;
    let Some(object) = value.as_object() else {
        return Err(AppError::config("Groups must be a JSON object."));
    };

    let mut lists = Vec::new();
    for group in Group::ALL {
        let Some(raw) = object.get(group.config_key()) else {
            continue;
        };
        let names: Vec<String> = serde_json::from_value(raw.clone()).map_err(|e| {
            AppError::config(format!(
                "Group `{}` must be a list of indicator names: {e}",
                group.config_key()
            ))
        })?;
        lists.push((group, names));
    }

    GroupMembership::from_lists(lists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_unknown_keys_are_tolerated() {
        let groups = parse_groups(
            r#"{"group_min_percent": ["M1", "M2", "M1"], "group_rates": ["M21"], "group_other": [1, 2]}"#,
        )
        .unwrap();
        assert_eq!(groups.group_of("M1"), Some(Group::MinPercent));
        assert_eq!(groups.group_of("M21"), Some(Group::Rates));
        assert_eq!(groups.group_of("M99"), None);
        assert_eq!(groups.members(Group::Cpi).count(), 0);
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn duplicates_across_groups_are_fatal() {
        let err = parse_groups(
            r#"{"group_min_percent": ["M1", "M2", "M3"], "group_max_change": ["M2", "M1"], "group_cpi": ["M3"]}"#,
        )
        .unwrap_err();
        assert_eq!(err.message(), "Duplicate M names across groups: M1, M2, M3");
    }

    #[test]
    fn non_list_group_is_rejected() {
        let err = parse_groups(r#"{"group_cpi": "M20"}"#).unwrap_err();
        assert!(err.message().contains("group_cpi"), "{err}");
    }
}
