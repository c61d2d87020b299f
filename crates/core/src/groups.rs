#![forbid(unsafe_code)]

use crate::MANAGED_PREFIX;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSpec {
    pub name: String,
    pub description: String,
}

impl GroupSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GroupCatalogError {
    #[error("group name must not be empty")]
    Empty,
    #[error("group name must not contain '[' or ']' (name={0})")]
    ContainsBracket(String),
    #[error("group name contains control characters (name={0})")]
    ContainsControl(String),
    #[error("duplicate group name (name={0})")]
    Duplicate(String),
}

/// The groups managed records are sorted into.
///
/// Names are validated on construction so that a tag's first bracketed segment can
/// equal at most one of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupCatalog {
    groups: Vec<GroupSpec>,
}

impl GroupCatalog {
    pub fn try_new(groups: Vec<GroupSpec>) -> Result<Self, GroupCatalogError> {
        let mut seen = BTreeSet::new();
        for group in &groups {
            validate_group_name(&group.name)?;
            if !seen.insert(group.name.as_str()) {
                return Err(GroupCatalogError::Duplicate(group.name.clone()));
            }
        }
        Ok(Self { groups })
    }

    pub fn well_known() -> Self {
        Self {
            groups: vec![
                GroupSpec::new("tick", "Safe, least likely to interfere with browsing"),
                GroupSpec::new("std", "Standard"),
                GroupSpec::new("cross", "Dangerous, false postives, deprecated, biased"),
            ],
        }
    }

    pub fn groups(&self) -> &[GroupSpec] {
        &self.groups
    }

    pub fn get(&self, name: &str) -> Option<&GroupSpec> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// Returns the group whose name equals the tag's first bracketed segment.
    ///
    /// The comparison is exact and case-sensitive: `[Tick]` or `[sticky]` match no
    /// group. Pi-hole setups that mapped groups with `LIKE '[' || name || '%'` grouped
    /// such tags case-insensitively by prefix; here they stay ungrouped.
    pub fn classify(&self, tag: &str) -> Option<&GroupSpec> {
        let segment = first_segment(tag)?;
        self.get(segment)
    }
}

impl Default for GroupCatalog {
    fn default() -> Self {
        Self::well_known()
    }
}

fn first_segment(tag: &str) -> Option<&str> {
    let rest = tag.strip_prefix(MANAGED_PREFIX)?;
    let end = rest.find(']')?;
    Some(&rest[..end])
}

fn validate_group_name(name: &str) -> Result<(), GroupCatalogError> {
    if name.is_empty() {
        return Err(GroupCatalogError::Empty);
    }
    if name.contains('[') || name.contains(']') {
        return Err(GroupCatalogError::ContainsBracket(name.to_string()));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(GroupCatalogError::ContainsControl(name.to_string()));
    }
    Ok(())
}
