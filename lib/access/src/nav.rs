//! Role-based filtering of the console's navigation tree.
//!
//! Sections and their items carry independent requirements. There is no
//! inheritance: an item is shown only when its section is shown *and* its
//! own requirement is met.

use crate::identity::Identity;
use crate::role::RoleRequirement;
use serde::{Deserialize, Serialize};

/// A leaf navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub label: String,
    pub path: String,
    #[serde(default)]
    pub requirement: RoleRequirement,
}

impl NavItem {
    /// Creates an item with the given requirement.
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        path: impl Into<String>,
        requirement: impl Into<RoleRequirement>,
    ) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            requirement: requirement.into(),
        }
    }
}

/// A navigation section grouping related items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavSection {
    pub label: String,
    #[serde(default)]
    pub requirement: RoleRequirement,
    #[serde(default)]
    pub items: Vec<NavItem>,
}

impl NavSection {
    /// Creates an empty section with the given requirement.
    #[must_use]
    pub fn new(label: impl Into<String>, requirement: impl Into<RoleRequirement>) -> Self {
        Self {
            label: label.into(),
            requirement: requirement.into(),
            items: Vec::new(),
        }
    }

    /// Appends an item.
    #[must_use]
    pub fn item(mut self, item: NavItem) -> Self {
        self.items.push(item);
        self
    }
}

/// Returns the sections and items visible to `identity`, in original order.
///
/// Without an identity nothing is visible.
#[must_use]
pub fn visible_navigation(sections: &[NavSection], identity: Option<&Identity>) -> Vec<NavSection> {
    let Some(identity) = identity else {
        return Vec::new();
    };

    sections
        .iter()
        .filter(|section| identity.has_role(&section.requirement))
        .map(|section| NavSection {
            label: section.label.clone(),
            requirement: section.requirement.clone(),
            items: section
                .items
                .iter()
                .filter(|item| identity.has_role(&item.requirement))
                .cloned()
                .collect(),
        })
        .collect()
}
