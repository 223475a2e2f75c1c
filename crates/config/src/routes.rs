//! Protected route configuration.

use serde::Deserialize;

use crate::Role;

/// A protected route and the roles permitted to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteRule {
    /// Application path, unique across the table.
    pub path: String,
    /// Display name for menus.
    pub label: String,
    /// Roles granted access. Never empty.
    pub allowed_roles: Vec<Role>,
    /// Optional human-readable description.
    #[serde(default)]
    pub description: Option<String>,
}

impl RouteRule {
    /// Creates a rule without a description.
    pub fn new(path: impl Into<String>, label: impl Into<String>, allowed_roles: impl Into<Vec<Role>>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            allowed_roles: allowed_roles.into(),
            description: None,
        }
    }

    /// Attaches a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether `role` is on this route's allow-list.
    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }
}
