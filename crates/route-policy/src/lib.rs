//! Role-based route authorization.
//!
//! A [`RoutePolicy`] is built once from the configured route table and never changes
//! afterwards, so it can be shared between any number of readers without locking.
//!
//! Paths that are not in the table are reachable by every authenticated session. This
//! default-allow behavior is intentional and covered by tests; protect a path by adding
//! it to the table.

#![deny(missing_docs)]

use std::collections::HashMap;

use config::{Role, RouteRule};

/// Immutable route-to-roles table with lookup by path.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
    by_path: HashMap<String, usize>,
}

/// Whether a role may follow a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    /// The route can be followed.
    Granted,
    /// The route is visible but locked, with an explanation for display.
    Denied(String),
}

/// One line of a rendered navigation menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry<'a> {
    /// The route this entry points to.
    pub rule: &'a RouteRule,
    /// The access decision for the role the menu was rendered for.
    pub access: RouteAccess,
}

impl RoutePolicy {
    /// Builds a policy from a route table, rejecting duplicate paths and empty allow-lists.
    pub fn new(rules: Vec<RouteRule>) -> anyhow::Result<Self> {
        config::validate_routes(&rules)?;

        let by_path = rules
            .iter()
            .enumerate()
            .map(|(index, rule)| (rule.path.clone(), index))
            .collect();

        log::debug!("Route policy built with {} protected routes", rules.len());

        Ok(Self { rules, by_path })
    }

    /// The configured rules, in declaration order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Looks up the rule protecting `path`, if any.
    pub fn rule(&self, path: &str) -> Option<&RouteRule> {
        self.by_path.get(path).map(|&index| &self.rules[index])
    }

    /// Decides whether `role` may access `path`.
    ///
    /// Without a session (`None`) nothing is accessible. With a session, unregistered
    /// paths are accessible and registered paths require the role on their allow-list.
    pub fn is_allowed(&self, role: Option<Role>, path: &str) -> bool {
        let Some(role) = role else {
            return false;
        };

        match self.rule(path) {
            Some(rule) => rule.allows(role),
            None => true,
        }
    }

    /// Every configured route `role` may access, in declaration order.
    pub fn accessible_routes(&self, role: Option<Role>) -> Vec<&RouteRule> {
        let Some(role) = role else {
            return Vec::new();
        };

        self.rules.iter().filter(|rule| rule.allows(role)).collect()
    }

    /// Every configured route with the access decision for `role`, in declaration order.
    pub fn menu(&self, role: Option<Role>) -> Vec<MenuEntry<'_>> {
        self.rules
            .iter()
            .map(|rule| {
                let access = if self.is_allowed(role, &rule.path) {
                    RouteAccess::Granted
                } else {
                    RouteAccess::Denied(self.describe_denial(&rule.path, role))
                };

                MenuEntry { rule, access }
            })
            .collect()
    }

    /// Explains, for display, why `role` can or cannot reach `path`.
    pub fn describe_denial(&self, path: &str, role: Option<Role>) -> String {
        let rule = self.rule(path);

        match (rule, role) {
            (Some(rule), None) => format!(
                "{} requires a signed-in session (requires: {})",
                rule.label,
                join_roles(&rule.allowed_roles)
            ),
            (None, None) => format!("{path} requires a signed-in session"),
            (Some(rule), Some(role)) if !rule.allows(role) => format!(
                "{} is not available to role '{role}' (requires: {})",
                rule.label,
                join_roles(&rule.allowed_roles)
            ),
            (Some(rule), Some(role)) => format!("{} is available to role '{role}'", rule.label),
            (None, Some(_)) => format!("{path} is not a protected route"),
        }
    }
}

fn join_roles(roles: &[Role]) -> String {
    roles.iter().map(Role::as_ref).collect::<Vec<_>>().join(", ")
}
