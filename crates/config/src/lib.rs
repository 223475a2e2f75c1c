//! Gatekeeper configuration structures to map the gatekeeper.toml configuration.

#![deny(missing_docs)]

mod authority;
mod loader;
mod role;
mod routes;

use std::path::Path;

pub use authority::{AuthorityConfig, AuthorityEndpoints};
pub use loader::validate_routes;
pub use role::Role;
pub use routes::RouteRule;
use serde::Deserialize;

/// Main configuration structure for the Gatekeeper client.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Location and endpoints of the identity authority.
    #[serde(default)]
    pub authority: AuthorityConfig,
    /// Protected routes, in declaration order.
    #[serde(default)]
    pub routes: Vec<RouteRule>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Validates the route table invariants.
    pub fn validate(&self) -> anyhow::Result<()> {
        loader::validate_routes(&self.routes)
    }
}
