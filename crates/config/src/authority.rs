//! Identity authority configuration.

use std::{borrow::Cow, time::Duration};

use duration_str::deserialize_duration;
use serde::Deserialize;
use url::Url;

/// Where the identity authority lives and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorityConfig {
    /// Base URL of the identity authority.
    pub url: Url,
    /// Per-request timeout.
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    /// Endpoint paths relative to `url`.
    pub endpoints: AuthorityEndpoints,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:8000").expect("static URL is valid"),
            timeout: Duration::from_secs(10),
            endpoints: AuthorityEndpoints::default(),
        }
    }
}

/// Endpoint paths of the identity authority.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorityEndpoints {
    /// Credential exchange.
    pub login: Cow<'static, str>,
    /// Role toggle, authenticated with the current bearer token.
    pub toggle_role: Cow<'static, str>,
    /// Health probe.
    pub health: Cow<'static, str>,
    /// Details of the authenticated caller.
    pub user_details: Cow<'static, str>,
}

impl Default for AuthorityEndpoints {
    fn default() -> Self {
        Self {
            login: Cow::Borrowed("/auth/login"),
            toggle_role: Cow::Borrowed("/auth/toggle-role"),
            health: Cow::Borrowed("/health"),
            user_details: Cow::Borrowed("/get_user_details"),
        }
    }
}
