//! Advisory endpoints whose failures degrade to sentinel values instead of errors.

use serde::{Deserialize, Serialize};

/// Health of the identity authority as reported by its health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"ok"` when healthy; [`HealthStatus::DEGRADED`] when the probe failed.
    pub status: String,
    /// Who the authority believes the caller is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticated_as: Option<String>,
    /// How the caller authenticated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
}

impl HealthStatus {
    /// Status reported when the authority cannot be reached or answers with an error.
    pub const DEGRADED: &'static str = "not okay";

    /// The sentinel returned in place of an error.
    pub fn degraded() -> Self {
        Self {
            status: Self::DEGRADED.to_string(),
            authenticated_as: None,
            auth_type: None,
        }
    }

    /// Whether this is the degraded sentinel.
    pub fn is_degraded(&self) -> bool {
        self.status == Self::DEGRADED
    }
}

/// Profile of the authenticated caller as known to the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    /// Subject or API client id.
    pub id: String,
    /// Username or API client name.
    pub username: String,
    /// Contact address, empty for API clients.
    #[serde(default)]
    pub email: String,
    /// Role of a user account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// `"user"` or `"api_client"`.
    #[serde(default)]
    pub auth_type: String,
    /// Name of the API client, when authenticated as one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
}

impl UserDetails {
    /// Username reported when the authority cannot provide details.
    pub const UNKNOWN_USER: &'static str = "no user information";

    /// The sentinel returned in place of an error.
    pub fn unavailable() -> Self {
        Self {
            id: String::new(),
            username: Self::UNKNOWN_USER.to_string(),
            email: String::new(),
            role: None,
            auth_type: String::new(),
            client_name: None,
        }
    }

    /// Whether this is the unavailable sentinel.
    pub fn is_unavailable(&self) -> bool {
        self.id.is_empty() && self.username == Self::UNKNOWN_USER
    }
}
