//! Response bodies of the identity authority.

use config::Role;
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub access_token: SecretString,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: LoginUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginUser {
    pub id: SubjectId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// User ids arrive as strings from some authorities and as integers from others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SubjectId {
    Text(String),
    Number(i64),
}

impl SubjectId {
    pub fn into_string(self) -> String {
        match self {
            SubjectId::Text(id) => id,
            SubjectId::Number(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleRoleResponse {
    pub access_token: SecretString,
    pub user: ToggledUser,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggledUser {
    pub role: Role,
}
