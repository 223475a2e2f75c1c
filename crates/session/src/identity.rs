use config::Role;
use jiff::Timestamp;

use crate::AccessToken;

/// The signed-in user, as produced by one successful credential exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Opaque user identifier assigned by the authority.
    pub subject_id: String,
    /// Name shown in the interface.
    pub display_name: String,
    /// Contact address, empty when the authority has none.
    pub email: String,
    /// Role the current token was issued for.
    pub role: Role,
    /// Bearer credential for calls to the authority.
    pub access_token: AccessToken,
    /// When the token was issued, if known.
    pub issued_at: Option<Timestamp>,
    /// When the token stops being valid, if known.
    pub expires_at: Option<Timestamp>,
}

impl Identity {
    /// Whether the token has expired at `now`. Identities without an expiry never expire.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// A copy of this identity carrying a different role and token.
    pub fn with_role_and_token(&self, role: Role, access_token: AccessToken) -> Self {
        Self {
            role,
            access_token,
            ..self.clone()
        }
    }
}
