//! Session-aware access to the identity authority and the route policy.
//!
//! [`AuthClient`] is the only writer of the session store: successful logins replace
//! the identity, role toggles swap its role and token, and sign-out or expiry clears
//! it. Failed exchanges leave the store as it was.

#![deny(missing_docs)]

use std::sync::Arc;

use config::{Config, Role, RouteRule};
use gateway::{AuthError, AuthGateway, AuthResult, HealthStatus, UserDetails};
use jiff::Timestamp;
use route_policy::{MenuEntry, RoutePolicy};
use session::{Identity, InMemorySessionStore, SessionStore};

/// Result of a successful role toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleToggle {
    /// The session as stored after the toggle.
    pub identity: Arc<Identity>,
    /// Confirmation text from the authority, if any.
    pub message: Option<String>,
}

/// Ties the gateway, the route policy and a session store together.
#[derive(Debug)]
pub struct AuthClient<S = InMemorySessionStore> {
    gateway: AuthGateway,
    policy: RoutePolicy,
    store: S,
}

impl AuthClient<InMemorySessionStore> {
    /// Builds a client with an empty in-memory session from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let gateway = AuthGateway::new(&config.authority)?;
        let policy = RoutePolicy::new(config.routes.clone())?;

        Ok(Self::new(gateway, policy, InMemorySessionStore::new()))
    }
}

impl<S: SessionStore> AuthClient<S> {
    /// Assembles a client from its parts.
    pub fn new(gateway: AuthGateway, policy: RoutePolicy, store: S) -> Self {
        Self { gateway, policy, store }
    }

    /// The session store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The route policy.
    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// The identity authority client.
    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    /// Logs in and, on success, installs the new identity in place of any previous one.
    pub async fn sign_in(&self, username: &str, password: &str) -> AuthResult<Identity> {
        let identity = self.gateway.login(username, password).await?;

        log::info!("Signed in as '{}' with role '{}'", identity.display_name, identity.role);
        self.store.replace(identity.clone());

        Ok(identity)
    }

    /// Asks the authority for the other role and swaps role and token in the session.
    ///
    /// On failure the session is left exactly as it was. The grant is only applied to
    /// the session it was requested for: if a sign-in or sign-out happened while the
    /// request was in flight, the grant is dropped with [`AuthError::NoActiveSession`].
    pub async fn toggle_role(&self) -> AuthResult<RoleToggle> {
        let current = self.session().ok_or(AuthError::NoActiveSession)?;
        let grant = self.gateway.toggle_role(&current.access_token).await?;

        let identity = self
            .store
            .update_role_and_token_if(&current.access_token, grant.role, grant.access_token)
            .inspect_err(|e| log::warn!("Dropping role grant for '{}': {e}", current.display_name))?;

        log::info!("Role switched from '{}' to '{}'", current.role, identity.role);

        Ok(RoleToggle {
            identity,
            message: grant.message,
        })
    }

    /// Clears the session.
    pub fn sign_out(&self) {
        self.store.clear();
    }

    /// The current identity, or `None` when nobody is signed in or the token expired.
    ///
    /// An expired session is cleared from the store.
    pub fn session(&self) -> Option<Arc<Identity>> {
        self.session_at(Timestamp::now())
    }

    fn session_at(&self, now: Timestamp) -> Option<Arc<Identity>> {
        let identity = self.store.current()?;

        if identity.is_expired_at(now) {
            log::info!("Session for '{}' expired, signing out", identity.display_name);
            self.store.clear();
            return None;
        }

        Some(identity)
    }

    /// Role of the current session.
    pub fn role(&self) -> Option<Role> {
        self.session().map(|identity| identity.role)
    }

    /// Whether the current session may access `path`.
    pub fn can_access(&self, path: &str) -> bool {
        self.policy.is_allowed(self.role(), path)
    }

    /// Routes visible to the current session, in table order.
    pub fn accessible_routes(&self) -> Vec<&RouteRule> {
        self.policy.accessible_routes(self.role())
    }

    /// Every route with the current session's access decision.
    pub fn menu(&self) -> Vec<MenuEntry<'_>> {
        self.policy.menu(self.role())
    }

    /// Explains whether the current session can reach `path`.
    pub fn describe_denial(&self, path: &str) -> String {
        self.policy.describe_denial(path, self.role())
    }

    /// Health of the authority, probed with the current token when signed in.
    pub async fn health(&self) -> HealthStatus {
        let session = self.session();
        self.gateway.health(session.as_ref().map(|identity| &identity.access_token)).await
    }

    /// Profile of the signed-in user as the authority sees it.
    pub async fn user_details(&self) -> UserDetails {
        let session = self.session();
        self.gateway
            .user_details(session.as_ref().map(|identity| &identity.access_token))
            .await
    }
}
