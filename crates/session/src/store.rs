use std::sync::Arc;

use arc_swap::ArcSwapOption;
use config::Role;

use crate::{AccessToken, Identity, SessionError};

/// Holds the identity of the current session.
///
/// Implementations must publish every change as a whole: a reader sees either the
/// identity before a write or the one after it, never a mix.
pub trait SessionStore: Send + Sync {
    /// A snapshot of the current identity, if anyone is signed in.
    fn current(&self) -> Option<Arc<Identity>>;

    /// Installs a new identity, discarding any previous one.
    fn replace(&self, identity: Identity);

    /// Swaps the role and token of the current identity, leaving the rest untouched.
    ///
    /// Fails with [`SessionError::NoActiveSession`] when nobody is signed in; the store
    /// stays empty in that case.
    fn update_role_and_token(&self, role: Role, access_token: AccessToken) -> Result<Arc<Identity>, SessionError>;

    /// Like [`SessionStore::update_role_and_token`], but only while the stored token is
    /// still `expected`.
    ///
    /// Fails with [`SessionError::SessionChanged`] and leaves the store untouched when a
    /// newer login, toggle or sign-out replaced the identity in the meantime.
    fn update_role_and_token_if(
        &self,
        expected: &AccessToken,
        role: Role,
        access_token: AccessToken,
    ) -> Result<Arc<Identity>, SessionError>;

    /// Removes the identity. Clearing an empty store is a no-op.
    fn clear(&self);
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn current(&self) -> Option<Arc<Identity>> {
        (**self).current()
    }

    fn replace(&self, identity: Identity) {
        (**self).replace(identity)
    }

    fn update_role_and_token(&self, role: Role, access_token: AccessToken) -> Result<Arc<Identity>, SessionError> {
        (**self).update_role_and_token(role, access_token)
    }

    fn update_role_and_token_if(
        &self,
        expected: &AccessToken,
        role: Role,
        access_token: AccessToken,
    ) -> Result<Arc<Identity>, SessionError> {
        (**self).update_role_and_token_if(expected, role, access_token)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

/// Process-local store backed by an atomically swapped pointer.
///
/// Reads never block, and writes replace the whole identity in one step.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    current: ArcSwapOption<Identity>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn current(&self) -> Option<Arc<Identity>> {
        self.current.load_full()
    }

    fn replace(&self, identity: Identity) {
        log::debug!("Session established for subject '{}' with role '{}'", identity.subject_id, identity.role);
        self.current.store(Some(Arc::new(identity)));
    }

    fn update_role_and_token(&self, role: Role, access_token: AccessToken) -> Result<Arc<Identity>, SessionError> {
        let mut updated = None;

        self.current.rcu(|current| {
            updated = current
                .as_ref()
                .map(|identity| Arc::new(identity.with_role_and_token(role, access_token.clone())));

            updated.clone()
        });

        let identity = updated.ok_or(SessionError::NoActiveSession)?;
        log::debug!("Session for subject '{}' switched to role '{}'", identity.subject_id, identity.role);

        Ok(identity)
    }

    fn update_role_and_token_if(
        &self,
        expected: &AccessToken,
        role: Role,
        access_token: AccessToken,
    ) -> Result<Arc<Identity>, SessionError> {
        let mut outcome = Err(SessionError::NoActiveSession);

        self.current.rcu(|current| match current {
            Some(identity) if identity.access_token == *expected => {
                let updated = Arc::new(identity.with_role_and_token(role, access_token.clone()));
                outcome = Ok(updated.clone());

                Some(updated)
            }
            Some(identity) => {
                outcome = Err(SessionError::SessionChanged);
                Some(identity.clone())
            }
            None => {
                outcome = Err(SessionError::NoActiveSession);
                None
            }
        });

        let identity = outcome?;
        log::debug!("Session for subject '{}' switched to role '{}'", identity.subject_id, identity.role);

        Ok(identity)
    }

    fn clear(&self) {
        if let Some(previous) = self.current.swap(None) {
            log::debug!("Session for subject '{}' cleared", previous.subject_id);
        }
    }
}
