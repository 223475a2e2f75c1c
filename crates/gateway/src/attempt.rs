use session::Identity;

use crate::{AuthGateway, AuthResult, Credentials};

/// Progress of a single login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// Created, not yet sent.
    Idle,
    /// Waiting for the identity authority.
    Submitting,
    /// The authority accepted the credentials.
    Succeeded,
    /// The attempt failed; start a new one to retry.
    Failed,
}

/// A login attempt that has not been submitted yet.
///
/// Submitting consumes the attempt, so a failed attempt can never be resumed.
#[derive(Debug)]
pub struct LoginAttempt<'a> {
    gateway: &'a AuthGateway,
    credentials: Credentials,
    state: LoginState,
}

impl<'a> LoginAttempt<'a> {
    pub(crate) fn new(gateway: &'a AuthGateway, credentials: Credentials) -> Self {
        Self {
            gateway,
            credentials,
            state: LoginState::Idle,
        }
    }

    /// Current state, always [`LoginState::Idle`] before submission.
    pub fn state(&self) -> LoginState {
        self.state
    }

    /// Sends the credentials and waits for the outcome.
    pub async fn submit(mut self) -> FinishedAttempt {
        self.transition(LoginState::Submitting);

        let result = self.gateway.exchange(&self.credentials).await;

        match result {
            Ok(_) => self.transition(LoginState::Succeeded),
            Err(ref error) => {
                log::debug!("Login for '{}' failed: {error}", self.credentials.username());
                self.transition(LoginState::Failed);
            }
        }

        FinishedAttempt {
            state: self.state,
            result,
        }
    }

    fn transition(&mut self, next: LoginState) {
        log::debug!("Login attempt {:?} -> {next:?}", self.state);
        self.state = next;
    }
}

/// A login attempt in a terminal state.
#[derive(Debug)]
pub struct FinishedAttempt {
    state: LoginState,
    result: AuthResult<Identity>,
}

impl FinishedAttempt {
    /// Either [`LoginState::Succeeded`] or [`LoginState::Failed`].
    pub fn state(&self) -> LoginState {
        self.state
    }

    /// The outcome, by reference.
    pub fn result(&self) -> &AuthResult<Identity> {
        &self.result
    }

    /// The outcome.
    pub fn into_result(self) -> AuthResult<Identity> {
        self.result
    }
}
