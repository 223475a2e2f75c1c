use session::SessionError;

/// Failures of an exchange with the identity authority.
///
/// Messages are safe to show to end users: none of them tells an unknown username
/// apart from a wrong password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Empty input, or the authority refused the credentials.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// A role toggle was attempted without a signed-in session, or the session it was
    /// requested for was replaced before the answer arrived.
    #[error("No active session")]
    NoActiveSession,

    /// The authority could not be reached or answered with a non-success status.
    #[error("The identity authority is unavailable")]
    TransportFailure,

    /// The authority answered with success but the payload lacks required fields.
    #[error("The identity authority returned an unexpected response")]
    MalformedResponse,
}

impl From<SessionError> for AuthError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NoActiveSession | SessionError::SessionChanged => AuthError::NoActiveSession,
        }
    }
}
