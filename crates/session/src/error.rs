/// Errors returned by session stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A partial update was requested while nobody is signed in.
    #[error("No active session")]
    NoActiveSession,

    /// A conditional update found a different session than the one it was made for.
    #[error("The session changed while the request was in flight")]
    SessionChanged,
}
