//! Client side of the identity authority: credential exchange, role toggling and the
//! advisory health and user-detail probes.
//!
//! Nothing here writes to a session store. Callers receive typed results and decide
//! what to keep.

#![deny(missing_docs)]

mod attempt;
mod credentials;
mod error;
mod gateway;
mod probe;
mod wire;

pub use attempt::{FinishedAttempt, LoginAttempt, LoginState};
pub use credentials::{CredentialSealer, Credentials, PlaintextSealer};
pub use error::AuthError;
pub use gateway::{AuthGateway, RoleGrant};
pub use probe::{HealthStatus, UserDetails};

/// Outcome of an exchange with the identity authority.
pub type AuthResult<T> = std::result::Result<T, AuthError>;
