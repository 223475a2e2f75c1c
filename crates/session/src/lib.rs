//! The authenticated identity of the running client and where it is kept.
//!
//! An [`Identity`] is either fully present or absent. Stores hand out immutable
//! snapshots, so a reader never observes a role from one exchange paired with a token
//! from another.

#![deny(missing_docs)]

mod error;
mod identity;
mod store;
mod token;

pub use config::Role;
pub use error::SessionError;
pub use identity::Identity;
pub use store::{InMemorySessionStore, SessionStore};
pub use token::AccessToken;
