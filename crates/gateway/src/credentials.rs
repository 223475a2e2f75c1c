use secrecy::{ExposeSecret, SecretString};

/// Username and password as typed by the user.
#[derive(Debug)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    /// Wraps raw credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// The username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The raw password, for sealing only.
    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }

    pub(crate) fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.expose_password().is_empty()
    }
}

/// Turns credentials into the opaque payload the authority's login endpoint accepts.
///
/// Encryption schemes live behind this trait; the gateway only forwards the sealed
/// string as `{"encrypted": "..."}`.
pub trait CredentialSealer: Send + Sync {
    /// Seals the credentials.
    fn seal(&self, credentials: &Credentials) -> anyhow::Result<String>;
}

/// Seals credentials as plain JSON text, without encryption.
///
/// Only suitable for authorities that accept unencrypted payloads, such as local
/// development setups and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextSealer;

impl CredentialSealer for PlaintextSealer {
    fn seal(&self, credentials: &Credentials) -> anyhow::Result<String> {
        let payload = serde_json::json!({
            "username": credentials.username(),
            "password": credentials.expose_password(),
        });

        Ok(serde_json::to_string(&payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{CredentialSealer, Credentials, PlaintextSealer};

    #[test]
    fn completeness() {
        assert!(Credentials::new("alice", "secret").is_complete());
        assert!(!Credentials::new("", "secret").is_complete());
        assert!(!Credentials::new("alice", "").is_complete());
    }

    #[test]
    fn debug_hides_the_password() {
        let rendered = format!("{:?}", Credentials::new("alice", "hunter2"));

        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn plaintext_payload() {
        let sealed = PlaintextSealer.seal(&Credentials::new("alice", "hunter2")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&sealed).unwrap();

        insta::assert_json_snapshot!(value, @r#"
        {
          "password": "hunter2",
          "username": "alice"
        }
        "#);
    }
}
