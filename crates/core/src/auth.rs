//! Login credential check.

use secrecy::{ExposeSecret, SecretString};

/// The single username/password pair a session may log in with.
///
/// Loaded once at startup and read-only afterwards. The password is kept as a
/// `SecretString` so it is redacted from `Debug` output.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Checks submitted login values against the configured [`Credentials`].
#[derive(Debug, Clone)]
pub struct Authenticator {
    credentials: Credentials,
}

impl Authenticator {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Returns true iff both values match exactly. No trimming, case-sensitive.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        username == self.credentials.username
            && password == self.credentials.password.expose_secret()
    }
}
