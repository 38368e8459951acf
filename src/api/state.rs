//! Cookie configuration shared by the handlers.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

pub const SESSION_COOKIE_NAME: &str = "authbasics_session";

#[derive(Clone)]
pub struct CookieConfig {
    secret: SecretString,
    secure: bool,
    max_age: Duration,
}

impl CookieConfig {
    #[must_use]
    pub fn new(secret: SecretString, max_age: Duration) -> Self {
        Self {
            secret,
            secure: false,
            max_age,
        }
    }

    /// Only mark cookies `Secure` when the site is served over HTTPS.
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn secure(&self) -> bool {
        self.secure
    }

    #[must_use]
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub(crate) fn secret(&self) -> &[u8] {
        self.secret.expose_secret().as_bytes()
    }
}

impl std::fmt::Debug for CookieConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieConfig")
            .field("secret", &"***")
            .field("secure", &self.secure)
            .field("max_age", &self.max_age)
            .finish()
    }
}
