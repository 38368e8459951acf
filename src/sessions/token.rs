//! Session token minting, hashing and cookie signing.
//!
//! The raw token only ever travels to the client. Stores key bindings by the
//! SHA-256 digest of the token, and the cookie value carries an HMAC-SHA256
//! signature made with the configured session secret: `<token>.<signature>`.

use anyhow::{anyhow, Context, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{digest::InvalidLength, Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::fmt;

const TOKEN_BYTES: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Opaque session identifier held by the client.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a new identifier from the OS RNG.
    ///
    /// # Errors
    /// Returns an error if the OS RNG is unavailable.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .context("failed to generate session token")?;
        Ok(Self(Base64UrlUnpadded::encode_string(&bytes)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key for this session; the raw value never reaches a store.
    #[must_use]
    pub fn digest(&self) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        hasher.finalize().to_vec()
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(***)")
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Produce the cookie value `<token>.<signature>`.
///
/// # Errors
/// Returns an error if the HMAC key cannot be initialised.
pub fn sign(session_id: &SessionId, secret: &[u8]) -> Result<String> {
    let signature = mac(secret, session_id.as_str())
        .map_err(|_| anyhow!("invalid session secret"))?
        .finalize()
        .into_bytes();
    Ok(format!(
        "{}.{}",
        session_id.as_str(),
        Base64UrlUnpadded::encode_string(&signature)
    ))
}

/// Recover the session id from a signed cookie value.
///
/// Returns `None` for unsigned, malformed or tampered values.
#[must_use]
pub fn unsign(value: &str, secret: &[u8]) -> Option<SessionId> {
    let (token, signature) = value.trim().rsplit_once('.')?;
    if token.is_empty() {
        return None;
    }
    let expected = Base64UrlUnpadded::decode_vec(signature).ok()?;
    mac(secret, token).ok()?.verify_slice(&expected).ok()?;
    Some(SessionId(token.to_string()))
}

fn mac(secret: &[u8], token: &str) -> Result<HmacSha256, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret)?;
    mac.update(token.as_bytes());
    Ok(mac)
}
