//! Bearer credentials.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Opaque bearer token issued by the auth backend.
///
/// The token is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    secret: String,
}

impl AuthToken {
    /// Wrap a raw token. Returns `None` for a blank token.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();

        if secret.trim().is_empty() {
            return None;
        }

        Some(Self { secret })
    }

    /// Borrow the raw token, e.g. for an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(**redacted**)")
    }
}

impl Drop for AuthToken {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl Serialize for AuthToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.secret)
    }
}

impl<'de> Deserialize<'de> for AuthToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        AuthToken::new(raw).ok_or_else(|| serde::de::Error::custom("token is empty"))
    }
}
