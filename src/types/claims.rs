//! Claim Types
//!
//! Decoded ID token payload plus any merged userinfo fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims removed from the profile when protocol claim filtering is on.
pub const PROTOCOL_CLAIMS: [&str; 8] = ["nonce", "at_hash", "iat", "nbf", "exp", "aud", "iss", "idp"];

/// Claim set of a validated ID token.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdTokenClaims(Map<String, Value>);

impl IdTokenClaims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Get a raw claim.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Get a string claim.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Get a numeric claim as whole seconds.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        let value = self.0.get(name)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f.floor() as i64))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn nonce(&self) -> Option<&str> {
        self.get_str("nonce")
    }

    pub fn issuer(&self) -> Option<&str> {
        self.get_str("iss")
    }

    pub fn audience(&self) -> Option<&str> {
        self.get_str("aud")
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.get_i64("iat")
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.get_i64("exp")
    }

    pub fn at_hash(&self) -> Option<&str> {
        self.get_str("at_hash")
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    /// Overlay profile fields; the profile wins on key collision.
    pub fn merge(mut self, profile: Map<String, Value>) -> Self {
        self.0.extend(profile);
        self
    }

    /// Copy of the claims without [`PROTOCOL_CLAIMS`].
    pub fn without_protocol_claims(&self) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(key, _)| !PROTOCOL_CLAIMS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for IdTokenClaims {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}
