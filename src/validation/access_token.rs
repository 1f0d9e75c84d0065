//! Access Token Binding
//!
//! `at_hash` check binding a hybrid-flow access token to its ID token.

use base64::Engine;
use sha2::{Digest, Sha256};

use crate::error::BindingError;
use crate::types::IdTokenClaims;

/// Compute the `at_hash` of an access token.
///
/// Base64url (unpadded) of the left half of the SHA-256 digest.
pub fn compute_at_hash(access_token: &str) -> String {
    let digest = Sha256::digest(access_token.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&digest[..digest.len() / 2])
}

/// Validator for the access token to ID token binding.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccessTokenValidator;

impl AccessTokenValidator {
    pub fn new() -> Self {
        Self
    }

    /// Require `claims.at_hash` to match the hash of `access_token`.
    pub fn validate(&self, claims: &IdTokenClaims, access_token: &str) -> Result<(), BindingError> {
        let expected = claims.at_hash().ok_or(BindingError::MissingAtHash)?;

        if compute_at_hash(access_token) != expected {
            return Err(BindingError::Mismatch);
        }

        Ok(())
    }
}
