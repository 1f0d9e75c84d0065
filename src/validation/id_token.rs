//! ID Token Validation
//!
//! Signature verification, standard claim checks and userinfo merge.

use tracing::{debug, warn};

use crate::core::{HttpTransport, JwsVerifier, MetadataCache};
use crate::error::{MetadataError, OidcError, ValidationError};
use crate::types::{IdTokenClaims, OidcSettings};

/// Maximum age of an ID token, measured from its `iat`.
pub const MAX_TOKEN_AGE_SECS: i64 = 300;

/// Current Unix time in seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Validator for ID tokens issued by the configured provider.
pub struct IdTokenValidator<'a, T: HttpTransport, V: JwsVerifier> {
    metadata: &'a MetadataCache<T>,
    verifier: &'a V,
    client_id: Option<&'a str>,
    load_user_profile: bool,
}

impl<'a, T: HttpTransport, V: JwsVerifier> IdTokenValidator<'a, T, V> {
    pub fn new(metadata: &'a MetadataCache<T>, verifier: &'a V, settings: &'a OidcSettings) -> Self {
        Self {
            metadata,
            verifier,
            client_id: settings.client_id.as_deref(),
            load_user_profile: settings.load_user_profile,
        }
    }

    /// Validate `id_token` and return its claims.
    ///
    /// With an `access_token` and profile loading enabled, the userinfo
    /// profile is merged over the claims.
    pub async fn validate(
        &self,
        id_token: &str,
        nonce: &str,
        access_token: Option<&str>,
    ) -> Result<IdTokenClaims, OidcError> {
        let key = self.metadata.load_signing_key().await?;

        let claims = self.verifier.verify(id_token, &key).map_err(|e| {
            warn!(error = %e, "ID token signature rejected");
            e
        })?;
        debug!("ID token signature verified");

        validate_nonce(&claims, nonce)?;

        let metadata = self.metadata.load_metadata().await?;
        let issuer = metadata
            .issuer
            .as_deref()
            .ok_or(MetadataError::MissingField { field: "issuer" })?;

        validate_standard_claims(&claims, issuer, self.client_id, unix_now())?;

        match access_token {
            Some(access_token) if self.load_user_profile => {
                let profile = self.metadata.load_user_profile(access_token).await?;
                debug!(fields = profile.len(), "Merging user profile into claims");
                Ok(claims.merge(profile))
            }
            _ => Ok(claims),
        }
    }
}

/// Run every claim check in order at time `now`.
pub fn validate_claims(
    claims: &IdTokenClaims,
    nonce: &str,
    issuer: &str,
    client_id: Option<&str>,
    now: i64,
) -> Result<(), ValidationError> {
    validate_nonce(claims, nonce)?;
    validate_standard_claims(claims, issuer, client_id, now)
}

fn validate_nonce(claims: &IdTokenClaims, nonce: &str) -> Result<(), ValidationError> {
    if claims.nonce() != Some(nonce) {
        return Err(ValidationError::InvalidNonce);
    }
    Ok(())
}

// iat in the future is accepted; only staleness is rejected.
fn validate_standard_claims(
    claims: &IdTokenClaims,
    issuer: &str,
    client_id: Option<&str>,
    now: i64,
) -> Result<(), ValidationError> {
    if claims.issuer() != Some(issuer) {
        return Err(ValidationError::InvalidIssuer);
    }

    match (claims.audience(), client_id) {
        (Some(aud), Some(client_id)) if aud == client_id => {}
        _ => return Err(ValidationError::InvalidAudience),
    }

    let issued_at = claims
        .issued_at()
        .ok_or(ValidationError::MissingClaim { claim: "iat" })?;
    let age = now.checked_sub(issued_at).unwrap_or(i64::MAX);
    if age > MAX_TOKEN_AGE_SECS {
        return Err(ValidationError::IssuedTooLongAgo);
    }

    let expires_at = claims
        .expires_at()
        .ok_or(ValidationError::MissingClaim { claim: "exp" })?;
    if expires_at < now {
        return Err(ValidationError::Expired);
    }

    Ok(())
}
