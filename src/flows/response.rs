//! Response Processing
//!
//! Consumes the stored request state, checks the redirect response against
//! it and dispatches to the token validators.

use secrecy::SecretString;
use tracing::{debug, warn};

use crate::core::{HttpTransport, JwsVerifier, MetadataCache};
use crate::error::{OidcError, ProtocolError, StateError};
use crate::types::{AuthorizationResponse, OidcSettings, ProcessedResult, RequestState};
use crate::validation::{AccessTokenValidator, IdTokenValidator};

/// Processor for the redirect response of an authorization request.
pub struct ResponseProcessor<'a, T: HttpTransport, V: JwsVerifier> {
    settings: &'a OidcSettings,
    metadata: &'a MetadataCache<T>,
    verifier: &'a V,
}

impl<'a, T: HttpTransport, V: JwsVerifier> ResponseProcessor<'a, T, V> {
    pub fn new(settings: &'a OidcSettings, metadata: &'a MetadataCache<T>, verifier: &'a V) -> Self {
        Self {
            settings,
            metadata,
            verifier,
        }
    }

    /// Validate a redirect response (query string, fragment or full URL).
    ///
    /// The stored request state is removed before anything else is checked,
    /// so a response can be processed at most once.
    pub async fn process_response(&self, raw: &str) -> Result<ProcessedResult, OidcError> {
        let request_state = self.consume_request_state()?;

        let response = AuthorizationResponse::parse(raw)?;

        if let Some(error) = response.error.filter(|e| !e.is_empty()) {
            warn!(error = %error, "Provider returned an error response");
            return Err(ProtocolError::Provider {
                error,
                error_description: response.error_description,
            }
            .into());
        }

        if response.state.as_deref() != Some(request_state.state.as_str()) {
            warn!("Response state does not match request state");
            return Err(StateError::Mismatch.into());
        }

        let mut nonce = None;
        if request_state.oidc {
            if non_empty(&response.id_token).is_none() {
                return Err(ProtocolError::MissingIdToken.into());
            }
            nonce = Some(non_empty(&request_state.nonce).ok_or(ProtocolError::MissingNonce)?);
        }

        if request_state.oauth {
            if non_empty(&response.access_token).is_none() {
                return Err(ProtocolError::MissingAccessToken.into());
            }
            let is_bearer = non_empty(&response.token_type)
                .is_some_and(|t| t.eq_ignore_ascii_case("bearer"));
            if !is_bearer {
                return Err(ProtocolError::InvalidTokenType.into());
            }
            if non_empty(&response.expires_in).is_none() {
                return Err(ProtocolError::MissingExpiresIn.into());
            }
        }

        let id_token_validator = IdTokenValidator::new(self.metadata, self.verifier, self.settings);
        let access_token = non_empty(&response.access_token).filter(|_| request_state.oauth);
        let profile = match (non_empty(&response.id_token), nonce, access_token) {
            (Some(id_token), Some(nonce), Some(access_token)) => {
                let claims = id_token_validator
                    .validate(id_token, nonce, Some(access_token))
                    .await?;
                AccessTokenValidator::new().validate(&claims, access_token)?;
                Some(claims)
            }
            (Some(id_token), Some(nonce), None) => {
                Some(id_token_validator.validate(id_token, nonce, None).await?)
            }
            _ => None,
        };

        let profile = match profile {
            Some(claims) if self.settings.filter_protocol_claims => {
                Some(claims.without_protocol_claims())
            }
            other => other,
        };

        debug!(
            oidc = request_state.oidc,
            oauth = request_state.oauth,
            "Processed authorization response"
        );

        Ok(ProcessedResult {
            profile,
            id_token: response.id_token.map(SecretString::new),
            access_token: response.access_token.map(SecretString::new),
            expires_in: response.expires_in,
            scope: response.scope,
            session_state: response.session_state,
        })
    }

    fn consume_request_state(&self) -> Result<RequestState, StateError> {
        let store = &self.settings.request_state_store;
        let key = &self.settings.request_state_key;

        let stored = store.get(key);
        store.remove(key);

        RequestState::from_json(&stored.ok_or(StateError::NotFound)?)
    }
}

/// An empty parameter counts as absent.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
