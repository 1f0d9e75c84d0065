//! Response Types
//!
//! Redirect response parsing and the result handed back to the caller.

use secrecy::SecretString;
use std::collections::HashMap;

use crate::error::ProtocolError;
use crate::types::IdTokenClaims;

/// Maximum number of distinct parameters accepted in a redirect response.
pub const MAX_RESPONSE_PARAMETERS: usize = 50;

/// Parameters returned on the redirect (query string or fragment).
#[derive(Clone, Debug, Default)]
pub struct AuthorizationResponse {
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub id_token: Option<String>,
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<String>,
    pub scope: Option<String>,
    pub session_state: Option<String>,
}

impl AuthorizationResponse {
    /// Parse a raw query string, fragment, or full URL.
    ///
    /// Anything up to and including the last `#` is discarded.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let params = parse_parameters(raw)?;
        if params.is_empty() {
            return Err(ProtocolError::NoResponse);
        }

        Ok(Self::from_parameters(params))
    }

    /// Build from already decoded parameters, ignoring unknown keys.
    pub fn from_parameters(mut params: HashMap<String, String>) -> Self {
        Self {
            state: params.remove("state"),
            error: params.remove("error"),
            error_description: params.remove("error_description"),
            id_token: params.remove("id_token"),
            access_token: params.remove("access_token"),
            token_type: params.remove("token_type"),
            expires_in: params.remove("expires_in"),
            scope: params.remove("scope"),
            session_state: params.remove("session_state"),
        }
    }

    /// Check if the provider reported an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Decode `key=value` pairs joined by `&`.
///
/// Segments without a key are skipped, a value keeps any further `=`, and a
/// repeated key overwrites the earlier value.
pub fn parse_parameters(raw: &str) -> Result<HashMap<String, String>, ProtocolError> {
    let input = match raw.rfind('#') {
        Some(idx) => &raw[idx + 1..],
        None => raw,
    };

    let mut params = HashMap::new();
    for segment in input.split('&') {
        let Some((key, value)) = segment.trim_start_matches('=').split_once('=') else {
            continue;
        };
        if key.is_empty() {
            continue;
        }

        params.insert(decode_component(key)?, decode_component(value)?);
        if params.len() > MAX_RESPONSE_PARAMETERS {
            return Err(ProtocolError::TooManyParameters);
        }
    }

    Ok(params)
}

fn decode_component(value: &str) -> Result<String, ProtocolError> {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ProtocolError::MalformedParameter {
            message: e.to_string(),
        })
}

/// Validated response returned by response processing.
#[derive(Clone)]
pub struct ProcessedResult {
    /// Claims (ID token merged with userinfo); absent for pure OAuth flows.
    pub profile: Option<IdTokenClaims>,
    pub id_token: Option<SecretString>,
    pub access_token: Option<SecretString>,
    pub expires_in: Option<String>,
    pub scope: Option<String>,
    pub session_state: Option<String>,
}

impl ProcessedResult {
    /// Access token lifetime in seconds, if numeric.
    pub fn expires_in_secs(&self) -> Option<u64> {
        self.expires_in.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

impl std::fmt::Debug for ProcessedResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessedResult")
            .field("profile", &self.profile)
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("session_state", &self.session_state)
            .finish()
    }
}
