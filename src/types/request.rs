//! Request Types
//!
//! Anti-replay state persisted between building the authorization request
//! and processing its response.

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Request state stored under the configured key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestState {
    /// An ID token was requested.
    #[serde(default)]
    pub oidc: bool,
    /// An access token was requested.
    #[serde(default)]
    pub oauth: bool,
    /// CSRF token echoed back by the provider.
    #[serde(default)]
    pub state: String,
    /// Replay token bound into the ID token; present iff `oidc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl RequestState {
    /// Serialize for the request state store.
    pub fn to_json(&self) -> Result<String, StateError> {
        serde_json::to_string(self).map_err(|e| StateError::Corrupted {
            message: e.to_string(),
        })
    }

    /// Parse a stored value, requiring a non-empty `state`.
    pub fn from_json(raw: &str) -> Result<Self, StateError> {
        let value: Option<Self> = serde_json::from_str(raw).map_err(|e| StateError::Corrupted {
            message: e.to_string(),
        })?;
        let request_state = value.ok_or(StateError::NotFound)?;

        if request_state.state.is_empty() {
            return Err(StateError::MissingState);
        }

        Ok(request_state)
    }
}

/// Result of building an authorization request.
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
    /// State written to the store.
    pub request_state: RequestState,
    /// URL to send the user agent to.
    pub url: String,
}
