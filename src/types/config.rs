//! Configuration Types
//!
//! OIDC client settings and the flow flags derived from them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::core::state::{InMemoryRequestStateStore, RequestStateStore};
use crate::types::{JsonWebKeySet, ProviderMetadata};

/// Default key under which request state is stored.
pub const DEFAULT_REQUEST_STATE_KEY: &str = "OidcClient.request_state";

/// Default response type (hybrid: ID token plus access token).
pub const DEFAULT_RESPONSE_TYPE: &str = "id_token token";

/// Suffix identifying the discovery document.
pub const DISCOVERY_DOCUMENT_SUFFIX: &str = ".well-known/openid-configuration";

/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30000;

/// OIDC client settings.
///
/// Produced by [`crate::builders::OidcSettingsBuilder`], which applies the
/// defaults and normalizes `authority`. Values the operations need but that
/// are absent here are reported by those operations, not at construction.
#[derive(Clone)]
pub struct OidcSettings {
    /// Discovery document URL, always ending in the discovery suffix.
    pub authority: Option<String>,
    /// Pre-fetched discovery metadata.
    pub metadata: Option<ProviderMetadata>,
    /// Pre-fetched provider key set.
    pub jwks: Option<JsonWebKeySet>,
    /// Explicit authorization endpoint, bypassing discovery.
    pub authorization_endpoint: Option<String>,
    /// Client identifier.
    pub client_id: Option<String>,
    /// Redirect URI registered with the provider.
    pub redirect_uri: Option<String>,
    /// Whitespace-separated response type list.
    pub response_type: String,
    /// Requested scopes.
    pub scope: Option<String>,
    pub prompt: Option<Prompt>,
    pub display: Option<DisplayMode>,
    pub max_age: Option<u64>,
    pub ui_locales: Option<String>,
    pub id_token_hint: Option<String>,
    pub login_hint: Option<String>,
    pub acr_values: Option<String>,
    /// Merge the userinfo profile into the ID token claims.
    pub load_user_profile: bool,
    /// Strip protocol claims from the returned profile.
    pub filter_protocol_claims: bool,
    /// Where the provider sends the user after logout.
    pub post_logout_redirect_uri: Option<String>,
    /// Store key for the request state.
    pub request_state_key: String,
    /// Request state backing store.
    pub request_state_store: Arc<dyn RequestStateStore>,
    /// HTTP timeout for provider requests.
    pub http_timeout: Duration,
}

impl OidcSettings {
    /// Whether the response type requests an ID token.
    pub fn is_oidc(&self) -> bool {
        has_response_type(&self.response_type, "id_token")
    }

    /// Whether the response type requests an access token.
    pub fn is_oauth(&self) -> bool {
        has_response_type(&self.response_type, "token")
    }
}

impl Default for OidcSettings {
    fn default() -> Self {
        Self {
            authority: None,
            metadata: None,
            jwks: None,
            authorization_endpoint: None,
            client_id: None,
            redirect_uri: None,
            response_type: DEFAULT_RESPONSE_TYPE.to_string(),
            scope: None,
            prompt: None,
            display: None,
            max_age: None,
            ui_locales: None,
            id_token_hint: None,
            login_hint: None,
            acr_values: None,
            load_user_profile: true,
            filter_protocol_claims: true,
            post_logout_redirect_uri: None,
            request_state_key: DEFAULT_REQUEST_STATE_KEY.to_string(),
            request_state_store: Arc::new(InMemoryRequestStateStore::new()),
            http_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl std::fmt::Debug for OidcSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcSettings")
            .field("authority", &self.authority)
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("response_type", &self.response_type)
            .field("scope", &self.scope)
            .field("load_user_profile", &self.load_user_profile)
            .field("filter_protocol_claims", &self.filter_protocol_claims)
            .field("request_state_key", &self.request_state_key)
            .field("http_timeout", &self.http_timeout)
            .finish_non_exhaustive()
    }
}

/// Check whether a whitespace-separated response type list contains `kind`.
pub fn has_response_type(response_type: &str, kind: &str) -> bool {
    response_type.split_whitespace().any(|item| item == kind)
}

/// Rewrite an authority so it points at the discovery document.
pub fn normalize_authority(authority: &str) -> String {
    if authority.contains(DISCOVERY_DOCUMENT_SUFFIX) {
        return authority.to_string();
    }

    let mut normalized = authority.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized.push_str(DISCOVERY_DOCUMENT_SUFFIX);
    normalized
}

/// Prompt behavior for authorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
    /// Do not display any authentication or consent UI.
    None,
    /// Force re-authentication.
    Login,
    /// Force consent screen.
    Consent,
    /// Force account selection.
    SelectAccount,
}

impl Prompt {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Login => "login",
            Self::Consent => "consent",
            Self::SelectAccount => "select_account",
        }
    }
}

/// How the provider should render its authentication UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    Page,
    Popup,
    Touch,
    Wap,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Popup => "popup",
            Self::Touch => "touch",
            Self::Wap => "wap",
        }
    }
}
