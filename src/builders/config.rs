//! Settings Builder
//!
//! Fluent builder for OIDC client settings.

use std::sync::Arc;
use std::time::Duration;

use crate::core::RequestStateStore;
use crate::types::{
    normalize_authority, DisplayMode, JsonWebKeySet, OidcSettings, Prompt, ProviderMetadata,
    DEFAULT_RESPONSE_TYPE,
};

/// OIDC settings builder.
#[derive(Default)]
pub struct OidcSettingsBuilder {
    settings: OidcSettings,
}

impl OidcSettingsBuilder {
    /// Create new settings builder with defaults applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider authority (issuer URL or discovery document URL).
    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.settings.authority = Some(authority.into());
        self
    }

    /// Use pre-fetched discovery metadata.
    pub fn metadata(mut self, metadata: ProviderMetadata) -> Self {
        self.settings.metadata = Some(metadata);
        self
    }

    /// Use a pre-fetched provider key set.
    pub fn jwks(mut self, jwks: JsonWebKeySet) -> Self {
        self.settings.jwks = Some(jwks);
        self
    }

    /// Set authorization endpoint, bypassing discovery for requests.
    pub fn authorization_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.settings.authorization_endpoint = Some(endpoint.into());
        self
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.settings.client_id = Some(client_id.into());
        self
    }

    /// Set redirect URI.
    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.settings.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Set response type (e.g. `"id_token token"`).
    pub fn response_type(mut self, response_type: impl Into<String>) -> Self {
        self.settings.response_type = response_type.into();
        self
    }

    /// Set requested scopes.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.settings.scope = Some(scope.into());
        self
    }

    pub fn prompt(mut self, prompt: Prompt) -> Self {
        self.settings.prompt = Some(prompt);
        self
    }

    pub fn display(mut self, display: DisplayMode) -> Self {
        self.settings.display = Some(display);
        self
    }

    /// Set maximum authentication age in seconds.
    pub fn max_age(mut self, max_age: u64) -> Self {
        self.settings.max_age = Some(max_age);
        self
    }

    pub fn ui_locales(mut self, ui_locales: impl Into<String>) -> Self {
        self.settings.ui_locales = Some(ui_locales.into());
        self
    }

    pub fn id_token_hint(mut self, id_token_hint: impl Into<String>) -> Self {
        self.settings.id_token_hint = Some(id_token_hint.into());
        self
    }

    pub fn login_hint(mut self, login_hint: impl Into<String>) -> Self {
        self.settings.login_hint = Some(login_hint.into());
        self
    }

    pub fn acr_values(mut self, acr_values: impl Into<String>) -> Self {
        self.settings.acr_values = Some(acr_values.into());
        self
    }

    /// Enable or disable merging the userinfo profile into claims.
    pub fn load_user_profile(mut self, enable: bool) -> Self {
        self.settings.load_user_profile = enable;
        self
    }

    /// Enable or disable stripping protocol claims from the profile.
    pub fn filter_protocol_claims(mut self, enable: bool) -> Self {
        self.settings.filter_protocol_claims = enable;
        self
    }

    /// Set post-logout redirect URI.
    pub fn post_logout_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.settings.post_logout_redirect_uri = Some(uri.into());
        self
    }

    /// Set the store key for request state.
    pub fn request_state_key(mut self, key: impl Into<String>) -> Self {
        self.settings.request_state_key = key.into();
        self
    }

    /// Set the request state backing store.
    pub fn request_state_store(mut self, store: Arc<dyn RequestStateStore>) -> Self {
        self.settings.request_state_store = store;
        self
    }

    /// Set HTTP timeout for provider requests.
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.settings.http_timeout = timeout;
        self
    }

    /// Build the settings.
    ///
    /// Never fails: missing values are reported by the operations that need
    /// them.
    pub fn build(self) -> OidcSettings {
        let mut settings = self.settings;
        settings.authority = settings.authority.as_deref().map(normalize_authority);
        if settings.response_type.is_empty() {
            settings.response_type = DEFAULT_RESPONSE_TYPE.to_string();
        }
        settings
    }
}

/// Create a new OIDC settings builder.
pub fn oidc_settings() -> OidcSettingsBuilder {
    OidcSettingsBuilder::new()
}
