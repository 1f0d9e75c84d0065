//! Authorization Request
//!
//! Builds the implicit/hybrid authorization URL and persists the request
//! state it must later be matched against.

use tracing::debug;

use crate::core::{generate_random_token, HttpTransport, MetadataCache};
use crate::error::{ConfigurationError, MetadataError, OidcError};
use crate::types::{AuthorizationRequest, OidcSettings, RequestState};

/// Builder for authorization and logout requests.
pub struct AuthorizationRequestBuilder<'a, T: HttpTransport> {
    settings: &'a OidcSettings,
    metadata: &'a MetadataCache<T>,
}

impl<'a, T: HttpTransport> AuthorizationRequestBuilder<'a, T> {
    pub fn new(settings: &'a OidcSettings, metadata: &'a MetadataCache<T>) -> Self {
        Self { settings, metadata }
    }

    /// Build the authorization URL and store the request state.
    ///
    /// A second call before the response is processed replaces the stored
    /// state, invalidating the first request.
    pub async fn create_token_request(&self) -> Result<AuthorizationRequest, OidcError> {
        let endpoint = self.metadata.load_authorization_endpoint().await?;

        let oidc = self.settings.is_oidc();
        let request_state = RequestState {
            oidc,
            oauth: self.settings.is_oauth(),
            state: generate_random_token(),
            nonce: oidc.then(generate_random_token),
        };

        let url = build_url(&endpoint, &self.query_parameters(&request_state))?;

        self.settings
            .request_state_store
            .set(&self.settings.request_state_key, request_state.to_json()?);

        debug!(
            oidc = request_state.oidc,
            oauth = request_state.oauth,
            "Created authorization request"
        );

        Ok(AuthorizationRequest { request_state, url })
    }

    /// Build the end-session URL.
    ///
    /// The hint and the configured post-logout redirect are only sent
    /// together, and only when both are non-empty.
    pub async fn create_logout_request(
        &self,
        id_token_hint: Option<&str>,
    ) -> Result<String, OidcError> {
        let metadata = self.metadata.load_metadata().await?;
        let endpoint = metadata
            .end_session_endpoint
            .as_deref()
            .ok_or(MetadataError::MissingField {
                field: "end_session_endpoint",
            })?;

        let redirect = self
            .settings
            .post_logout_redirect_uri
            .as_deref()
            .filter(|r| !r.is_empty());
        let hint = id_token_hint.filter(|h| !h.is_empty());
        let params = match (redirect, hint) {
            (Some(redirect), Some(hint)) => vec![
                ("post_logout_redirect_uri", redirect.to_string()),
                ("id_token_hint", hint.to_string()),
            ],
            _ => Vec::new(),
        };

        Ok(build_url(endpoint, &params)?)
    }

    fn query_parameters(&self, request_state: &RequestState) -> Vec<(&'static str, String)> {
        let settings = self.settings;
        let mut params = vec![("state", Some(request_state.state.clone()))];
        params.push(("nonce", request_state.nonce.clone()));
        params.extend([
            ("client_id", settings.client_id.clone()),
            ("redirect_uri", settings.redirect_uri.clone()),
            ("response_type", Some(settings.response_type.clone())),
            ("scope", settings.scope.clone()),
            ("prompt", settings.prompt.map(|p| p.as_str().to_string())),
            ("display", settings.display.map(|d| d.as_str().to_string())),
            (
                "max_age",
                settings.max_age.filter(|age| *age > 0).map(|age| age.to_string()),
            ),
            ("ui_locales", settings.ui_locales.clone()),
            ("id_token_hint", settings.id_token_hint.clone()),
            ("login_hint", settings.login_hint.clone()),
            ("acr_values", settings.acr_values.clone()),
        ]);

        params
            .into_iter()
            .filter_map(|(name, value)| value.filter(|v| !v.is_empty()).map(|v| (name, v)))
            .collect()
    }
}

/// Append percent-encoded parameters to `endpoint`, in the given order.
pub fn build_url(endpoint: &str, params: &[(&str, String)]) -> Result<String, ConfigurationError> {
    url::Url::parse(endpoint).map_err(|_| ConfigurationError::InvalidEndpoint {
        url: endpoint.to_string(),
    })?;

    if params.is_empty() {
        return Ok(endpoint.to_string());
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if !endpoint.contains('?') {
        "?"
    } else if endpoint.ends_with('?') || endpoint.ends_with('&') {
        ""
    } else {
        "&"
    };

    Ok(format!("{}{}{}", endpoint, separator, query))
}
