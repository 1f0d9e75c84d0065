//! OIDC Client
//!
//! High-level implicit/hybrid flow client combining request building,
//! response processing and token validation.

use std::sync::Arc;
use tracing::instrument;

use crate::core::{
    HttpTransport, JwsVerifier, MetadataCache, ReqwestHttpTransport, X509JwsVerifier,
    MAX_RESPONSE_SIZE,
};
use crate::error::{ConfigurationError, OidcResult};
use crate::flows::{AuthorizationRequestBuilder, ResponseProcessor};
use crate::types::{
    AuthorizationRequest, IdTokenClaims, OidcSettings, ProcessedResult, ProviderMetadata,
    SigningKey,
};
use crate::validation::{AccessTokenValidator, IdTokenValidator};

/// OIDC client for one relying party configuration.
///
/// Discovery metadata and the signing key are fetched at most once per
/// client and never refreshed.
pub struct OidcClient<T: HttpTransport = ReqwestHttpTransport, V: JwsVerifier = X509JwsVerifier> {
    settings: OidcSettings,
    metadata: MetadataCache<T>,
    verifier: V,
}

impl OidcClient<ReqwestHttpTransport, X509JwsVerifier> {
    /// Create a new OIDC client with default implementations.
    pub fn new(settings: OidcSettings) -> OidcResult<Self> {
        let transport = ReqwestHttpTransport::with_options(settings.http_timeout, MAX_RESPONSE_SIZE)
            .map_err(|e| ConfigurationError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self::with_components(settings, transport, X509JwsVerifier::new()))
    }
}

impl<T: HttpTransport, V: JwsVerifier> OidcClient<T, V> {
    /// Create a client with custom implementations.
    pub fn with_components(settings: OidcSettings, transport: T, verifier: V) -> Self {
        let metadata = MetadataCache::new(&settings, Arc::new(transport));
        Self {
            settings,
            metadata,
            verifier,
        }
    }

    /// Get the client settings.
    pub fn settings(&self) -> &OidcSettings {
        &self.settings
    }

    /// Change the response type of subsequent requests.
    pub fn set_response_type(&mut self, response_type: impl Into<String>) {
        self.settings.response_type = response_type.into();
    }

    /// Whether requests ask for an ID token.
    pub fn is_oidc(&self) -> bool {
        self.settings.is_oidc()
    }

    /// Whether requests ask for an access token.
    pub fn is_oauth(&self) -> bool {
        self.settings.is_oauth()
    }

    // ========== Provider Metadata ==========

    /// Load the discovery document.
    pub async fn load_metadata(&self) -> OidcResult<ProviderMetadata> {
        self.metadata.load_metadata().await.cloned()
    }

    /// Load the provider signing key.
    pub async fn load_signing_key(&self) -> OidcResult<SigningKey> {
        self.metadata.load_signing_key().await
    }

    /// Resolve the authorization endpoint.
    pub async fn load_authorization_endpoint(&self) -> OidcResult<String> {
        self.metadata.load_authorization_endpoint().await
    }

    /// Fetch the userinfo profile for an access token.
    pub async fn load_user_profile(
        &self,
        access_token: &str,
    ) -> OidcResult<serde_json::Map<String, serde_json::Value>> {
        self.metadata.load_user_profile(access_token).await
    }

    // ========== Requests ==========

    /// Build the authorization request and store its request state.
    #[instrument(skip(self), fields(response_type = %self.settings.response_type))]
    pub async fn create_token_request(&self) -> OidcResult<AuthorizationRequest> {
        AuthorizationRequestBuilder::new(&self.settings, &self.metadata)
            .create_token_request()
            .await
    }

    /// Build the end-session URL.
    #[instrument(skip_all)]
    pub async fn create_logout_request(&self, id_token_hint: Option<&str>) -> OidcResult<String> {
        AuthorizationRequestBuilder::new(&self.settings, &self.metadata)
            .create_logout_request(id_token_hint)
            .await
    }

    // ========== Responses ==========

    /// Validate the redirect response of the last request.
    #[instrument(skip_all)]
    pub async fn process_response(&self, raw: &str) -> OidcResult<ProcessedResult> {
        ResponseProcessor::new(&self.settings, &self.metadata, &self.verifier)
            .process_response(raw)
            .await
    }

    // ========== Validation ==========

    /// Validate an ID token, merging the userinfo profile when an access
    /// token is given and profile loading is enabled.
    #[instrument(skip_all)]
    pub async fn validate_id_token(
        &self,
        id_token: &str,
        nonce: &str,
        access_token: Option<&str>,
    ) -> OidcResult<IdTokenClaims> {
        IdTokenValidator::new(&self.metadata, &self.verifier, &self.settings)
            .validate(id_token, nonce, access_token)
            .await
    }

    /// Check the `at_hash` binding of an access token.
    pub fn validate_access_token(
        &self,
        claims: &IdTokenClaims,
        access_token: &str,
    ) -> OidcResult<()> {
        Ok(AccessTokenValidator::new().validate(claims, access_token)?)
    }

    /// Validate an ID token and the access token bound to it.
    #[instrument(skip_all)]
    pub async fn validate_id_token_and_access_token(
        &self,
        id_token: &str,
        nonce: &str,
        access_token: &str,
    ) -> OidcResult<IdTokenClaims> {
        let claims = self
            .validate_id_token(id_token, nonce, Some(access_token))
            .await?;
        self.validate_access_token(&claims, access_token)?;
        Ok(claims)
    }
}

/// Create a new OIDC client with default implementations.
pub fn oidc_client(settings: OidcSettings) -> OidcResult<OidcClient> {
    OidcClient::new(settings)
}
