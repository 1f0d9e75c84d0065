//! Metadata Cache
//!
//! Lazily fetches and memoizes the discovery document and provider key set.
//! Values are cached for the lifetime of the cache: there is no TTL, no
//! background refresh and no invalidation on verification failure.

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::core::transport::{get_json, HttpRequest, HttpTransport};
use crate::error::{ConfigurationError, MetadataError, OidcError};
use crate::types::{normalize_authority, JsonWebKeySet, OidcSettings, ProviderMetadata, SigningKey};

/// Memoizing loader for provider metadata, signing key and userinfo.
pub struct MetadataCache<T: HttpTransport> {
    transport: Arc<T>,
    authority: Option<String>,
    authorization_endpoint: Option<String>,
    timeout: Duration,
    metadata: OnceCell<ProviderMetadata>,
    jwks: OnceCell<JsonWebKeySet>,
}

impl<T: HttpTransport> MetadataCache<T> {
    /// Create a cache seeded with any pre-fetched metadata and key set.
    ///
    /// The authority is normalized to the discovery document URL.
    pub fn new(settings: &OidcSettings, transport: Arc<T>) -> Self {
        Self {
            transport,
            authority: settings
                .authority
                .as_deref()
                .filter(|a| !a.is_empty())
                .map(normalize_authority),
            authorization_endpoint: settings.authorization_endpoint.clone(),
            timeout: settings.http_timeout,
            metadata: OnceCell::new_with(settings.metadata.clone()),
            jwks: OnceCell::new_with(settings.jwks.clone()),
        }
    }

    /// Check if the discovery document is cached.
    pub fn has_metadata(&self) -> bool {
        self.metadata.initialized()
    }

    /// Check if the key set is cached.
    pub fn has_signing_keys(&self) -> bool {
        self.jwks.initialized()
    }

    /// Get the discovery document, fetching it on first use.
    pub async fn load_metadata(&self) -> Result<&ProviderMetadata, OidcError> {
        self.metadata.get_or_try_init(|| self.fetch_metadata()).await
    }

    async fn fetch_metadata(&self) -> Result<ProviderMetadata, OidcError> {
        let authority = self
            .authority
            .as_deref()
            .ok_or(ConfigurationError::NoAuthority)?;

        debug!(authority = %authority, "Loading discovery metadata");

        let request = HttpRequest::get_json(authority).timeout(self.timeout);
        let metadata = get_json(self.transport.as_ref(), request)
            .await
            .map_err(|e| MetadataError::LoadFailed {
                message: e.to_string(),
            })?;

        Ok(metadata)
    }

    /// Get the signing key, fetching the key set on first use.
    ///
    /// A pre-fetched key set is used without loading metadata.
    pub async fn load_signing_key(&self) -> Result<SigningKey, OidcError> {
        let jwks = self.jwks.get_or_try_init(|| self.fetch_jwks()).await?;
        Ok(jwks.signing_key()?)
    }

    async fn fetch_jwks(&self) -> Result<JsonWebKeySet, OidcError> {
        let metadata = self.load_metadata().await?;
        let jwks_uri = metadata
            .jwks_uri
            .as_deref()
            .ok_or(MetadataError::MissingField { field: "jwks_uri" })?;

        debug!(jwks_uri = %jwks_uri, "Loading signing keys");

        let request = HttpRequest::get_json(jwks_uri).timeout(self.timeout);
        let jwks = get_json(self.transport.as_ref(), request)
            .await
            .map_err(|e| MetadataError::SigningKeysLoadFailed {
                message: e.to_string(),
            })?;

        Ok(jwks)
    }

    /// Resolve the authorization endpoint.
    ///
    /// An explicitly configured endpoint bypasses discovery.
    pub async fn load_authorization_endpoint(&self) -> Result<String, OidcError> {
        if let Some(endpoint) = &self.authorization_endpoint {
            return Ok(endpoint.clone());
        }

        if self.authority.is_none() {
            return Err(ConfigurationError::NoAuthorizationEndpoint.into());
        }

        let metadata = self.load_metadata().await?;
        metadata.authorization_endpoint.clone().ok_or_else(|| {
            MetadataError::MissingField {
                field: "authorization_endpoint",
            }
            .into()
        })
    }

    /// Fetch the userinfo profile with the access token as bearer credential.
    ///
    /// Never cached.
    pub async fn load_user_profile(
        &self,
        access_token: &str,
    ) -> Result<Map<String, Value>, OidcError> {
        let metadata = self.load_metadata().await?;
        let userinfo_endpoint =
            metadata
                .userinfo_endpoint
                .as_deref()
                .ok_or(MetadataError::MissingField {
                    field: "userinfo_endpoint",
                })?;

        debug!(userinfo_endpoint = %userinfo_endpoint, "Loading user profile");

        let request = HttpRequest::get_json(userinfo_endpoint)
            .bearer(access_token)
            .timeout(self.timeout);
        let profile = get_json(self.transport.as_ref(), request)
            .await
            .map_err(|e| MetadataError::UserInfoLoadFailed {
                message: e.to_string(),
            })?;

        Ok(profile)
    }
}

/// Create a discovery document with every endpoint under `issuer`.
pub fn create_mock_metadata(issuer: &str) -> ProviderMetadata {
    ProviderMetadata {
        issuer: Some(issuer.to_string()),
        authorization_endpoint: Some(format!("{}/authorize", issuer)),
        jwks_uri: Some(format!("{}/jwks", issuer)),
        userinfo_endpoint: Some(format!("{}/userinfo", issuer)),
        end_session_endpoint: Some(format!("{}/logout", issuer)),
        extra: Default::default(),
    }
}
