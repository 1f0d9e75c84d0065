//! Provider Metadata Types
//!
//! Discovery document, key set and the signing key extracted from it.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::KeyError;

/// OIDC discovery document.
///
/// Every endpoint is optional here; each operation checks for the fields it
/// actually needs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Issuer identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Authorization endpoint URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,
    /// JWKS URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,
    /// Userinfo endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,
    /// End session (logout) endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_session_endpoint: Option<String>,
    /// Remaining discovery fields.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// JSON Web Key Set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    #[serde(default)]
    pub keys: Vec<JsonWebKey>,
}

impl JsonWebKeySet {
    /// Extract the signing key.
    ///
    /// Only the first key is considered: it must be RSA and carry an X.509
    /// certificate chain, whose leading certificate becomes the key.
    pub fn signing_key(&self) -> Result<SigningKey, KeyError> {
        let key = self.keys.first().ok_or(KeyError::Empty)?;

        if key.kty != "RSA" {
            return Err(KeyError::NotRsa);
        }

        key.x5c
            .as_ref()
            .and_then(|chain| chain.first())
            .map(|certificate| SigningKey::new(certificate.clone()))
            .ok_or(KeyError::NoCertificate)
    }
}

/// JSON Web Key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key type (e.g. "RSA").
    pub kty: String,
    /// Key ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Public key use.
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// Intended algorithm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// X.509 certificate chain (standard base64 DER).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5c: Option<Vec<String>>,
    /// Remaining key parameters.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Provider signing key: the leading certificate of the first RSA key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningKey {
    certificate: String,
}

impl SigningKey {
    /// Wrap a base64 DER certificate.
    pub fn new(certificate: impl Into<String>) -> Self {
        Self {
            certificate: certificate.into(),
        }
    }

    /// The certificate as found in `x5c`.
    pub fn certificate(&self) -> &str {
        &self.certificate
    }

    /// Decode the certificate to DER bytes.
    pub fn certificate_der(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let compact: String = self
            .certificate
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        base64::engine::general_purpose::STANDARD.decode(compact)
    }

    /// Render the certificate as PEM.
    pub fn to_pem(&self) -> String {
        let compact: String = self
            .certificate
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let mut pem = String::from("-----BEGIN CERTIFICATE-----\n");
        for line in compact.as_bytes().chunks(64) {
            pem.push_str(&String::from_utf8_lossy(line));
            pem.push('\n');
        }
        pem.push_str("-----END CERTIFICATE-----\n");
        pem
    }
}
