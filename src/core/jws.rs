//! JWS Verification
//!
//! Signature verification of ID tokens against the provider certificate.

use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use std::sync::Mutex;
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

use crate::error::SignatureError;
use crate::types::{IdTokenClaims, SigningKey};

/// RSA algorithms accepted in the token header.
pub const RSA_ALGORITHMS: [Algorithm; 6] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
];

/// JWS verifier interface (for dependency injection).
pub trait JwsVerifier: Send + Sync {
    /// Verify `token` against the signing certificate and return its payload.
    ///
    /// Only the signature is checked here; claim validation is the caller's.
    fn verify(&self, token: &str, key: &SigningKey) -> Result<IdTokenClaims, SignatureError>;
}

/// Verifier reading the RSA public key from the X.509 certificate.
#[derive(Clone, Copy, Debug, Default)]
pub struct X509JwsVerifier;

impl X509JwsVerifier {
    pub fn new() -> Self {
        Self
    }

    fn decoding_key(key: &SigningKey) -> Result<DecodingKey, SignatureError> {
        let der = key
            .certificate_der()
            .map_err(|e| SignatureError::InvalidCertificate {
                message: e.to_string(),
            })?;

        let (_, cert) =
            X509Certificate::from_der(&der).map_err(|e| SignatureError::InvalidCertificate {
                message: format!("Failed to parse certificate: {e}"),
            })?;

        let spki = cert.public_key();
        match spki.parsed() {
            Ok(PublicKey::RSA(_)) => {}
            _ => {
                return Err(SignatureError::InvalidCertificate {
                    message: "certificate does not carry an RSA public key".to_string(),
                })
            }
        }

        // The subject public key bit string is the PKCS#1 RSAPublicKey.
        Ok(DecodingKey::from_rsa_der(spki.subject_public_key.data.as_ref()))
    }
}

impl JwsVerifier for X509JwsVerifier {
    fn verify(&self, token: &str, key: &SigningKey) -> Result<IdTokenClaims, SignatureError> {
        let header = decode_header(token).map_err(|e| SignatureError::MalformedToken {
            message: e.to_string(),
        })?;

        if !RSA_ALGORITHMS.contains(&header.alg) {
            return Err(SignatureError::UnsupportedAlgorithm {
                algorithm: format!("{:?}", header.alg),
            });
        }

        let decoding_key = Self::decoding_key(key)?;

        let mut validation = Validation::new(header.alg);
        validation.algorithms = RSA_ALGORITHMS.to_vec();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Map<String, Value>>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                    SignatureError::MalformedToken {
                        message: e.to_string(),
                    }
                }
                _ => SignatureError::VerificationFailed,
            }
        })?;

        Ok(IdTokenClaims::new(data.claims))
    }
}

/// Mock verifier for testing.
///
/// Decodes the payload without checking the signature, unless told to reject.
#[derive(Default)]
pub struct MockJwsVerifier {
    reject: Mutex<bool>,
    verify_history: Mutex<Vec<SigningKey>>,
}

impl MockJwsVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent verification.
    pub fn reject_all(&self) -> &Self {
        *self.reject.lock().unwrap() = true;
        self
    }

    /// Keys passed to `verify`.
    pub fn get_verify_history(&self) -> Vec<SigningKey> {
        self.verify_history.lock().unwrap().clone()
    }
}

impl JwsVerifier for MockJwsVerifier {
    fn verify(&self, token: &str, key: &SigningKey) -> Result<IdTokenClaims, SignatureError> {
        self.verify_history.lock().unwrap().push(key.clone());

        if *self.reject.lock().unwrap() {
            return Err(SignatureError::VerificationFailed);
        }

        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| SignatureError::MalformedToken {
                message: "token is not a compact JWS".to_string(),
            })?;

        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| SignatureError::MalformedToken {
                message: e.to_string(),
            })?;

        serde_json::from_slice::<Map<String, Value>>(&bytes)
            .map(IdTokenClaims::new)
            .map_err(|e| SignatureError::MalformedToken {
                message: e.to_string(),
            })
    }
}

/// Build an unsigned compact token for use with [`MockJwsVerifier`].
pub fn create_mock_token(claims: &Value) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    format!(
        "{}.{}.{}",
        engine.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
        engine.encode(claims.to_string()),
        engine.encode("mock-signature")
    )
}
