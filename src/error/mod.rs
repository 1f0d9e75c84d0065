//! OIDC Error Types
//!
//! Error hierarchy for the implicit/hybrid flow client. Every variant's
//! display text names the specific check that failed.

use std::time::Duration;
use thiserror::Error;

/// Root error type for OIDC client operations.
#[derive(Error, Debug)]
pub enum OidcError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Signing key error: {0}")]
    Key(#[from] KeyError),

    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),
}

impl OidcError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "OIDC_CONFIG",
            Self::Metadata(_) => "OIDC_METADATA",
            Self::Key(_) => "OIDC_KEY",
            Self::Signature(_) => "OIDC_SIGNATURE",
            Self::State(_) => "OIDC_STATE",
            Self::Protocol(_) => "OIDC_PROTOCOL",
            Self::Validation(_) => "OIDC_VALIDATION",
            Self::Binding(_) => "OIDC_BINDING",
        }
    }

    /// Check if the error indicates a forged, replayed or tampered response.
    pub fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::State(StateError::Mismatch)
                | Self::Signature(SignatureError::VerificationFailed)
                | Self::Validation(_)
                | Self::Binding(_)
        )
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("No authority configured")]
    NoAuthority,

    #[error("No authorization_endpoint configured")]
    NoAuthorizationEndpoint,

    #[error("Invalid endpoint URL: {url}")]
    InvalidEndpoint { url: String },

    #[error("Failed to create HTTP client: {message}")]
    HttpClient { message: String },
}

/// Discovery, key set or userinfo retrieval error.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to load metadata ({message})")]
    LoadFailed { message: String },

    #[error("Failed to load signing keys ({message})")]
    SigningKeysLoadFailed { message: String },

    #[error("Failed to load user profile ({message})")]
    UserInfoLoadFailed { message: String },

    #[error("Metadata does not contain {field}")]
    MissingField { field: &'static str },
}

/// Signing key extraction error.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Signing keys empty")]
    Empty,

    #[error("Signing key not RSA")]
    NotRsa,

    #[error("RSA keys empty")]
    NoCertificate,
}

/// JWS verification error.
#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("JWT failed to validate")]
    VerificationFailed,

    #[error("Unsupported signing algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("Invalid signing certificate: {message}")]
    InvalidCertificate { message: String },

    #[error("Malformed token: {message}")]
    MalformedToken { message: String },
}

/// Anti-replay request state error.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("No request state loaded")]
    NotFound,

    #[error("Corrupted request state: {message}")]
    Corrupted { message: String },

    #[error("No state loaded")]
    MissingState,

    #[error("Invalid state")]
    Mismatch,
}

/// Malformed response or provider-reported error.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("No OIDC response")]
    NoResponse,

    #[error("Response exceeded expected number of parameters")]
    TooManyParameters,

    #[error("Malformed response parameter: {message}")]
    MalformedParameter { message: String },

    #[error("{error}")]
    Provider {
        error: String,
        error_description: Option<String>,
    },

    #[error("No identity token")]
    MissingIdToken,

    #[error("No nonce loaded")]
    MissingNonce,

    #[error("No access token")]
    MissingAccessToken,

    #[error("Invalid token type")]
    InvalidTokenType,

    #[error("No token expiration")]
    MissingExpiresIn,
}

/// ID token claim check failure.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid nonce")]
    InvalidNonce,

    #[error("Invalid issuer")]
    InvalidIssuer,

    #[error("Invalid audience")]
    InvalidAudience,

    #[error("Token issued too long ago")]
    IssuedTooLongAgo,

    #[error("Token expired")]
    Expired,

    #[error("Missing or non-numeric claim: {claim}")]
    MissingClaim { claim: &'static str },
}

/// Access token to ID token binding failure.
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("No at_hash in id_token")]
    MissingAtHash,

    #[error("at_hash failed to validate")]
    Mismatch,
}

/// HTTP transport error.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error("Unexpected redirect to: {location}")]
    UnexpectedRedirect { location: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

/// Result type for OIDC operations.
pub type OidcResult<T> = Result<T, OidcError>;
