//! OIDC Client Integration Module
//!
//! OpenID Connect implicit and hybrid flow client.
//!
//! # Features
//!
//! - Authorization request building with single-use `state` and `nonce`
//! - Discovery metadata and signing key retrieval, memoized per client
//! - ID token signature and claim validation (`nonce`, `iss`, `aud`, `iat`, `exp`)
//! - Access token binding validation (`at_hash`)
//! - Userinfo profile merge and protocol claim filtering
//! - End-session (logout) URL building
//!
//! # Example
//!
//! ```rust,ignore
//! use oidc_client_integration::{oidc_settings, OidcClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = oidc_settings()
//!         .authority("https://login.example.com")
//!         .client_id("my-client-id")
//!         .redirect_uri("https://myapp.com/callback")
//!         .response_type("id_token token")
//!         .scope("openid profile email")
//!         .build();
//!
//!     let client = OidcClient::new(settings)?;
//!
//!     // Send the user agent here; the request state is stored as a side effect.
//!     let request = client.create_token_request().await?;
//!     println!("Authorization URL: {}", request.url);
//!
//!     // Later, on the redirect back:
//!     let result = client
//!         .process_response("https://myapp.com/callback#state=...&id_token=...")
//!         .await?;
//!     println!("Profile: {:?}", result.profile);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: settings, provider metadata, request state, responses and claims
//! - `error`: error hierarchy, one kind per failed check
//! - `core`: HTTP transport, request state store, JWS verification, metadata cache
//! - `validation`: ID token claim validation and `at_hash` binding
//! - `flows`: authorization request building and response processing
//! - `builders`: fluent builder for settings
//! - `client`: high-level client combining all of the above

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod flows;
pub mod types;
pub mod validation;

// Re-export main client
pub use client::{oidc_client, OidcClient};

// Re-export builders
pub use builders::{oidc_settings, OidcSettingsBuilder};

// Re-export errors
pub use error::{
    BindingError, ConfigurationError, KeyError, MetadataError, OidcError, OidcResult,
    ProtocolError, SignatureError, StateError, TransportError, ValidationError,
};

// Re-export types
pub use types::{
    // Config
    normalize_authority, DisplayMode, OidcSettings, Prompt, DEFAULT_REQUEST_STATE_KEY,
    DEFAULT_RESPONSE_TYPE, DISCOVERY_DOCUMENT_SUFFIX,
    // Metadata
    JsonWebKey, JsonWebKeySet, ProviderMetadata, SigningKey,
    // Request
    AuthorizationRequest, RequestState,
    // Response
    parse_parameters, AuthorizationResponse, ProcessedResult, MAX_RESPONSE_PARAMETERS,
    // Claims
    IdTokenClaims, PROTOCOL_CLAIMS,
};

// Re-export core components
pub use crate::core::{
    // Transport
    HttpRequest, HttpResponse, HttpTransport, MockHttpTransport, ReqwestHttpTransport,
    // State
    generate_random_token, InMemoryRequestStateStore, MockRequestStateStore, RequestStateStore,
    StoreOperation,
    // JWS
    create_mock_token, JwsVerifier, MockJwsVerifier, X509JwsVerifier,
    // Metadata
    create_mock_metadata, MetadataCache,
};

// Re-export flows
pub use flows::{AuthorizationRequestBuilder, ResponseProcessor};

// Re-export validation
pub use validation::{compute_at_hash, AccessTokenValidator, IdTokenValidator};
