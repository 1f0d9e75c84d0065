//! Integration tests using WireMock
//!
//! A mock identity provider serves discovery, key set and userinfo; ID tokens
//! are signed with the RSA key matching the published certificate.

mod provider;
mod round_trip;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use oidc_client_integration::{
    compute_at_hash, oidc_settings, InMemoryRequestStateStore, OidcClient, OidcSettings,
};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PROVIDER_KEY: &str = include_str!("../fixtures/provider-key.pem");
pub const PROVIDER_CERT: &str = include_str!("../fixtures/provider-cert.b64");
pub const ROGUE_KEY: &str = include_str!("../fixtures/rogue-key.pem");
pub const ROGUE_CERT: &str = include_str!("../fixtures/rogue-cert.b64");

pub const CLIENT_ID: &str = "web-client";
pub const REDIRECT_URI: &str = "https://app.example.com/callback";
pub const ACCESS_TOKEN: &str = "provider-access-token";

/// Discovery document for a provider rooted at `issuer`.
pub fn discovery_document(issuer: &str) -> Value {
    json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{}/authorize", issuer),
        "jwks_uri": format!("{}/jwks", issuer),
        "userinfo_endpoint": format!("{}/userinfo", issuer),
        "end_session_endpoint": format!("{}/logout", issuer),
        "response_types_supported": ["id_token", "id_token token"]
    })
}

/// Key set publishing `certificate` as the first RSA key.
pub fn key_set(certificate: &str) -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "use": "sig",
            "kid": "key-1",
            "x5c": [certificate.trim()]
        }]
    })
}

/// Start a provider serving discovery, keys and userinfo.
pub async fn setup_provider() -> MockServer {
    let server = MockServer::start().await;
    let issuer = server.uri();

    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discovery_document(&issuer)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(key_set(PROVIDER_CERT)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("authorization", format!("Bearer {}", ACCESS_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "user-1",
            "name": "Ada Lovelace",
            "email": "ada@example.com"
        })))
        .mount(&server)
        .await;

    server
}

/// Settings pointing at the mock provider.
pub fn provider_settings(server: &MockServer, response_type: &str) -> OidcSettings {
    oidc_settings()
        .authority(server.uri())
        .client_id(CLIENT_ID)
        .redirect_uri(REDIRECT_URI)
        .response_type(response_type)
        .scope("openid profile")
        .request_state_store(Arc::new(InMemoryRequestStateStore::new()))
        .build()
}

pub fn provider_client(server: &MockServer, response_type: &str) -> OidcClient {
    OidcClient::new(provider_settings(server, response_type)).unwrap()
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Claims a well-behaved provider would issue for this request.
pub fn id_token_claims(issuer: &str, nonce: &str) -> Value {
    let now = now();
    json!({
        "sub": "user-1",
        "iss": issuer,
        "aud": CLIENT_ID,
        "nonce": nonce,
        "iat": now,
        "exp": now + 3600,
        "at_hash": compute_at_hash(ACCESS_TOKEN),
        "idp": "local",
        "amr": ["pwd"]
    })
}

pub fn sign_id_token(private_key: &str, claims: &Value) -> String {
    let key = EncodingKey::from_rsa_pem(private_key.as_bytes()).unwrap();
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some("key-1".to_string());
    encode(&header, claims, &key).unwrap()
}

/// Hybrid flow fragment carrying `id_token` and the access token.
pub fn hybrid_fragment(state: &str, id_token: &str) -> String {
    format!(
        "{}#state={}&id_token={}&access_token={}&token_type=Bearer&expires_in=3600&scope=openid%20profile&session_state=abc.123",
        REDIRECT_URI, state, id_token, ACCESS_TOKEN
    )
}
