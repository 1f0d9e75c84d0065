//! Integration tests for provider metadata, keys and userinfo over HTTP

use super::*;
use oidc_client_integration::core::get_json;
use oidc_client_integration::{
    HttpRequest, HttpTransport, KeyError, MetadataError, OidcError,
    ReqwestHttpTransport, TransportError,
};
use std::time::Duration;

#[tokio::test]
async fn test_metadata_and_keys_fetched_once() {
    let server = MockServer::start().await;
    let issuer = server.uri();

    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discovery_document(&issuer)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(key_set(PROVIDER_CERT)))
        .expect(1)
        .mount(&server)
        .await;

    let client = provider_client(&server, "id_token token");

    for _ in 0..3 {
        let metadata = client.load_metadata().await.unwrap();
        assert_eq!(metadata.issuer.as_deref(), Some(issuer.as_str()));
        assert!(metadata.extra.contains_key("response_types_supported"));

        let key = client.load_signing_key().await.unwrap();
        assert_eq!(key.certificate(), PROVIDER_CERT.trim());
    }

    server.verify().await;
}

#[tokio::test]
async fn test_authority_with_full_document_url() {
    let server = setup_provider().await;
    let settings = oidc_settings()
        .authority(format!("{}/.well-known/openid-configuration", server.uri()))
        .build();
    let client = OidcClient::new(settings).unwrap();

    let endpoint = client.load_authorization_endpoint().await.unwrap();
    assert_eq!(endpoint, format!("{}/authorize", server.uri()));
}

#[tokio::test]
async fn test_discovery_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = provider_client(&server, "id_token token");
    let error = client.load_metadata().await.unwrap_err();

    assert!(matches!(
        error,
        OidcError::Metadata(MetadataError::LoadFailed { .. })
    ));
    assert!(error.to_string().contains("HTTP status 500"));
}

#[tokio::test]
async fn test_request_fails_when_discovery_fails() {
    let server = MockServer::start().await;
    let client = provider_client(&server, "id_token token");

    let result = client.create_token_request().await;
    assert!(matches!(
        result,
        Err(OidcError::Metadata(MetadataError::LoadFailed { .. }))
    ));
}

#[tokio::test]
async fn test_non_rsa_first_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discovery_document(&server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [
                {"kty": "EC", "crv": "P-256", "x": "x", "y": "y"},
                {"kty": "RSA", "x5c": [PROVIDER_CERT.trim()]}
            ]
        })))
        .mount(&server)
        .await;

    let client = provider_client(&server, "id_token token");
    let result = client.load_signing_key().await;
    assert!(matches!(result, Err(OidcError::Key(KeyError::NotRsa))));
}

#[tokio::test]
async fn test_rotated_key_rejects_old_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discovery_document(&server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(key_set(ROGUE_CERT)))
        .mount(&server)
        .await;

    let client = provider_client(&server, "id_token");
    let id_token = sign_id_token(PROVIDER_KEY, &id_token_claims(&server.uri(), "N"));

    let result = client.validate_id_token(&id_token, "N", None).await;
    assert!(matches!(
        result,
        Err(OidcError::Signature(
            oidc_client_integration::SignatureError::VerificationFailed
        ))
    ));
}

#[tokio::test]
async fn test_user_profile_sends_bearer_token() {
    let server = setup_provider().await;
    let client = provider_client(&server, "id_token token");

    let profile = client.load_user_profile(ACCESS_TOKEN).await.unwrap();
    assert_eq!(profile.get("email"), Some(&json!("ada@example.com")));
}

#[tokio::test]
async fn test_user_profile_rejected_token() {
    let server = setup_provider().await;
    let client = provider_client(&server, "id_token token");

    // the mounted userinfo mock only matches the expected bearer token
    let result = client.load_user_profile("revoked-token").await;
    assert!(matches!(
        result,
        Err(OidcError::Metadata(MetadataError::UserInfoLoadFailed { .. }))
    ));
}

#[tokio::test]
async fn test_logout_url() {
    let server = setup_provider().await;
    let settings = oidc_settings()
        .authority(server.uri())
        .post_logout_redirect_uri("https://app.example.com/signed-out")
        .build();
    let client = OidcClient::new(settings).unwrap();

    let url = client.create_logout_request(Some("id.token.hint")).await.unwrap();
    assert_eq!(
        url,
        format!(
            "{}/logout?post_logout_redirect_uri=https%3A%2F%2Fapp.example.com%2Fsigned-out&id_token_hint=id.token.hint",
            server.uri()
        )
    );
}

#[tokio::test]
async fn test_transport_refuses_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "https://elsewhere.example.com/"),
        )
        .mount(&server)
        .await;

    let transport = ReqwestHttpTransport::new().unwrap();
    let result = transport
        .send(HttpRequest::get_json(format!("{}/moved", server.uri())))
        .await;

    assert!(matches!(
        result,
        Err(TransportError::UnexpectedRedirect { location }) if location == "https://elsewhere.example.com/"
    ));
}

#[tokio::test]
async fn test_transport_caps_response_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(2048)))
        .mount(&server)
        .await;

    let transport = ReqwestHttpTransport::with_options(Duration::from_secs(5), 1024).unwrap();
    let result = transport
        .send(HttpRequest::get_json(format!("{}/large", server.uri())))
        .await;

    assert!(matches!(
        result,
        Err(TransportError::ResponseTooLarge { size: 2048 })
    ));
}

#[tokio::test]
async fn test_transport_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let transport = ReqwestHttpTransport::new().unwrap();
    let request = HttpRequest::get_json(format!("{}/slow", server.uri()))
        .timeout(Duration::from_millis(50));

    let result = transport.send(request).await;
    assert!(matches!(result, Err(TransportError::Timeout { .. })));
}

#[tokio::test]
async fn test_get_json_decodes_body() {
    let server = setup_provider().await;
    let transport = ReqwestHttpTransport::new().unwrap();

    let jwks: oidc_client_integration::JsonWebKeySet = get_json(
        &transport,
        HttpRequest::get_json(format!("{}/jwks", server.uri())),
    )
    .await
    .unwrap();

    assert_eq!(jwks.keys.len(), 1);
    assert_eq!(jwks.keys[0].kid.as_deref(), Some("key-1"));
    assert_eq!(jwks.keys[0].key_use.as_deref(), Some("sig"));
}
