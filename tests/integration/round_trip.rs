//! Integration tests for the request/response round trip

use super::*;
use oidc_client_integration::{
    BindingError, OidcError, ProtocolError, SignatureError, StateError, ValidationError,
    PROTOCOL_CLAIMS,
};
use secrecy::ExposeSecret;

async fn respond_with_claims(
    response_type: &str,
    mutate: impl FnOnce(&mut Value),
) -> Result<oidc_client_integration::ProcessedResult, OidcError> {
    let server = setup_provider().await;
    let client = provider_client(&server, response_type);

    let request = client.create_token_request().await.unwrap();
    let nonce = request.request_state.nonce.clone().unwrap();
    let mut claims = id_token_claims(&server.uri(), &nonce);
    mutate(&mut claims);
    let id_token = sign_id_token(PROVIDER_KEY, &claims);

    client
        .process_response(&hybrid_fragment(&request.request_state.state, &id_token))
        .await
}

#[tokio::test]
async fn test_hybrid_round_trip_success() {
    let server = setup_provider().await;
    let client = provider_client(&server, "id_token token");

    let request = client.create_token_request().await.unwrap();
    assert!(request
        .url
        .starts_with(&format!("{}/authorize?state={}&nonce=", server.uri(), request.request_state.state)));
    assert!(request.url.contains("&client_id=web-client&redirect_uri="));

    let nonce = request.request_state.nonce.clone().unwrap();
    let id_token = sign_id_token(PROVIDER_KEY, &id_token_claims(&server.uri(), &nonce));

    let result = client
        .process_response(&hybrid_fragment(&request.request_state.state, &id_token))
        .await
        .unwrap();

    let profile = result.profile.as_ref().expect("profile");
    assert_eq!(profile.subject(), Some("user-1"));
    assert_eq!(profile.get_str("name"), Some("Ada Lovelace"));
    assert_eq!(profile.get_str("email"), Some("ada@example.com"));
    assert!(profile.contains("amr"));
    for claim in PROTOCOL_CLAIMS {
        assert!(!profile.contains(claim), "{} should be filtered", claim);
    }

    assert_eq!(result.id_token.as_ref().unwrap().expose_secret(), &id_token);
    assert_eq!(result.access_token.as_ref().unwrap().expose_secret(), ACCESS_TOKEN);
    assert_eq!(result.expires_in_secs(), Some(3600));
    assert_eq!(result.scope.as_deref(), Some("openid profile"));
    assert_eq!(result.session_state.as_deref(), Some("abc.123"));
}

#[tokio::test]
async fn test_replayed_response_rejected() {
    let server = setup_provider().await;
    let client = provider_client(&server, "id_token token");

    let request = client.create_token_request().await.unwrap();
    let nonce = request.request_state.nonce.clone().unwrap();
    let id_token = sign_id_token(PROVIDER_KEY, &id_token_claims(&server.uri(), &nonce));
    let response = hybrid_fragment(&request.request_state.state, &id_token);

    assert!(client.process_response(&response).await.is_ok());

    let replay = client.process_response(&response).await;
    assert!(matches!(replay, Err(OidcError::State(StateError::NotFound))));
}

#[tokio::test]
async fn test_rejected_response_still_consumes_state() {
    let server = setup_provider().await;
    let client = provider_client(&server, "id_token token");

    let request = client.create_token_request().await.unwrap();
    let nonce = request.request_state.nonce.clone().unwrap();
    let mut claims = id_token_claims(&server.uri(), &nonce);
    claims["aud"] = json!("another-client");
    let bad = hybrid_fragment(&request.request_state.state, &sign_id_token(PROVIDER_KEY, &claims));

    assert!(client.process_response(&bad).await.is_err());

    let good_token = sign_id_token(PROVIDER_KEY, &id_token_claims(&server.uri(), &nonce));
    let retry = client
        .process_response(&hybrid_fragment(&request.request_state.state, &good_token))
        .await;
    assert!(matches!(retry, Err(OidcError::State(StateError::NotFound))));
}

#[tokio::test]
async fn test_flipped_state_character() {
    let server = setup_provider().await;
    let client = provider_client(&server, "id_token token");

    let request = client.create_token_request().await.unwrap();
    let nonce = request.request_state.nonce.clone().unwrap();
    let id_token = sign_id_token(PROVIDER_KEY, &id_token_claims(&server.uri(), &nonce));

    let mut state = request.request_state.state.clone();
    let flipped = if state.ends_with('A') { "B" } else { "A" };
    state.replace_range(state.len() - 1.., flipped);

    let result = client.process_response(&hybrid_fragment(&state, &id_token)).await;
    assert!(matches!(result, Err(OidcError::State(StateError::Mismatch))));
}

#[tokio::test]
async fn test_token_signed_by_unknown_key() {
    let server = setup_provider().await;
    let client = provider_client(&server, "id_token token");

    let request = client.create_token_request().await.unwrap();
    let nonce = request.request_state.nonce.clone().unwrap();
    let forged = sign_id_token(ROGUE_KEY, &id_token_claims(&server.uri(), &nonce));

    let error = client
        .process_response(&hybrid_fragment(&request.request_state.state, &forged))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        OidcError::Signature(SignatureError::VerificationFailed)
    ));
    assert!(error.is_security_violation());
}

#[tokio::test]
async fn test_wrong_nonce() {
    let result = respond_with_claims("id_token token", |c| c["nonce"] = json!("guess")).await;
    assert!(matches!(
        result,
        Err(OidcError::Validation(ValidationError::InvalidNonce))
    ));
}

#[tokio::test]
async fn test_wrong_issuer() {
    let result = respond_with_claims("id_token token", |c| {
        c["iss"] = json!("https://impostor.example.com")
    })
    .await;
    assert!(matches!(
        result,
        Err(OidcError::Validation(ValidationError::InvalidIssuer))
    ));
}

#[tokio::test]
async fn test_wrong_audience() {
    let result = respond_with_claims("id_token token", |c| c["aud"] = json!("other")).await;
    assert!(matches!(
        result,
        Err(OidcError::Validation(ValidationError::InvalidAudience))
    ));
}

#[tokio::test]
async fn test_stale_token() {
    let result = respond_with_claims("id_token token", |c| c["iat"] = json!(now() - 301)).await;
    assert!(matches!(
        result,
        Err(OidcError::Validation(ValidationError::IssuedTooLongAgo))
    ));
}

#[tokio::test]
async fn test_expired_token() {
    let result = respond_with_claims("id_token token", |c| c["exp"] = json!(now() - 5)).await;
    assert!(matches!(
        result,
        Err(OidcError::Validation(ValidationError::Expired))
    ));
}

#[tokio::test]
async fn test_corrupted_at_hash() {
    let result = respond_with_claims("id_token token", |c| {
        c["at_hash"] = json!(compute_at_hash("some-other-token"))
    })
    .await;
    assert!(matches!(result, Err(OidcError::Binding(BindingError::Mismatch))));
}

#[tokio::test]
async fn test_id_token_only_flow() {
    let server = setup_provider().await;
    let client = provider_client(&server, "id_token");
    assert!(client.is_oidc());
    assert!(!client.is_oauth());

    let request = client.create_token_request().await.unwrap();
    assert!(request.url.contains("&nonce="));
    assert!(request.url.contains("&response_type=id_token&"));

    let nonce = request.request_state.nonce.clone().unwrap();
    let mut claims = id_token_claims(&server.uri(), &nonce);
    claims.as_object_mut().unwrap().remove("at_hash");
    let id_token = sign_id_token(PROVIDER_KEY, &claims);

    let result = client
        .process_response(&format!(
            "{}#state={}&id_token={}",
            REDIRECT_URI, request.request_state.state, id_token
        ))
        .await
        .unwrap();

    let profile = result.profile.unwrap();
    assert_eq!(profile.subject(), Some("user-1"));
    assert!(!profile.contains("name"));
    assert!(result.access_token.is_none());
}

#[tokio::test]
async fn test_parameter_count_boundary() {
    let server = setup_provider().await;
    let client = provider_client(&server, "id_token token");

    let run = |extra: usize| {
        let client = &client;
        let issuer = server.uri();
        async move {
            let request = client.create_token_request().await.unwrap();
            let nonce = request.request_state.nonce.clone().unwrap();
            let id_token = sign_id_token(PROVIDER_KEY, &id_token_claims(&issuer, &nonce));
            let padding: String = (0..extra).map(|i| format!("&x{}=1", i)).collect();
            let raw = format!(
                "state={}&id_token={}&access_token={}&token_type=Bearer&expires_in=3600{}",
                request.request_state.state, id_token, ACCESS_TOKEN, padding
            );
            client.process_response(&raw).await
        }
    };

    // five protocol parameters plus padding
    assert!(run(45).await.is_ok());
    assert!(matches!(
        run(46).await,
        Err(OidcError::Protocol(ProtocolError::TooManyParameters))
    ));
}

#[tokio::test]
async fn test_provider_error_response() {
    let server = setup_provider().await;
    let client = provider_client(&server, "id_token token");

    let request = client.create_token_request().await.unwrap();
    let error = client
        .process_response(&format!(
            "{}#error=access_denied&error_description=User%20cancelled&state={}",
            REDIRECT_URI, request.request_state.state
        ))
        .await
        .unwrap_err();

    assert_eq!(error.error_code(), "OIDC_PROTOCOL");
    assert!(error.to_string().ends_with("access_denied"));
}
