//! Integration tests for discovery and endpoint resolution

use super::*;
use oidc_integration::{
    AuthorizationParams, DefaultDiscoveryClient, DiscoveryClient, DiscoveryError, EndpointRole,
    OidcError,
};
use url::Url;

#[tokio::test]
async fn test_discovery_fetch_success() {
    let mock_server = setup_mock_server().await;
    mount_discovery(&mock_server, 1).await;

    let transport = Arc::new(ReqwestHttpTransport::new().expect("Failed to build transport"));
    let client = DefaultDiscoveryClient::new(transport);
    let domain = Url::parse(&mock_server.uri()).unwrap();

    let document = client.fetch(&domain).await.unwrap();

    assert_eq!(document.issuer, mock_server.uri());
    assert_eq!(
        document.token_endpoint,
        format!("{}/token", mock_server.uri())
    );
}

#[tokio::test]
async fn test_discovery_issuer_mismatch() {
    let mock_server = setup_mock_server().await;
    let mut document = discovery_document(&mock_server);
    document["issuer"] = json!("https://evil.example");

    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(success_response(document))
        .mount(&mock_server)
        .await;

    let transport = Arc::new(ReqwestHttpTransport::new().expect("Failed to build transport"));
    let client = DefaultDiscoveryClient::new(transport);
    let domain = Url::parse(&mock_server.uri()).unwrap();

    let result = client.fetch(&domain).await;
    assert!(matches!(result, Err(DiscoveryError::IssuerMismatch { .. })));
}

#[tokio::test]
async fn test_start_uses_discovered_authorization_endpoint() {
    let mock_server = setup_mock_server().await;
    mount_discovery(&mock_server, 1).await;

    let (flow, _) = create_flow(config_builder(&mock_server).build().unwrap());
    let request = flow.start(AuthorizationParams::default()).await.unwrap();

    let url = Url::parse(&request.url).unwrap();
    assert_eq!(url.path(), "/authorize");

    let query: std::collections::HashMap<String, String> =
        url.query_pairs().into_owned().collect();
    assert_eq!(query["response_type"], "code");
    assert_eq!(query["client_id"], "test-client");
    assert_eq!(query["scope"], "openid email");
    assert_eq!(query["state"], request.state);
    assert_eq!(query["nonce"], request.nonce);
}

#[tokio::test]
async fn test_discovery_fetched_once_for_all_roles() {
    let mock_server = setup_mock_server().await;
    mount_discovery(&mock_server, 1).await;

    let (flow, _) = create_flow(config_builder(&mock_server).build().unwrap());
    let endpoints = flow.resolver().resolve_all().await.unwrap();

    assert_eq!(endpoints.userinfo, format!("{}/userinfo", mock_server.uri()));
    flow.resolver()
        .resolve(EndpointRole::Token)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_overrides_skip_discovery() {
    let mock_server = setup_mock_server().await;
    mount_discovery(&mock_server, 0).await;

    let config = config_builder(&mock_server)
        .authorization_endpoint("https://other.example/authorize")
        .token_endpoint("oauth/token")
        .userinfo_endpoint("/oauth/userinfo")
        .build()
        .unwrap();
    let (flow, _) = create_flow(config);

    let endpoints = flow.resolver().resolve_all().await.unwrap();

    assert_eq!(endpoints.authorization, "https://other.example/authorize");
    assert_eq!(endpoints.token, format!("{}/oauth/token", mock_server.uri()));
    assert_eq!(endpoints.userinfo, format!("{}/oauth/userinfo", mock_server.uri()));
}

#[tokio::test]
async fn test_discovery_server_error() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(error_response(503, json!({"error": "unavailable"})))
        .mount(&mock_server)
        .await;

    let (flow, _) = create_flow(config_builder(&mock_server).build().unwrap());
    let result = flow.start(AuthorizationParams::default()).await;

    assert!(matches!(
        result,
        Err(OidcError::Discovery(DiscoveryError::UnexpectedStatus { status: 503 }))
    ));
}
