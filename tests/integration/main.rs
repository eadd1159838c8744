//! Integration tests using WireMock
//!
//! These tests drive the full relying-party flow against a mock provider over
//! real HTTP: discovery, authorization redirect, code exchange and userinfo.

mod callback;
mod discovery;

use oidc_integration::{
    client_config, ClientConfig, ClientConfigBuilder, InMemoryAuditSink, OpenIdConnectFlow,
    ReqwestHttpTransport,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to start a mock provider.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Discovery document whose issuer and endpoints live on the mock server.
pub fn discovery_document(server: &MockServer) -> serde_json::Value {
    let issuer = server.uri();
    json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{}/authorize", issuer),
        "token_endpoint": format!("{}/token", issuer),
        "userinfo_endpoint": format!("{}/userinfo", issuer),
        "jwks_uri": format!("{}/.well-known/jwks.json", issuer),
        "scopes_supported": ["openid", "profile", "email"],
        "response_types_supported": ["code"]
    })
}

/// Mount the discovery document, expecting exactly `times` fetches.
pub async fn mount_discovery(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(success_response(discovery_document(server)))
        .expect(times)
        .mount(server)
        .await;
}

/// Configuration builder pointed at the mock server.
pub fn config_builder(server: &MockServer) -> ClientConfigBuilder {
    client_config()
        .client_id("test-client")
        .client_secret("test-secret")
        .redirect_uri("https://app.example/auth/callback")
        .domain(server.uri())
        .add_scope("openid")
        .add_scope("email")
}

/// Flow over a real reqwest transport.
pub fn create_flow(config: ClientConfig) -> (OpenIdConnectFlow, Arc<InMemoryAuditSink>) {
    let transport = Arc::new(ReqwestHttpTransport::new().expect("Failed to build transport"));
    let audit = Arc::new(InMemoryAuditSink::new());
    let flow = OpenIdConnectFlow::with_transport(config, transport, audit.clone());
    (flow, audit)
}

/// Helper to create error response templates
pub fn error_response(status: u16, error_body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(error_body)
}

/// Helper to create success response templates
pub fn success_response(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}
