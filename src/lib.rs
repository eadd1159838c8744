//! OpenID Connect Integration Module
//!
//! Relying-party side of the OpenID Connect authorization code flow.
//!
//! # Features
//!
//! - OIDC Discovery, fetched at most once per flow
//! - Per-role endpoint resolution: full URL, domain-relative path or discovery
//! - Authorization redirect with CSRF state and nonce
//! - Authorization code exchange (`client_secret_basic`, `client_secret_post`, `none`)
//! - UserInfo retrieval with identity URL fallback for a member-type claim
//! - Callback state machine with a single terminal outcome per attempt
//! - Audit records for every raw userinfo fetch and terminal outcome
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use oidc_integration::{
//!     client_config, AuthorizationParams, CallbackContext, CallbackParams, FlowOutcome,
//!     OpenIdConnectFlow, ReqwestHttpTransport, TracingAuditSink,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = client_config()
//!         .client_id("my-client-id")
//!         .client_secret("my-client-secret")
//!         .redirect_uri("https://myapp.com/auth/callback")
//!         .domain("https://idp.example")
//!         .add_scope("openid")
//!         .add_scope("email")
//!         .build()?;
//!
//!     let transport = Arc::new(ReqwestHttpTransport::new()?);
//!
//!     // Start leg: redirect the user agent, keep state in the session.
//!     let flow = OpenIdConnectFlow::with_transport(
//!         config.clone(),
//!         transport.clone(),
//!         Arc::new(TracingAuditSink),
//!     );
//!     let request = flow.start(AuthorizationParams::default()).await?;
//!     println!("Redirect to: {}", request.url);
//!
//!     // Callback leg, on a fresh flow instance.
//!     let flow = OpenIdConnectFlow::with_transport(config, transport, Arc::new(TracingAuditSink));
//!     let params = CallbackParams::from_url_str("https://myapp.com/auth/callback?code=abc&state=xyz")?;
//!     let context = CallbackContext {
//!         expected_state: Some(request.state),
//!         ..Default::default()
//!     };
//!
//!     match flow.handle_callback(&params, &context).await {
//!         FlowOutcome::Success(identity) => println!("Signed in: {:?}", identity.uid),
//!         other => println!("Authentication failed: {:?}", other),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: configuration, callback, token, userinfo and identity types
//! - `error`: error hierarchy, one enum per concern under [`OidcError`]
//! - `core`: HTTP transport, discovery, endpoint resolution, state and nonce
//! - `flows`: authorization request, token exchange, userinfo, identity assembly
//!   and the [`OpenIdConnectFlow`] orchestrator
//! - `builders`: fluent builder for [`ClientConfig`]
//! - `telemetry`: audit sink the flow reports to

pub mod builders;
pub mod core;
pub mod error;
pub mod flows;
pub mod telemetry;
pub mod types;

// Re-export builders
pub use builders::{client_config, ClientConfigBuilder};

// Re-export errors
pub use error::{
    parse_error_response, CallbackError, ConfigurationError, DiscoveryError, NetworkError,
    OAuth2ErrorResponse, OidcError, OidcResult, ProtocolError, TokenExchangeError,
    TransportError, UserInfoError,
};

// Re-export types
pub use types::{
    // Config
    ClientAuthMethod, ClientConfig, DiscoveryDocument, EndpointRole, ResolvedEndpoints,
    // Auth
    AuthorizationParams, AuthorizationRequest, Prompt,
    // Callback
    CallbackContext, CallbackParams,
    // Token
    TokenResponse, TokenResult,
    // UserInfo
    Claims, UserInfoResult,
    // Identity
    FlowOutcome, FlowState, IdentityCredentials, IdentityExtra, IdentityInfo, IdentityRecord,
};

// Re-export core components
pub use core::{
    // Transport
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport,
    // Discovery
    create_mock_discovery_document, DefaultDiscoveryClient, DiscoveryCache, DiscoveryClient,
    MockDiscoveryClient,
    // Endpoints
    classify_override, EndpointOverride, EndpointResolver,
    // State
    generate_nonce, generate_state,
};

// Re-export flows
pub use flows::{
    // Authorization
    build_authorization_url,
    // Token
    DefaultTokenExchanger, MockTokenExchanger, TokenExchanger,
    // UserInfo
    DefaultUserInfoClient, MockUserInfoClient, RetrievedUserInfo, UserInfoClient,
    UserInfoRetriever,
    // Identity
    assemble_identity,
    // Orchestrator
    create_mock_flow, MockProviders, OpenIdConnectFlow, ProviderClients,
};

// Re-export telemetry
pub use telemetry::{
    AuditEntry, AuditRecord, AuditSink, AuditTrail, InMemoryAuditSink, LogLevel, NoOpAuditSink,
    TracingAuditSink,
};
