//! OpenID Connect Flow
//!
//! Orchestrates one authentication attempt: the start leg that produces the
//! authorization redirect, and the callback leg that exchanges the code,
//! fetches userinfo and assembles the identity record.
//!
//! Every callback ends in exactly one [`FlowOutcome`]. Configuration,
//! discovery, exchange and userinfo failures are folded into
//! [`FlowOutcome::InternalError`]; nothing is retried.

use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

use crate::core::discovery::{DefaultDiscoveryClient, DiscoveryClient, MockDiscoveryClient};
use crate::core::endpoint::EndpointResolver;
use crate::core::state::state_matches;
use crate::core::transport::{lock, HttpTransport};
use crate::error::{CallbackError, OidcError};
use crate::flows::authorization::build_authorization_url;
use crate::flows::identity::assemble_identity;
use crate::flows::token::{DefaultTokenExchanger, MockTokenExchanger, TokenExchanger};
use crate::flows::userinfo::{
    DefaultUserInfoClient, MockUserInfoClient, RetrievedUserInfo, UserInfoClient,
    UserInfoRetriever,
};
use crate::telemetry::{AuditSink, AuditTrail, InMemoryAuditSink};
use crate::types::{
    AuthorizationParams, AuthorizationRequest, CallbackContext, CallbackParams, ClientConfig,
    EndpointRole, FlowOutcome, FlowState, IdentityRecord, TokenResult,
};

/// Provider-facing capabilities a flow calls out to.
#[derive(Clone)]
pub struct ProviderClients {
    pub discovery: Arc<dyn DiscoveryClient>,
    pub tokens: Arc<dyn TokenExchanger>,
    pub userinfo: Arc<dyn UserInfoClient>,
}

impl ProviderClients {
    /// HTTP-backed clients sharing one transport.
    pub fn http(transport: Arc<dyn HttpTransport>, config: &ClientConfig) -> Self {
        Self {
            discovery: Arc::new(
                DefaultDiscoveryClient::new(transport.clone()).with_timeout(config.timeout),
            ),
            tokens: Arc::new(DefaultTokenExchanger::new(transport.clone())),
            userinfo: Arc::new(DefaultUserInfoClient::new(transport).with_timeout(config.timeout)),
        }
    }
}

/// One authentication attempt against an OpenID Connect provider.
///
/// Create a fresh instance per attempt. The discovery document, token result
/// and userinfo result are computed at most once and kept for the lifetime
/// of the instance.
pub struct OpenIdConnectFlow {
    config: Arc<ClientConfig>,
    resolver: EndpointResolver,
    tokens: Arc<dyn TokenExchanger>,
    retriever: UserInfoRetriever,
    audit: Arc<dyn AuditSink>,
    token: OnceCell<TokenResult>,
    user_info: OnceCell<RetrievedUserInfo>,
    state: Mutex<FlowState>,
}

impl OpenIdConnectFlow {
    /// Create a flow with explicit provider clients.
    pub fn new(config: ClientConfig, clients: ProviderClients, audit: Arc<dyn AuditSink>) -> Self {
        let config = Arc::new(config);

        Self {
            resolver: EndpointResolver::new(config.clone(), clients.discovery),
            tokens: clients.tokens,
            retriever: UserInfoRetriever::new(clients.userinfo),
            config,
            audit,
            token: OnceCell::new(),
            user_info: OnceCell::new(),
            state: Mutex::new(FlowState::Start),
        }
    }

    /// Create a flow whose provider clients all speak HTTP over `transport`.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let clients = ProviderClients::http(transport, &config);
        Self::new(config, clients, audit)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Endpoint resolver backing this flow.
    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    /// Current orchestrator state.
    pub fn state(&self) -> FlowState {
        *lock(&self.state)
    }

    /// Start leg: build the authorization redirect.
    ///
    /// The returned state and nonce should be kept in the host's session and
    /// handed back through [`CallbackContext`].
    pub async fn start(&self, params: AuthorizationParams) -> Result<AuthorizationRequest, OidcError> {
        let endpoint = self.resolver.resolve(EndpointRole::Authorization).await?;
        let request = build_authorization_url(&endpoint, &self.config, params);

        self.transition(FlowState::AwaitingCallback);
        Ok(request)
    }

    /// Callback leg: turn the provider's redirect into a terminal outcome.
    ///
    /// Each terminal outcome is reported to the audit sink before it is
    /// returned.
    pub async fn handle_callback(
        &self,
        params: &CallbackParams,
        context: &CallbackContext,
    ) -> FlowOutcome {
        let trail = AuditTrail::new(
            self.audit.clone(),
            self.config.name.clone(),
            params.tenant_slug(context.origin.as_deref()),
        );

        self.transition(FlowState::AwaitingCallback);
        let outcome = self.run_callback(params, context, &trail).await;
        self.report(&outcome, &trail);
        self.transition(outcome.state());

        outcome
    }

    async fn run_callback(
        &self,
        params: &CallbackParams,
        context: &CallbackContext,
        trail: &AuditTrail,
    ) -> FlowOutcome {
        if let Some(message) = params.provider_error_message() {
            return FlowOutcome::ProviderError(message);
        }

        if let Some(expected) = context.expected_state.as_deref() {
            if !state_matches(expected, params.state.as_deref()) {
                return FlowOutcome::InternalError(CallbackError::StateMismatch.into());
            }
        }

        let Some(code) = params.code() else {
            return FlowOutcome::MissingCodeError;
        };

        match self.authenticate(code, params, trail).await {
            Ok(identity) => FlowOutcome::Success(Box::new(identity)),
            Err(err) => FlowOutcome::InternalError(err),
        }
    }

    async fn authenticate(
        &self,
        code: &str,
        params: &CallbackParams,
        trail: &AuditTrail,
    ) -> Result<IdentityRecord, OidcError> {
        self.transition(FlowState::Exchanging);
        let token = self.access_token(code).await?;

        self.transition(FlowState::FetchingUserInfo);
        let retrieved = self.user_info(token, trail).await?;

        Ok(assemble_identity(
            &self.config.name,
            &retrieved.user_info,
            token,
            params.redirect_uri.clone(),
            retrieved.audit_record_id.clone(),
        ))
    }

    /// Token result for this attempt, exchanging `code` on first use.
    ///
    /// Later calls return the stored result without contacting the provider.
    pub async fn access_token(&self, code: &str) -> Result<&TokenResult, OidcError> {
        self.token
            .get_or_try_init(|| async {
                let endpoint = self.resolver.resolve(EndpointRole::Token).await?;
                let token = self
                    .tokens
                    .exchange_code(&endpoint, code, &self.config)
                    .await?;
                Ok::<_, OidcError>(token)
            })
            .await
    }

    /// Userinfo for this attempt, fetched on first use.
    pub async fn user_info(
        &self,
        token: &TokenResult,
        trail: &AuditTrail,
    ) -> Result<&RetrievedUserInfo, OidcError> {
        self.user_info
            .get_or_try_init(|| async {
                let endpoint = self.resolver.resolve(EndpointRole::UserInfo).await?;
                let retrieved = self
                    .retriever
                    .fetch_user_info(
                        &endpoint,
                        token,
                        self.config.member_type_claim.as_deref(),
                        trail,
                    )
                    .await?;
                Ok::<_, OidcError>(retrieved)
            })
            .await
    }

    fn report(&self, outcome: &FlowOutcome, trail: &AuditTrail) {
        match outcome {
            FlowOutcome::Success(identity) => {
                tracing::debug!(provider = %identity.provider, "Authentication succeeded");
                trail.info(format!(
                    "authenticated uid={}",
                    identity.uid.as_deref().unwrap_or("")
                ));
            }
            FlowOutcome::ProviderError(message) => {
                tracing::warn!(message = %message, "Provider returned an error");
                trail.error(format!("Provider error: {}", message));
            }
            FlowOutcome::MissingCodeError => {
                tracing::warn!("Callback without authorization code");
                trail.error(CallbackError::MissingCode.to_string());
            }
            FlowOutcome::InternalError(err) => {
                tracing::warn!(code = err.error_code(), error = %err, "Authentication failed");
                trail.error(format!("[{}] {}", err.error_code(), err));
            }
        }
    }

    fn transition(&self, next: FlowState) {
        let mut state = lock(&self.state);
        let previous = *state;
        tracing::debug!(from = %previous, to = %next, "Flow state transition");
        *state = next;
    }
}

/// Mock provider clients and audit sink, with handles kept for assertions.
#[derive(Clone)]
pub struct MockProviders {
    pub discovery: Arc<MockDiscoveryClient>,
    pub tokens: Arc<MockTokenExchanger>,
    pub userinfo: Arc<MockUserInfoClient>,
    pub audit: Arc<InMemoryAuditSink>,
}

impl MockProviders {
    pub fn new() -> Self {
        Self {
            discovery: Arc::new(MockDiscoveryClient::new()),
            tokens: Arc::new(MockTokenExchanger::new()),
            userinfo: Arc::new(MockUserInfoClient::new()),
            audit: Arc::new(InMemoryAuditSink::new()),
        }
    }

    /// Provider clients backed by these mocks.
    pub fn clients(&self) -> ProviderClients {
        ProviderClients {
            discovery: self.discovery.clone(),
            tokens: self.tokens.clone(),
            userinfo: self.userinfo.clone(),
        }
    }
}

impl Default for MockProviders {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a flow backed entirely by mocks for testing.
pub fn create_mock_flow(config: ClientConfig) -> (OpenIdConnectFlow, MockProviders) {
    let mocks = MockProviders::new();
    let flow = OpenIdConnectFlow::new(config, mocks.clients(), mocks.audit.clone());
    (flow, mocks)
}
