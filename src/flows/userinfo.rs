//! UserInfo Retrieval
//!
//! Fetches subject claims with the access token. When a member-type claim is
//! configured but missing from the userinfo response, the subject's identity
//! URL from the token response is queried once more for that claim alone.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::instrument;

use crate::core::transport::{lock, HttpRequest, HttpTransport};
use crate::error::{NetworkError, TransportError, UserInfoError};
use crate::telemetry::AuditTrail;
use crate::types::{Claims, TokenResult, UserInfoResult};

/// UserInfo client interface (for dependency injection).
#[async_trait]
pub trait UserInfoClient: Send + Sync {
    /// Fetch raw claims from `endpoint` with a bearer access token.
    async fn fetch_claims(&self, endpoint: &str, access_token: &str)
        -> Result<Claims, UserInfoError>;
}

/// UserInfo client over HTTP.
pub struct DefaultUserInfoClient {
    transport: Arc<dyn HttpTransport>,
    timeout: Option<Duration>,
}

impl DefaultUserInfoClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            timeout: None,
        }
    }

    /// Override the transport's default timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl UserInfoClient for DefaultUserInfoClient {
    #[instrument(skip(self, access_token), level = "debug")]
    async fn fetch_claims(
        &self,
        endpoint: &str,
        access_token: &str,
    ) -> Result<Claims, UserInfoError> {
        let mut request = HttpRequest::get_json(endpoint)
            .header("authorization", format!("Bearer {}", access_token));
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(UserInfoError::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status: response.status,
            });
        }

        let claims: Map<String, Value> =
            serde_json::from_str(&response.body).map_err(|e| UserInfoError::InvalidResponse {
                message: e.to_string(),
            })?;

        Ok(Claims::new(claims))
    }
}

/// Userinfo result together with the audit record of its primary fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct RetrievedUserInfo {
    pub user_info: UserInfoResult,
    /// Identifier the audit sink assigned to the primary raw-claims record.
    pub audit_record_id: Option<String>,
}

/// Two-step userinfo retrieval.
pub struct UserInfoRetriever {
    client: Arc<dyn UserInfoClient>,
}

impl UserInfoRetriever {
    pub fn new(client: Arc<dyn UserInfoClient>) -> Self {
        Self { client }
    }

    /// Fetch and normalize claims for the token's subject.
    ///
    /// Issues one fetch, or two when `member_type_claim` is set, absent from
    /// the primary claims, and the token carries an identity URL with a
    /// host. Only the member type is read from the second response.
    pub async fn fetch_user_info(
        &self,
        endpoint: &str,
        token: &TokenResult,
        member_type_claim: Option<&str>,
        trail: &AuditTrail,
    ) -> Result<RetrievedUserInfo, UserInfoError> {
        let (claims, audit_record_id) = self.fetch_logged(endpoint, token, trail).await?;
        let mut user_info = UserInfoResult::from_claims(claims);

        if let Some(claim) = member_type_claim {
            user_info.member_type = user_info.raw.get_text(claim);

            if user_info.member_type.is_none() {
                if let Some(identity_url) = token.identity_endpoint() {
                    tracing::debug!(
                        claim,
                        identity_url = %identity_url,
                        "Member type missing from userinfo, querying identity URL"
                    );
                    let (alternate, _) =
                        self.fetch_logged(identity_url.as_str(), token, trail).await?;
                    user_info.member_type = alternate.get_text(claim);
                }
            }
        }

        Ok(RetrievedUserInfo {
            user_info,
            audit_record_id,
        })
    }

    async fn fetch_logged(
        &self,
        endpoint: &str,
        token: &TokenResult,
        trail: &AuditTrail,
    ) -> Result<(Claims, Option<String>), UserInfoError> {
        let claims = self
            .client
            .fetch_claims(endpoint, &token.access_token)
            .await?;

        let raw = serde_json::to_string(claims.as_map()).unwrap_or_default();
        let id = trail.info(format!("Raw userinfo from {}: {}", endpoint, raw));

        Ok((claims, id))
    }
}

/// Mock userinfo client for testing.
#[derive(Default)]
pub struct MockUserInfoClient {
    responses: Mutex<HashMap<String, Claims>>,
    failures: Mutex<HashMap<String, String>>,
    fetch_history: Mutex<Vec<String>>,
}

impl MockUserInfoClient {
    /// Create new mock userinfo client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the claims served at `endpoint`.
    pub fn set_claims(&self, endpoint: &str, claims: Value) -> &Self {
        let claims = match claims {
            Value::Object(map) => Claims::new(map),
            _ => Claims::default(),
        };
        lock(&self.responses).insert(endpoint.to_string(), claims);
        self
    }

    /// Make fetches against `endpoint` fail at the transport level.
    pub fn set_failure(&self, endpoint: &str, message: impl Into<String>) -> &Self {
        lock(&self.failures).insert(endpoint.to_string(), message.into());
        self
    }

    /// Endpoints fetched so far, in order.
    pub fn get_fetch_history(&self) -> Vec<String> {
        lock(&self.fetch_history).clone()
    }

    pub fn fetch_count(&self) -> usize {
        lock(&self.fetch_history).len()
    }
}

#[async_trait]
impl UserInfoClient for MockUserInfoClient {
    async fn fetch_claims(
        &self,
        endpoint: &str,
        _access_token: &str,
    ) -> Result<Claims, UserInfoError> {
        lock(&self.fetch_history).push(endpoint.to_string());

        if let Some(message) = lock(&self.failures).get(endpoint).cloned() {
            return Err(TransportError::from(NetworkError::ConnectionFailed { message }).into());
        }

        lock(&self.responses)
            .get(endpoint)
            .cloned()
            .ok_or_else(|| UserInfoError::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status: 404,
            })
    }
}
