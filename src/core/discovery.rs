//! OIDC Discovery
//!
//! Fetching the provider's `/.well-known/openid-configuration` document, and
//! the per-flow memo around it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::instrument;
use url::Url;

use crate::core::transport::{lock, HttpRequest, HttpTransport};
use crate::error::DiscoveryError;
use crate::types::DiscoveryDocument;

/// Well-known path of the discovery document under the provider domain.
pub const DISCOVERY_PATH: &str = ".well-known/openid-configuration";

/// Discovery client interface (for dependency injection).
#[async_trait]
pub trait DiscoveryClient: Send + Sync {
    /// Fetch the discovery document published under `domain`.
    async fn fetch(&self, domain: &Url) -> Result<DiscoveryDocument, DiscoveryError>;
}

/// Discovery over HTTP.
pub struct DefaultDiscoveryClient {
    transport: Arc<dyn HttpTransport>,
    timeout: Option<Duration>,
}

impl DefaultDiscoveryClient {
    /// Create new discovery client.
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

    fn normalize_issuer(issuer: &str) -> &str {
        issuer.trim_end_matches('/')
    }

    /// Discovery document URL for a provider domain.
    pub fn discovery_url(domain: &Url) -> String {
        format!("{}/{}", Self::normalize_issuer(domain.as_str()), DISCOVERY_PATH)
    }
}

#[async_trait]
impl DiscoveryClient for DefaultDiscoveryClient {
    #[instrument(skip(self, domain), fields(domain = %domain), level = "debug")]
    async fn fetch(&self, domain: &Url) -> Result<DiscoveryDocument, DiscoveryError> {
        let mut request = HttpRequest::get_json(Self::discovery_url(domain));
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = self.transport.send(request).await?;

        if response.status != 200 {
            return Err(DiscoveryError::UnexpectedStatus {
                status: response.status,
            });
        }

        let document: DiscoveryDocument =
            serde_json::from_str(&response.body).map_err(|e| DiscoveryError::Malformed {
                message: e.to_string(),
            })?;

        if document.authorization_endpoint.is_empty() || document.token_endpoint.is_empty() {
            return Err(DiscoveryError::Malformed {
                message: "Discovery document missing required endpoints".to_string(),
            });
        }

        let expected = Self::normalize_issuer(domain.as_str());
        let received = Self::normalize_issuer(&document.issuer);
        if received != expected {
            return Err(DiscoveryError::IssuerMismatch {
                expected: expected.to_string(),
                received: received.to_string(),
            });
        }

        tracing::debug!(issuer = %document.issuer, "Fetched discovery document");

        Ok(document)
    }
}

/// Discovery document memoized for one flow instance.
///
/// The first successful fetch is kept for the lifetime of the instance and
/// never refetched. A failed fetch is not stored.
pub struct DiscoveryCache {
    client: Arc<dyn DiscoveryClient>,
    document: OnceCell<DiscoveryDocument>,
}

impl DiscoveryCache {
    pub fn new(client: Arc<dyn DiscoveryClient>) -> Self {
        Self {
            client,
            document: OnceCell::new(),
        }
    }

    /// Discovery document for `domain`, fetching it on first use.
    pub async fn discover(&self, domain: &Url) -> Result<&DiscoveryDocument, DiscoveryError> {
        self.document
            .get_or_try_init(|| self.client.fetch(domain))
            .await
    }

    /// Document fetched so far, if any.
    pub fn get(&self) -> Option<&DiscoveryDocument> {
        self.document.get()
    }
}

/// Mock discovery client for testing.
#[derive(Default)]
pub struct MockDiscoveryClient {
    documents: Mutex<HashMap<String, DiscoveryDocument>>,
    fetch_history: Mutex<Vec<String>>,
}

impl MockDiscoveryClient {
    /// Create new mock discovery client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set discovery document for a domain.
    pub fn set_document(&self, domain: &str, document: DiscoveryDocument) -> &Self {
        lock(&self.documents).insert(domain.trim_end_matches('/').to_string(), document);
        self
    }

    /// Get fetch history.
    pub fn get_fetch_history(&self) -> Vec<String> {
        lock(&self.fetch_history).clone()
    }

    /// Number of fetches performed.
    pub fn fetch_count(&self) -> usize {
        lock(&self.fetch_history).len()
    }
}

#[async_trait]
impl DiscoveryClient for MockDiscoveryClient {
    async fn fetch(&self, domain: &Url) -> Result<DiscoveryDocument, DiscoveryError> {
        let key = domain.as_str().trim_end_matches('/').to_string();
        lock(&self.fetch_history).push(key.clone());

        lock(&self.documents)
            .get(&key)
            .cloned()
            .ok_or_else(|| DiscoveryError::Malformed {
                message: format!("No mock document for domain: {}", key),
            })
    }
}

/// Create mock discovery document for testing.
pub fn create_mock_discovery_document(issuer: &str) -> DiscoveryDocument {
    DiscoveryDocument {
        issuer: issuer.to_string(),
        authorization_endpoint: format!("{}/authorize", issuer),
        token_endpoint: format!("{}/token", issuer),
        userinfo_endpoint: Some(format!("{}/userinfo", issuer)),
        jwks_uri: Some(format!("{}/.well-known/jwks.json", issuer)),
        scopes_supported: vec!["openid".to_string(), "profile".to_string(), "email".to_string()],
        response_types_supported: vec!["code".to_string()],
        claims_supported: Vec::new(),
    }
}
