//! Token Exchange
//!
//! Exchanges an authorization code at the token endpoint.

use async_trait::async_trait;
use base64::Engine;
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::instrument;

use crate::core::transport::{lock, HttpMethod, HttpRequest, HttpTransport};
use crate::error::{token_rejection, NetworkError, TokenExchangeError, TransportError};
use crate::types::{ClientAuthMethod, ClientConfig, TokenResponse, TokenResult};

/// Token exchange interface (for dependency injection).
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Exchange `code` for tokens at `token_endpoint`.
    async fn exchange_code(
        &self,
        token_endpoint: &str,
        code: &str,
        config: &ClientConfig,
    ) -> Result<TokenResult, TokenExchangeError>;
}

/// Token exchange over HTTP.
pub struct DefaultTokenExchanger {
    transport: Arc<dyn HttpTransport>,
}

impl DefaultTokenExchanger {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    fn build_request_body(code: &str, config: &ClientConfig) -> String {
        let mut params = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("redirect_uri", config.redirect_uri.clone()),
            ("client_id", config.client_id.clone()),
        ];

        if config.auth_method == ClientAuthMethod::ClientSecretPost {
            if let Some(secret) = &config.client_secret {
                params.push(("client_secret", secret.expose_secret().to_string()));
            }
        }

        params
            .into_iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(&v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn build_request_headers(config: &ClientConfig) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        headers.insert("accept".to_string(), "application/json".to_string());

        if config.auth_method == ClientAuthMethod::ClientSecretBasic {
            if let Some(secret) = &config.client_secret {
                let credentials = format!(
                    "{}:{}",
                    form_encode(&config.client_id),
                    form_encode(secret.expose_secret())
                );
                let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
                headers.insert("authorization".to_string(), format!("Basic {}", encoded));
            }
        }

        headers
    }

    /// Parse a successful token endpoint body.
    pub fn parse_token_body(body: &str) -> Result<TokenResult, TokenExchangeError> {
        let invalid = |message: String| TokenExchangeError::InvalidResponse { message };

        let raw: Map<String, Value> =
            serde_json::from_str(body).map_err(|e| invalid(e.to_string()))?;
        let response: TokenResponse = serde_json::from_value(Value::Object(raw.clone()))
            .map_err(|e| invalid(e.to_string()))?;

        if response.access_token.is_empty() {
            return Err(invalid("empty access_token".to_string()));
        }

        Ok(TokenResult::from_response(response, raw))
    }
}

/// Form-encode a Basic credential part (RFC 6749 section 2.3.1).
fn form_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[async_trait]
impl TokenExchanger for DefaultTokenExchanger {
    #[instrument(skip(self, code, config), fields(client_id = %config.client_id), level = "debug")]
    async fn exchange_code(
        &self,
        token_endpoint: &str,
        code: &str,
        config: &ClientConfig,
    ) -> Result<TokenResult, TokenExchangeError> {
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: token_endpoint.to_string(),
            headers: Self::build_request_headers(config),
            body: Some(Self::build_request_body(code, config)),
            timeout: Some(config.timeout),
        };

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(token_rejection(response.status, &response.body));
        }

        Self::parse_token_body(&response.body)
    }
}

/// Mock token exchanger for testing.
#[derive(Default)]
pub struct MockTokenExchanger {
    exchange_history: Mutex<Vec<String>>,
    next_body: Mutex<Option<String>>,
    next_failure: Mutex<Option<String>>,
}

impl MockTokenExchanger {
    /// Create new mock exchanger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token endpoint body returned by the next exchange.
    pub fn set_next_response(&self, body: serde_json::Value) -> &Self {
        *lock(&self.next_body) = Some(body.to_string());
        self
    }

    /// Make the next exchange fail at the transport level.
    pub fn set_next_failure(&self, message: impl Into<String>) -> &Self {
        *lock(&self.next_failure) = Some(message.into());
        self
    }

    /// Codes exchanged so far.
    pub fn get_exchange_history(&self) -> Vec<String> {
        lock(&self.exchange_history).clone()
    }

    pub fn exchange_count(&self) -> usize {
        lock(&self.exchange_history).len()
    }
}

#[async_trait]
impl TokenExchanger for MockTokenExchanger {
    async fn exchange_code(
        &self,
        _token_endpoint: &str,
        code: &str,
        _config: &ClientConfig,
    ) -> Result<TokenResult, TokenExchangeError> {
        lock(&self.exchange_history).push(code.to_string());

        if let Some(message) = lock(&self.next_failure).take() {
            return Err(TransportError::from(NetworkError::ConnectionFailed { message }).into());
        }

        let body = lock(&self.next_body).take().unwrap_or_else(|| {
            serde_json::json!({
                "access_token": "mock-access-token",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "mock-refresh-token"
            })
            .to_string()
        });

        DefaultTokenExchanger::parse_token_body(&body)
    }
}
