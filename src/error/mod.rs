//! OIDC Error Types
//!
//! Error hierarchy for the relying-party authorization code flow.

use std::time::Duration;
use thiserror::Error;

use crate::types::EndpointRole;

/// Root error type for the OIDC integration.
#[derive(Error, Debug)]
pub enum OidcError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Callback error: {0}")]
    Callback(#[from] CallbackError),

    #[error("Token exchange error: {0}")]
    TokenExchange(#[from] TokenExchangeError),

    #[error("Userinfo error: {0}")]
    UserInfo(#[from] UserInfoError),
}

impl OidcError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "OIDC_CONFIG",
            Self::Discovery(_) => "OIDC_DISCOVERY",
            Self::Callback(CallbackError::Provider { .. }) => "OIDC_PROVIDER",
            Self::Callback(CallbackError::MissingCode) => "OIDC_MISSING_CODE",
            Self::Callback(CallbackError::StateMismatch) => "OIDC_STATE",
            Self::TokenExchange(_) => "OIDC_TOKEN",
            Self::UserInfo(_) => "OIDC_USERINFO",
        }
    }

    /// Whether the failure is attributable to the end user or the provider's
    /// explicit answer, as opposed to an internal fault.
    pub fn is_user_attributable(&self) -> bool {
        matches!(
            self,
            Self::Callback(CallbackError::Provider { .. }) | Self::Callback(CallbackError::MissingCode)
        )
    }
}

/// Configuration error, detected before any network call.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Missing required field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid provider domain: {domain:?}")]
    InvalidDomain { domain: Option<String> },

    #[error("Invalid {role} endpoint: {value}")]
    InvalidEndpoint { role: EndpointRole, value: String },
}

/// Discovery document fetch or parse failure.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Discovery request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Discovery request failed with status {status}")]
    UnexpectedStatus { status: u16 },

    #[error("Malformed discovery document: {message}")]
    Malformed { message: String },

    #[error("Issuer mismatch: expected {expected}, got {received}")]
    IssuerMismatch { expected: String, received: String },

    #[error("Discovery document has no {role} endpoint")]
    MissingEndpoint { role: EndpointRole },
}

/// Callback-level failure reported by (or about) the provider redirect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    #[error("Provider reported an error: {message}")]
    Provider { message: String },

    #[error("missing authorization code")]
    MissingCode,

    #[error("State parameter mismatch (possible CSRF attack)")]
    StateMismatch,
}

/// Authorization code exchange failure.
#[derive(Error, Debug)]
pub enum TokenExchangeError {
    #[error("Token request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Provider rejected the authorization code (HTTP {status}): {error}")]
    Rejected {
        status: u16,
        error: String,
        error_description: Option<String>,
    },

    #[error("Invalid token response: {message}")]
    InvalidResponse { message: String },
}

/// Userinfo fetch failure, primary or fallback.
#[derive(Error, Debug)]
pub enum UserInfoError {
    #[error("Userinfo request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Userinfo request to {endpoint} failed with status {status}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    #[error("Invalid userinfo response: {message}")]
    InvalidResponse { message: String },
}

/// Failure below the protocol layer.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Network/transport error.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Client setup failed: {message}")]
    ClientSetup { message: String },
}

/// Response framing error.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Unexpected redirect to: {location}")]
    UnexpectedRedirect { location: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },
}

/// Result type for OIDC operations.
pub type OidcResult<T> = Result<T, OidcError>;

/// OAuth2 error response body from the provider.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OAuth2ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_uri: Option<String>,
}

/// Parse error response from HTTP body.
pub fn parse_error_response(body: &str) -> Option<OAuth2ErrorResponse> {
    serde_json::from_str(body).ok()
}

/// Map a non-success token endpoint response to a rejection.
pub fn token_rejection(status: u16, body: &str) -> TokenExchangeError {
    match parse_error_response(body) {
        Some(response) => TokenExchangeError::Rejected {
            status,
            error: response.error,
            error_description: response.error_description,
        },
        None => TokenExchangeError::Rejected {
            status,
            error: format!("HTTP {}", status),
            error_description: None,
        },
    }
}
