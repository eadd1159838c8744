//! Configuration Types
//!
//! Relying-party client configuration and provider metadata.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::ConfigurationError;

/// Default provider name reported in identity records.
pub const DEFAULT_PROVIDER_NAME: &str = "open_id_connect";
/// Default response type for the authorization code flow.
pub const DEFAULT_RESPONSE_TYPE: &str = "code";
/// Scope every OpenID Connect request must carry.
pub const OPENID_SCOPE: &str = "openid";
/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Relying-party client configuration.
///
/// Supplied by the host before any flow begins and immutable for the lifetime
/// of a flow instance. Endpoint overrides are kept as raw strings; the
/// endpoint resolver decides whether each is a full URL, a path relative to
/// `domain`, or unset.
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Provider name used in identity records.
    #[serde(default = "default_name")]
    pub name: String,
    /// Client identifier.
    pub client_id: String,
    /// Client secret (for confidential clients).
    #[serde(default)]
    pub client_secret: Option<SecretString>,
    /// Client authentication method at the token endpoint.
    #[serde(default)]
    pub auth_method: ClientAuthMethod,
    /// Redirect URI registered with the provider.
    pub redirect_uri: String,
    /// Provider domain, e.g. `https://idp.example`.
    #[serde(default)]
    pub domain: Option<String>,
    /// Authorization endpoint override.
    #[serde(default)]
    pub authorization_endpoint: Option<String>,
    /// Token endpoint override.
    #[serde(default)]
    pub token_endpoint: Option<String>,
    /// Userinfo endpoint override.
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    /// Requested scopes, in order.
    #[serde(default = "default_scope")]
    pub scope: Vec<String>,
    /// Response type.
    #[serde(default = "default_response_type")]
    pub response_type: String,
    /// Display parameter passed through to the provider.
    #[serde(default)]
    pub display: Option<String>,
    /// Claim carrying the member type, if the host needs one.
    #[serde(default)]
    pub member_type_claim: Option<String>,
    /// HTTP timeout.
    #[serde(default = "default_timeout", deserialize_with = "deserialize_secs")]
    pub timeout: Duration,
}

fn default_name() -> String {
    DEFAULT_PROVIDER_NAME.to_string()
}

fn default_scope() -> Vec<String> {
    vec![OPENID_SCOPE.to_string()]
}

fn default_response_type() -> String {
    DEFAULT_RESPONSE_TYPE.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

fn deserialize_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

impl ClientConfig {
    /// Parse configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            ConfigurationError::InvalidConfig {
                message: e.to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every flow relies on.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired {
                field: "client_id".to_string(),
            });
        }

        if self.redirect_uri.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired {
                field: "redirect_uri".to_string(),
            });
        }

        if !self.scope.iter().any(|s| s == OPENID_SCOPE) {
            return Err(ConfigurationError::InvalidConfig {
                message: format!("scope must include `{}`", OPENID_SCOPE),
            });
        }

        if self.response_type.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired {
                field: "response_type".to_string(),
            });
        }

        if self.auth_method.requires_secret() && self.client_secret.is_none() {
            return Err(ConfigurationError::MissingRequired {
                field: "client_secret".to_string(),
            });
        }

        Ok(())
    }

    /// Raw override configured for a role, if any.
    pub fn endpoint_override(&self, role: EndpointRole) -> Option<&str> {
        match role {
            EndpointRole::Authorization => self.authorization_endpoint.as_deref(),
            EndpointRole::Token => self.token_endpoint.as_deref(),
            EndpointRole::UserInfo => self.userinfo_endpoint.as_deref(),
        }
    }

    /// Scope as sent on the wire.
    pub fn scope_param(&self) -> String {
        self.scope.join(" ")
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_method", &self.auth_method)
            .field("redirect_uri", &self.redirect_uri)
            .field("domain", &self.domain)
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("userinfo_endpoint", &self.userinfo_endpoint)
            .field("scope", &self.scope)
            .field("response_type", &self.response_type)
            .field("display", &self.display)
            .field("member_type_claim", &self.member_type_claim)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Client authentication method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
    /// client_id and client_secret in request body.
    ClientSecretPost,
    /// HTTP Basic Authentication header.
    #[default]
    ClientSecretBasic,
    /// No client authentication (public client).
    None,
}

impl ClientAuthMethod {
    pub fn requires_secret(&self) -> bool {
        matches!(self, Self::ClientSecretBasic | Self::ClientSecretPost)
    }
}

/// The three provider endpoints a flow talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointRole {
    Authorization,
    Token,
    UserInfo,
}

impl EndpointRole {
    pub const ALL: [EndpointRole; 3] = [Self::Authorization, Self::Token, Self::UserInfo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Token => "token",
            Self::UserInfo => "userinfo",
        }
    }
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete endpoint URLs used by a flow instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedEndpoints {
    pub authorization: String,
    pub token: String,
    pub userinfo: String,
}

/// OIDC Discovery document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiscoveryDocument {
    /// Issuer identifier.
    pub issuer: String,
    /// Authorization endpoint URL.
    pub authorization_endpoint: String,
    /// Token endpoint URL.
    pub token_endpoint: String,
    /// Userinfo endpoint (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,
    /// JWKS URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,
    /// Supported scopes.
    #[serde(default)]
    pub scopes_supported: Vec<String>,
    /// Supported response types.
    #[serde(default)]
    pub response_types_supported: Vec<String>,
    /// Supported claims.
    #[serde(default)]
    pub claims_supported: Vec<String>,
}

impl DiscoveryDocument {
    /// Endpoint published for a role, if any.
    pub fn endpoint(&self, role: EndpointRole) -> Option<&str> {
        let value = match role {
            EndpointRole::Authorization => Some(self.authorization_endpoint.as_str()),
            EndpointRole::Token => Some(self.token_endpoint.as_str()),
            EndpointRole::UserInfo => self.userinfo_endpoint.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}
