//! Configuration Builder
//!
//! Fluent builder for [`ClientConfig`].

use secrecy::SecretString;
use std::time::Duration;

use crate::error::ConfigurationError;
use crate::types::{
    ClientAuthMethod, ClientConfig, DEFAULT_PROVIDER_NAME, DEFAULT_RESPONSE_TYPE,
    DEFAULT_TIMEOUT_SECS, OPENID_SCOPE,
};

/// Client configuration builder.
#[derive(Default)]
pub struct ClientConfigBuilder {
    name: Option<String>,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    auth_method: Option<ClientAuthMethod>,
    redirect_uri: Option<String>,
    domain: Option<String>,
    authorization_endpoint: Option<String>,
    token_endpoint: Option<String>,
    userinfo_endpoint: Option<String>,
    scope: Vec<String>,
    response_type: Option<String>,
    display: Option<String>,
    member_type_claim: Option<String>,
    timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set provider name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Set client authentication method.
    pub fn auth_method(mut self, method: ClientAuthMethod) -> Self {
        self.auth_method = Some(method);
        self
    }

    /// Set redirect URI.
    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Set provider domain.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Override the authorization endpoint (full URL or path).
    pub fn authorization_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.authorization_endpoint = Some(endpoint.into());
        self
    }

    /// Override the token endpoint (full URL or path).
    pub fn token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = Some(endpoint.into());
        self
    }

    /// Override the userinfo endpoint (full URL or path).
    pub fn userinfo_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.userinfo_endpoint = Some(endpoint.into());
        self
    }

    /// Set requested scopes.
    pub fn scope(mut self, scopes: Vec<String>) -> Self {
        self.scope = scopes;
        self
    }

    /// Add a scope, keeping order and skipping duplicates.
    pub fn add_scope(mut self, scope: impl Into<String>) -> Self {
        let scope = scope.into();
        if !self.scope.contains(&scope) {
            self.scope.push(scope);
        }
        self
    }

    /// Set response type.
    pub fn response_type(mut self, response_type: impl Into<String>) -> Self {
        self.response_type = Some(response_type.into());
        self
    }

    /// Set display parameter.
    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Set the claim holding the member type.
    pub fn member_type_claim(mut self, claim: impl Into<String>) -> Self {
        self.member_type_claim = Some(claim.into());
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<ClientConfig, ConfigurationError> {
        let client_id = self.client_id.ok_or_else(|| ConfigurationError::MissingRequired {
            field: "client_id".to_string(),
        })?;

        let redirect_uri = self
            .redirect_uri
            .ok_or_else(|| ConfigurationError::MissingRequired {
                field: "redirect_uri".to_string(),
            })?;

        let scope = if self.scope.is_empty() {
            vec![OPENID_SCOPE.to_string()]
        } else {
            self.scope
        };

        let config = ClientConfig {
            name: self.name.unwrap_or_else(|| DEFAULT_PROVIDER_NAME.to_string()),
            client_id,
            client_secret: self.client_secret,
            auth_method: self.auth_method.unwrap_or_default(),
            redirect_uri,
            domain: self.domain,
            authorization_endpoint: self.authorization_endpoint,
            token_endpoint: self.token_endpoint,
            userinfo_endpoint: self.userinfo_endpoint,
            scope,
            response_type: self
                .response_type
                .unwrap_or_else(|| DEFAULT_RESPONSE_TYPE.to_string()),
            display: self.display,
            member_type_claim: self.member_type_claim,
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Create a new client configuration builder.
pub fn client_config() -> ClientConfigBuilder {
    ClientConfigBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ClientConfigBuilder {
        client_config()
            .client_id("test-client")
            .client_secret("test-secret")
            .redirect_uri("https://app.example/callback")
    }

    #[test]
    fn test_builder_success() {
        let config = base()
            .domain("https://idp.example")
            .add_scope("openid")
            .add_scope("profile")
            .add_scope("openid")
            .display("popup")
            .member_type_claim("member_type")
            .build()
            .unwrap();

        assert_eq!(config.client_id, "test-client");
        assert_eq!(config.scope, vec!["openid", "profile"]);
        assert_eq!(config.response_type, "code");
        assert_eq!(config.name, "open_id_connect");
        assert_eq!(config.display.as_deref(), Some("popup"));
        assert_eq!(config.member_type_claim.as_deref(), Some("member_type"));
    }

    #[test]
    fn test_builder_default_scope_is_openid() {
        let config = base().build().unwrap();
        assert_eq!(config.scope, vec!["openid"]);
    }

    #[test]
    fn test_builder_missing_client_id() {
        let result = client_config()
            .client_secret("test-secret")
            .redirect_uri("https://app.example/callback")
            .build();

        assert!(matches!(
            result,
            Err(ConfigurationError::MissingRequired { field }) if field == "client_id"
        ));
    }

    #[test]
    fn test_builder_scope_without_openid() {
        let result = base().add_scope("profile").build();
        assert!(matches!(result, Err(ConfigurationError::InvalidConfig { .. })));
    }

    #[test]
    fn test_builder_missing_secret_with_basic_auth() {
        let result = client_config()
            .client_id("test-client")
            .redirect_uri("https://app.example/callback")
            .auth_method(ClientAuthMethod::ClientSecretBasic)
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_builder_no_secret_required_for_none_auth() {
        let config = client_config()
            .client_id("test-client")
            .redirect_uri("https://app.example/callback")
            .auth_method(ClientAuthMethod::None)
            .build()
            .unwrap();

        assert!(config.client_secret.is_none());
    }

    #[test]
    fn test_builder_does_not_require_domain() {
        let config = base().domain("not a url").build().unwrap();
        assert_eq!(config.domain.as_deref(), Some("not a url"));
    }
}
