//! Token Types
//!
//! Token endpoint response and the per-flow token result.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

/// Token response from the provider's token endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type (usually "Bearer").
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expires in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
    /// ID token (OIDC).
    #[serde(default)]
    pub id_token: Option<String>,
    /// Additional fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Result of one successful code exchange.
///
/// Created once per flow instance and never mutated afterwards.
#[derive(Clone)]
pub struct TokenResult {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: Option<String>,
    /// Lifetime in seconds, as returned by the provider.
    pub expires_in: Option<u64>,
    /// Absolute expiry computed at exchange time.
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    pub id_token: Option<String>,
    /// Every attribute the provider returned, including the standard ones.
    pub raw: Map<String, Value>,
    /// Subject identity URL, from the raw `id` attribute.
    pub identity_url: Option<Url>,
}

impl TokenResult {
    /// Build from a parsed token response and the raw body it came from.
    pub fn from_response(response: TokenResponse, raw: Map<String, Value>) -> Self {
        Self::from_response_at(response, raw, Utc::now())
    }

    pub(crate) fn from_response_at(
        response: TokenResponse,
        raw: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Self {
        let expires_at = response
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime));

        let identity_url = raw
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| Url::parse(id).ok());

        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
            expires_at,
            scope: response.scope,
            id_token: response.id_token,
            raw,
            identity_url,
        }
    }

    /// Identity URL usable as an alternate userinfo endpoint.
    pub fn identity_endpoint(&self) -> Option<&Url> {
        self.identity_url
            .as_ref()
            .filter(|url| url.host_str().is_some_and(|h| !h.is_empty()))
    }

    /// Whether the provider reported an expiry.
    pub fn expires(&self) -> bool {
        self.expires_in.is_some()
    }
}

impl std::fmt::Debug for TokenResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResult")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .field("identity_url", &self.identity_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> TokenResult {
        let raw: Map<String, Value> = serde_json::from_str(json).unwrap();
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        TokenResult::from_response(response, raw)
    }

    #[test]
    fn test_token_result_from_response() {
        let token = parse(
            r#"{
                "access_token": "T",
                "refresh_token": "R",
                "expires_in": 3600,
                "scope": "openid profile"
            }"#,
        );

        assert_eq!(token.access_token, "T");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.refresh_token.as_deref(), Some("R"));
        assert_eq!(token.expires_in, Some(3600));
        assert!(token.expires());
        assert!(token.expires_at.is_some());
        assert!(token.identity_url.is_none());
        assert_eq!(token.raw.get("access_token"), Some(&Value::from("T")));
    }

    #[test]
    fn test_expires_at_offset() {
        let now = Utc::now();
        let raw = Map::new();
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"T","expires_in":60}"#).unwrap();
        let token = TokenResult::from_response_at(response, raw, now);
        assert_eq!(token.expires_at, Some(now + Duration::seconds(60)));
    }

    #[test]
    fn test_expires_at_out_of_range() {
        for expires_in in [u64::MAX, i64::MAX as u64, i64::MAX as u64 / 1000 + 1] {
            let response: TokenResponse = serde_json::from_value(serde_json::json!({
                "access_token": "T",
                "expires_in": expires_in
            }))
            .unwrap();
            let token = TokenResult::from_response(response, Map::new());

            assert_eq!(token.expires_in, Some(expires_in));
            assert!(token.expires());
            assert!(token.expires_at.is_none());
        }
    }

    #[test]
    fn test_identity_url_from_raw_id() {
        let token = parse(
            r#"{"access_token":"T","id":"https://login.idp.example/id/00D/005"}"#,
        );
        let endpoint = token.identity_endpoint().unwrap();
        assert_eq!(endpoint.host_str(), Some("login.idp.example"));
    }

    #[test]
    fn test_identity_url_without_host_is_ignored() {
        let token = parse(r#"{"access_token":"T","id":"urn:user:42"}"#);
        assert!(token.identity_url.is_some());
        assert!(token.identity_endpoint().is_none());

        let token = parse(r#"{"access_token":"T","id":"not a url"}"#);
        assert!(token.identity_url.is_none());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let token = parse(r#"{"access_token":"secret-at","refresh_token":"secret-rt"}"#);
        let rendered = format!("{:?}", token);
        assert!(!rendered.contains("secret-at"));
        assert!(!rendered.contains("secret-rt"));
    }
}
