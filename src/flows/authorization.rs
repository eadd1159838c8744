//! Authorization Request
//!
//! Builds the redirect URL that starts the authorization code flow.

use crate::core::state::{generate_nonce, generate_state};
use crate::types::{AuthorizationParams, AuthorizationRequest, ClientConfig};

/// Build the authorization redirect for `authorization_endpoint`.
///
/// Pure construction: no network access. `display` is passed through as an
/// opaque value. Extra parameters never replace the protocol parameters.
pub fn build_authorization_url(
    authorization_endpoint: &str,
    config: &ClientConfig,
    params: AuthorizationParams,
) -> AuthorizationRequest {
    let state = params.state.unwrap_or_else(generate_state);
    let nonce = params.nonce.unwrap_or_else(generate_nonce);

    let mut query: Vec<(String, String)> = vec![
        ("response_type".to_string(), config.response_type.clone()),
        ("client_id".to_string(), config.client_id.clone()),
        ("redirect_uri".to_string(), config.redirect_uri.clone()),
        ("scope".to_string(), config.scope_param()),
        ("state".to_string(), state.clone()),
        ("nonce".to_string(), nonce.clone()),
    ];

    if let Some(display) = params.display.or_else(|| config.display.clone()) {
        query.push(("display".to_string(), display));
    }
    if let Some(prompt) = params.prompt {
        query.push(("prompt".to_string(), prompt.as_str().to_string()));
    }
    if let Some(login_hint) = params.login_hint {
        query.push(("login_hint".to_string(), login_hint));
    }

    for (key, value) in params.extra_params {
        if !query.iter().any(|(k, _)| *k == key) {
            query.push((key, value));
        }
    }

    let encoded = query
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if authorization_endpoint.contains('?') {
        '&'
    } else {
        '?'
    };

    AuthorizationRequest {
        url: format!("{}{}{}", authorization_endpoint, separator, encoded),
        state,
        nonce,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::client_config;
    use crate::types::{CallbackParams, Prompt};
    use std::collections::HashMap;
    use url::Url;

    fn config() -> ClientConfig {
        client_config()
            .client_id("client-1")
            .client_secret("secret-1")
            .redirect_uri("https://app.example/auth/callback")
            .add_scope("openid")
            .add_scope("email")
            .display("page")
            .build()
            .unwrap()
    }

    fn query_of(url: &str) -> HashMap<String, String> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    #[test]
    fn test_build_authorization_url() {
        let request = build_authorization_url(
            "https://idp.example/authorize",
            &config(),
            AuthorizationParams {
                state: Some("state-1".to_string()),
                nonce: Some("nonce-1".to_string()),
                ..Default::default()
            },
        );

        assert!(request.url.starts_with("https://idp.example/authorize?"));
        let query = query_of(&request.url);
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["client_id"], "client-1");
        assert_eq!(query["redirect_uri"], "https://app.example/auth/callback");
        assert_eq!(query["scope"], "openid email");
        assert_eq!(query["state"], "state-1");
        assert_eq!(query["nonce"], "nonce-1");
        assert_eq!(query["display"], "page");
        assert_eq!(request.state, "state-1");
    }

    #[test]
    fn test_generates_state_and_nonce() {
        let request =
            build_authorization_url("https://idp.example/authorize", &config(), Default::default());

        let query = query_of(&request.url);
        assert_eq!(query["state"], request.state);
        assert_eq!(query["nonce"], request.nonce);
        assert!(!request.state.is_empty());
        assert_ne!(request.state, request.nonce);
    }

    #[test]
    fn test_optional_parameters_and_extras() {
        let mut extra_params = std::collections::BTreeMap::new();
        extra_params.insert("ui_locales".to_string(), "fr".to_string());
        extra_params.insert("client_id".to_string(), "spoofed".to_string());

        let request = build_authorization_url(
            "https://idp.example/authorize?tenant=acme",
            &config(),
            AuthorizationParams {
                display: Some("touch".to_string()),
                prompt: Some(Prompt::Login),
                login_hint: Some("ann@x.com".to_string()),
                extra_params,
                ..Default::default()
            },
        );

        let query = query_of(&request.url);
        assert_eq!(query["tenant"], "acme");
        assert_eq!(query["display"], "touch");
        assert_eq!(query["prompt"], "login");
        assert_eq!(query["login_hint"], "ann@x.com");
        assert_eq!(query["ui_locales"], "fr");
        assert_eq!(query["client_id"], "client-1");
    }

    #[test]
    fn test_state_round_trips_through_callback_parsing() {
        let request =
            build_authorization_url("https://idp.example/authorize", &config(), Default::default());
        let callback = CallbackParams::from_url_str(&format!(
            "https://app.example/auth/callback?code=abc&state={}",
            urlencoding::encode(&request.state)
        ))
        .unwrap();
        assert_eq!(callback.state.as_deref(), Some(request.state.as_str()));
    }
}
