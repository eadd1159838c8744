//! Authorization Types
//!
//! Types for the redirect leg of the flow.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-request parameters for the authorization redirect.
#[derive(Clone, Debug, Default)]
pub struct AuthorizationParams {
    /// Custom state value (generated if not provided).
    pub state: Option<String>,
    /// Custom nonce value (generated if not provided).
    pub nonce: Option<String>,
    /// Display override (falls back to the configured display).
    pub display: Option<String>,
    /// Login hint for pre-filling user identity.
    pub login_hint: Option<String>,
    /// Prompt behavior.
    pub prompt: Option<Prompt>,
    /// Additional parameters.
    pub extra_params: BTreeMap<String, String>,
}

/// Redirect target produced by the start leg.
///
/// The host stores `state` and `nonce` in its session and issues the redirect.
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
    /// The authorization URL to redirect the user agent to.
    pub url: String,
    /// State parameter for CSRF validation.
    pub state: String,
    /// Nonce bound to the ID token.
    pub nonce: String,
}

/// Prompt behavior for authorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
    /// Do not display any authentication or consent UI.
    None,
    /// Force re-authentication.
    Login,
    /// Force consent screen.
    Consent,
    /// Force account selection.
    SelectAccount,
}

impl Prompt {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Login => "login",
            Self::Consent => "consent",
            Self::SelectAccount => "select_account",
        }
    }
}
