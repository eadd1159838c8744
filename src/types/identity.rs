//! Identity Types
//!
//! Canonical identity handed to the host after a successful callback, plus
//! the tagged outcome of a callback and the orchestrator's states.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::OidcError;

/// Final output of a successful flow.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IdentityRecord {
    pub provider: String,
    pub uid: Option<String>,
    pub info: IdentityInfo,
    pub credentials: IdentityCredentials,
    pub extra: IdentityExtra,
}

/// Profile information.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IdentityInfo {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub member_type: Option<String>,
}

/// Token credentials.
#[derive(Clone, PartialEq, Serialize)]
pub struct IdentityCredentials {
    pub token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub expires: bool,
    pub id_token: Option<String>,
}

impl fmt::Debug for IdentityCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityCredentials")
            .field("token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("expires", &self.expires)
            .finish()
    }
}

/// Host-facing extras.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IdentityExtra {
    /// Primary userinfo claims.
    pub raw_info: Map<String, Value>,
    /// Redirect target supplied with the callback.
    pub redirect_uri: Option<String>,
    /// Identifier of the audit record for the raw userinfo fetch.
    pub audit_record_id: Option<String>,
}

/// Terminal result of one callback invocation.
#[derive(Debug)]
pub enum FlowOutcome {
    Success(Box<IdentityRecord>),
    ProviderError(String),
    MissingCodeError,
    InternalError(OidcError),
}

impl FlowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn identity(&self) -> Option<&IdentityRecord> {
        match self {
            Self::Success(identity) => Some(identity),
            _ => None,
        }
    }

    /// Terminal state this outcome corresponds to.
    pub fn state(&self) -> FlowState {
        match self {
            Self::Success(_) => FlowState::Success,
            Self::ProviderError(_) => FlowState::ProviderErrorTerminal,
            Self::MissingCodeError => FlowState::MissingCodeTerminal,
            Self::InternalError(_) => FlowState::InternalErrorTerminal,
        }
    }
}

/// Orchestrator states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    Start,
    AwaitingCallback,
    Exchanging,
    FetchingUserInfo,
    Success,
    ProviderErrorTerminal,
    MissingCodeTerminal,
    InternalErrorTerminal,
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Success
                | Self::ProviderErrorTerminal
                | Self::MissingCodeTerminal
                | Self::InternalErrorTerminal
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::AwaitingCallback => "awaiting_callback",
            Self::Exchanging => "exchanging",
            Self::FetchingUserInfo => "fetching_userinfo",
            Self::Success => "success",
            Self::ProviderErrorTerminal => "provider_error",
            Self::MissingCodeTerminal => "missing_code",
            Self::InternalErrorTerminal => "internal_error",
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
