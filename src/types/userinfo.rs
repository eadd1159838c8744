//! Userinfo Types
//!
//! Raw provider claims and the normalized userinfo result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims as returned by a userinfo (or identity URL) response.
///
/// Providers return arbitrary attributes; lookups are by name and treat
/// `null` the same as a missing claim.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Claim value, `None` when missing or `null`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// Non-empty string claim.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Claim rendered as text: strings verbatim, other JSON values serialized.
    pub fn get_text(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Normalized claims for one authenticated subject.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UserInfoResult {
    pub uid: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub member_type: Option<String>,
    /// Primary userinfo claims.
    pub raw: Claims,
}

impl UserInfoResult {
    /// Normalize primary claims. Member type is filled in separately.
    pub fn from_claims(claims: Claims) -> Self {
        let uid = claims
            .get_text("user_id")
            .or_else(|| claims.get_text("sub"));
        let email = claims.get_str("email").map(str::to_string);
        let username = claims
            .get_str("preferred_username")
            .map(str::to_string)
            .or_else(|| email.clone());

        Self {
            uid,
            first_name: claims.get_str("given_name").map(str::to_string),
            last_name: claims.get_str("family_name").map(str::to_string),
            email,
            username,
            member_type: None,
            raw: claims,
        }
    }
}
