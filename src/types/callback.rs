//! Callback Types
//!
//! Parameters delivered by the provider's redirect back to the host.

use url::Url;

/// Callback parameters from the authorization redirect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
    /// Authorization code (if success).
    pub code: Option<String>,
    /// State parameter.
    pub state: Option<String>,
    /// Error code (if authorization failed).
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
    /// Error reason (non-standard, sent by some providers).
    pub error_reason: Option<String>,
    /// Tenant slug.
    pub slug: Option<String>,
    /// Where the host should continue after authentication.
    pub redirect_uri: Option<String>,
}

impl CallbackParams {
    /// Parse callback parameters from URL.
    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(url.query_pairs())
    }

    /// Parse callback parameters from URL string.
    pub fn from_url_str(url_str: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(url_str)?;
        Ok(Self::from_url(&url))
    }

    /// Parse callback parameters from a raw query string or form body.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: Iterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
    {
        let mut params = Self::default();

        for (key, value) in pairs {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "code" => params.code = value,
                "state" => params.state = value,
                "error" => params.error = value,
                "error_description" => params.error_description = value,
                "error_reason" => params.error_reason = value,
                "slug" => params.slug = value,
                "redirect_uri" => params.redirect_uri = value,
                _ => {}
            }
        }

        params
    }

    /// Provider-reported error message, if the callback carries one.
    ///
    /// Empty values count as absent. Precedence is description, then reason,
    /// then the raw error code.
    pub fn provider_error_message(&self) -> Option<String> {
        [&self.error_description, &self.error_reason, &self.error]
            .into_iter()
            .find_map(|v| present(v.as_deref()))
            .map(str::to_string)
    }

    /// Authorization code, if present and non-empty.
    pub fn code(&self) -> Option<&str> {
        present(self.code.as_deref())
    }

    /// Tenant slug used to scope audit records.
    ///
    /// Falls back to the request/session origin with its leading slashes
    /// stripped.
    pub fn tenant_slug(&self, origin: Option<&str>) -> Option<String> {
        present(self.slug.as_deref())
            .or_else(|| present(origin.map(|o| o.trim_start_matches('/'))))
            .map(str::to_string)
    }
}

/// Ambient request/session data the host passes along with the callback.
#[derive(Clone, Debug, Default)]
pub struct CallbackContext {
    /// Request or session origin path.
    pub origin: Option<String>,
    /// State the host stored when it issued the redirect.
    pub expected_state: Option<String>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
