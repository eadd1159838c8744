//! Endpoint Resolution
//!
//! Decides, per role, whether to use a configured endpoint verbatim, join a
//! configured path onto the provider domain, or take the endpoint from the
//! discovery document.

use std::sync::Arc;
use url::{ParseError, Url};

use crate::core::discovery::{DiscoveryCache, DiscoveryClient};
use crate::error::{ConfigurationError, DiscoveryError, OidcError};
use crate::types::{ClientConfig, EndpointRole, ResolvedEndpoints};

/// How a configured endpoint value is to be used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndpointOverride {
    /// Nothing usable configured; use discovery.
    Discover,
    /// Fully-qualified URL, used verbatim.
    Absolute(String),
    /// Path relative to the provider domain.
    Path(String),
}

/// Classify a configured endpoint value.
///
/// A value with a host is absolute. A value whose path is empty or a bare `/`
/// is treated as unset. Anything else is a path under the provider domain.
pub fn classify_override(
    role: EndpointRole,
    value: Option<&str>,
) -> Result<EndpointOverride, ConfigurationError> {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Ok(EndpointOverride::Discover),
    };

    let path = match Url::parse(value) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => {
            return Ok(EndpointOverride::Absolute(value.to_string()));
        }
        Ok(url) => url.path().to_string(),
        // Scheme-relative `//host/path` still names a host.
        Err(ParseError::RelativeUrlWithoutBase) if value.starts_with("//") => {
            return Ok(EndpointOverride::Absolute(value.to_string()));
        }
        Err(ParseError::RelativeUrlWithoutBase) => value
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
        Err(_) => {
            return Err(ConfigurationError::InvalidEndpoint {
                role,
                value: value.to_string(),
            })
        }
    };

    if path.is_empty() || path == "/" {
        Ok(EndpointOverride::Discover)
    } else {
        Ok(EndpointOverride::Path(path))
    }
}

/// Parse the provider domain, requiring a scheme and a host.
pub fn parse_domain(domain: Option<&str>) -> Result<Url, ConfigurationError> {
    let invalid = || ConfigurationError::InvalidDomain {
        domain: domain.map(str::to_string),
    };

    let raw = domain.map(str::trim).filter(|d| !d.is_empty()).ok_or_else(invalid)?;
    let url = Url::parse(raw).map_err(|_| invalid())?;

    if url.cannot_be_a_base() || !url.host_str().is_some_and(|h| !h.is_empty()) {
        return Err(invalid());
    }

    Ok(url)
}

/// Join a path onto the domain without doubling the separator.
pub fn join_domain(domain: &str, path: &str) -> String {
    format!(
        "{}/{}",
        domain.trim().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Endpoint resolver for one flow instance.
///
/// Owns the flow's discovery memo, so however many roles fall through to
/// discovery, the document is fetched at most once.
pub struct EndpointResolver {
    config: Arc<ClientConfig>,
    discovery: DiscoveryCache,
}

impl EndpointResolver {
    pub fn new(config: Arc<ClientConfig>, discovery: Arc<dyn DiscoveryClient>) -> Self {
        Self {
            config,
            discovery: DiscoveryCache::new(discovery),
        }
    }

    /// Concrete URL for `role`.
    pub async fn resolve(&self, role: EndpointRole) -> Result<String, OidcError> {
        let configured = self.config.endpoint_override(role);

        match classify_override(role, configured)? {
            EndpointOverride::Absolute(url) => Ok(url),
            EndpointOverride::Path(path) => {
                let domain = self.domain()?;
                Ok(join_domain(domain.as_str(), &path))
            }
            EndpointOverride::Discover => {
                let domain = self.domain()?;
                let document = self.discovery.discover(&domain).await?;
                document
                    .endpoint(role)
                    .map(str::to_string)
                    .ok_or_else(|| DiscoveryError::MissingEndpoint { role }.into())
            }
        }
    }

    /// All three endpoints.
    pub async fn resolve_all(&self) -> Result<ResolvedEndpoints, OidcError> {
        Ok(ResolvedEndpoints {
            authorization: self.resolve(EndpointRole::Authorization).await?,
            token: self.resolve(EndpointRole::Token).await?,
            userinfo: self.resolve(EndpointRole::UserInfo).await?,
        })
    }

    /// The discovery memo backing this resolver.
    pub fn discovery(&self) -> &DiscoveryCache {
        &self.discovery
    }

    fn domain(&self) -> Result<Url, ConfigurationError> {
        parse_domain(self.config.domain.as_deref())
    }
}
