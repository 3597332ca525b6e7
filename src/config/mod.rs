//! Configuration management.
//!
//! Resolves the Confluence endpoint and credential from named inputs, and the
//! HTTP timeout policy from optional overrides. Resolution reads its inputs
//! through a lookup function so it can be exercised without touching the
//! process environment.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Environment variable holding the bearer token.
pub const TOKEN_VAR: &str = "CONFLUENCE_API_TOKEN";

/// Endpoint source variables, in priority order.
pub const ENDPOINT_VARS: [&str; 3] = [
    "CONFLUENCE_BASE_URL",
    "CONFLUENCE_API_BASE_PATH",
    "CONFLUENCE_HOST",
];

/// Path segment every base URL must contain.
pub const API_ROOT: &str = "/rest/api";

/// Errors raised while resolving configuration.
///
/// All variants are fatal: the server cannot start without a valid endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No credential was supplied.
    #[error("CONFLUENCE_API_TOKEN environment variable is required")]
    MissingCredential,

    /// None of the endpoint sources was supplied.
    #[error("CONFLUENCE_BASE_URL (or CONFLUENCE_API_BASE_PATH or CONFLUENCE_HOST) environment variable is required")]
    MissingEndpoint,

    /// The endpoint source is not a valid URL.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// The endpoint uses a scheme other than http or https.
    #[error("base URL must use http or https scheme, got '{0}'")]
    InvalidScheme(String),
}

/// Validated Confluence endpoint descriptor.
///
/// Created once at startup and owned by the transport client afterwards.
/// The base URL always uses an `http`/`https` scheme and contains
/// [`API_ROOT`] exactly once.
pub struct ConfluenceConfig {
    base_url: Url,
    token: SecretString,
}

impl ConfluenceConfig {
    /// Resolves configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the credential or endpoint is missing or
    /// the endpoint is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the credential or endpoint is missing or
    /// the endpoint is malformed.
    pub fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let token = non_empty(TOKEN_VAR).ok_or(ConfigError::MissingCredential)?;

        let raw = ENDPOINT_VARS
            .iter()
            .find_map(|name| non_empty(name))
            .ok_or(ConfigError::MissingEndpoint)?;

        let base_url = normalize_base_url(&raw)?;

        Ok(Self {
            base_url,
            token: SecretString::from(token),
        })
    }

    /// Builds a configuration from an already-normalized URL and a token.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the URL fails normalization.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            token: SecretString::from(token.into()),
        })
    }

    /// Returns the normalized base URL (ending in [`API_ROOT`]).
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the bearer credential.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }
}

impl std::fmt::Debug for ConfluenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfluenceConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for ConfluenceConfig {
    fn eq(&self, other: &Self) -> bool {
        self.base_url == other.base_url
            && self.token.expose_secret() == other.token.expose_secret()
    }
}

/// Normalizes a raw endpoint source into a base URL ending in [`API_ROOT`].
///
/// Adds `https://` when no scheme separator is present and appends the API
/// root unless the path already contains it.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] or [`ConfigError::InvalidScheme`].
pub fn normalize_base_url(raw: &str) -> Result<Url, ConfigError> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let mut url = Url::parse(&candidate).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

    if !url.scheme().starts_with("http") {
        return Err(ConfigError::InvalidScheme(url.scheme().to_string()));
    }

    if !url.path().contains(API_ROOT) {
        let path = format!("{}{API_ROOT}", url.path().trim_end_matches('/'));
        url.set_path(&path);
    }

    Ok(url)
}

/// HTTP client configuration for Confluence requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    /// Per-call timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl HttpSettings {
    /// Loads HTTP settings from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies `CONFLUENCE_TIMEOUT_MS` and `CONFLUENCE_CONNECT_TIMEOUT_MS`
    /// overrides. Unparsable values are ignored.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(timeout_ms) = lookup("CONFLUENCE_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) =
            lookup("CONFLUENCE_CONNECT_TIMEOUT_MS").and_then(|v| v.parse().ok())
        {
            self.connect_timeout_ms = connect_timeout_ms;
        }
        self
    }
}
