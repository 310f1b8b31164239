//! Client configuration.
//!
//! [`Config`] is plain data handed to the client at construction time. Process
//! environment is only consulted by [`Config::from_env`], which is meant to be
//! called once from the outermost layer of an application.

use crate::{Error, Result};
use std::time::Duration;

/// The production API host.
pub const DEFAULT_ENDPOINT: &str = "https://api.openletterconnect.com";

/// The API version used when none is configured.
pub const DEFAULT_VERSION: &str = "v1";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "OLC_API_KEY";
/// Environment variable overriding the API version.
pub const ENV_API_VERSION: &str = "OLC_API_VERSION";
/// Environment variable overriding the API endpoint.
pub const ENV_API_ENDPOINT: &str = "OLC_API_ENDPOINT";
/// Environment variable toggling TLS certificate verification.
pub const ENV_SSL_VERIFY: &str = "SSL_VERIFY";
/// Environment variable naming the deployment environment.
pub const ENV_NAME: &str = "ENV";

/// The deployment environment the client runs in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    /// Production (the default).
    #[default]
    Production,
    /// Any other named environment, e.g. `staging` or `local`.
    Other(String),
}

impl Environment {
    /// Parses an environment name. Anything but `production` is `Other`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "production" => Environment::Production,
            other => Environment::Other(other.to_string()),
        }
    }

    /// Returns `true` for the production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// The environment's name.
    pub fn name(&self) -> &str {
        match self {
            Environment::Production => "production",
            Environment::Other(name) => name,
        }
    }
}

/// Configuration for the SDK client.
///
/// # Examples
///
/// ```
/// use olc::Config;
/// use std::time::Duration;
///
/// let config = Config::new("my-api-key")
///     .with_version("v2")
///     .with_endpoint("https://sandbox.example.com")
///     .with_timeout(Duration::from_secs(30));
///
/// assert_eq!(config.version.as_deref(), Some("v2"));
/// assert!(config.ssl_verify);
/// ```
#[derive(Clone)]
pub struct Config {
    /// The API key sent as a bearer token.
    pub api_key: String,
    /// API version segment, `v1` when unset.
    pub version: Option<String>,
    /// Base URL of the API, the production host when unset.
    pub endpoint: Option<String>,
    /// Whether TLS certificates are verified.
    pub ssl_verify: bool,
    /// The deployment environment.
    pub environment: Environment,
    /// Per-request timeout. `None` leaves it to the transport default.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Creates a configuration with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            version: None,
            endpoint: None,
            ssl_verify: true,
            environment: Environment::Production,
            timeout: None,
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `OLC_API_KEY` is missing or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values for the optional variables are treated as unset.
    /// `SSL_VERIFY` disables verification only when it is literally `false`
    /// after trimming.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(ENV_API_KEY).ok_or_else(|| {
            Error::InvalidConfig(format!("The \"{}\" variable is required", ENV_API_KEY))
        })?;

        let ssl_verify = lookup(ENV_SSL_VERIFY)
            .map(|v| v.trim() != "false")
            .unwrap_or(true);

        let environment = non_empty(ENV_NAME)
            .map(|name| Environment::from_name(name.trim()))
            .unwrap_or_default();

        Ok(Self {
            api_key,
            version: non_empty(ENV_API_VERSION),
            endpoint: non_empty(ENV_API_ENDPOINT),
            ssl_verify,
            environment,
            timeout: None,
        })
    }

    /// Sets the API version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Enables or disables TLS certificate verification.
    pub fn with_ssl_verify(mut self, verify: bool) -> Self {
        self.ssl_verify = verify;
        self
    }

    /// Sets the deployment environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("version", &self.version)
            .field("endpoint", &self.endpoint)
            .field("ssl_verify", &self.ssl_verify)
            .field("environment", &self.environment)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::new("key");
        assert_eq!(config.api_key, "key");
        assert!(config.version.is_none());
        assert!(config.endpoint.is_none());
        assert!(config.ssl_verify);
        assert!(config.environment.is_production());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_from_lookup_reads_everything() {
        let config = Config::from_lookup(lookup(&[
            ("OLC_API_KEY", "secret"),
            ("OLC_API_VERSION", "v2"),
            ("OLC_API_ENDPOINT", "http://localhost:8080"),
            ("SSL_VERIFY", " false "),
            ("ENV", "staging"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.version.as_deref(), Some("v2"));
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8080"));
        assert!(!config.ssl_verify);
        assert_eq!(config.environment, Environment::Other("staging".to_string()));
        assert!(!config.environment.is_production());
    }

    #[test]
    fn test_missing_api_key_is_invalid() {
        let result = Config::from_lookup(lookup(&[("OLC_API_VERSION", "v2")]));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));

        let result = Config::from_lookup(lookup(&[("OLC_API_KEY", "")]));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_ssl_verify_only_disabled_by_false() {
        for value in ["true", "0", "no", "FALSE", ""] {
            let config =
                Config::from_lookup(lookup(&[("OLC_API_KEY", "k"), ("SSL_VERIFY", value)])).unwrap();
            assert!(config.ssl_verify, "value {:?} should keep verification on", value);
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", Config::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }
}
