//! Client construction parameters and credentials.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, IntegrationClient, Result};

/// Default API host of the monitoring service.
pub const DEFAULT_API_URL: &str = "https://api.datadoghq.com/";

/// Default timeout for remote calls: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Non-sensitive client parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ClientParams {
    /// Base URL of the monitoring service API
    #[cfg_attr(
        feature = "config",
        arg(long = "api-url", env = "DATADOG_HOST", default_value = DEFAULT_API_URL)
    )]
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Timeout for remote calls in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout", env = "DATADOG_HTTP_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub http_timeout: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientParams {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            http_timeout: default_timeout_secs(),
        }
    }
}

impl ClientParams {
    /// Parses the API base URL.
    pub fn api_url(&self) -> Result<Url> {
        Url::parse(&self.api_url).map_err(|e| {
            Error::configuration()
                .with_message(format!("invalid api_url `{}`: {e}", self.api_url))
                .with_source(e)
        })
    }

    /// Returns the effective timeout, using the default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.http_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.http_timeout)
        }
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Sets the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http_timeout = timeout_secs;
        self
    }
}

/// Sensitive client credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ClientCredentials {
    /// API key of the account
    #[cfg_attr(feature = "config", arg(long = "api-key", env = "DATADOG_API_KEY"))]
    pub api_key: String,

    /// Application key used for configuration endpoints
    #[cfg_attr(feature = "config", arg(long = "app-key", env = "DATADOG_APP_KEY"))]
    pub app_key: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("api_key", &"<redacted>")
            .field("app_key", &"<redacted>")
            .finish()
    }
}

impl ClientCredentials {
    /// Creates credentials from an API key and an application key.
    pub fn new(api_key: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            app_key: app_key.into(),
        }
    }
}

/// Complete provider configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ProviderConfig {
    /// Connection parameters.
    #[cfg_attr(feature = "config", clap(flatten))]
    #[serde(flatten)]
    pub params: ClientParams,

    /// Account credentials.
    #[cfg_attr(feature = "config", clap(flatten))]
    #[serde(flatten)]
    pub credentials: ClientCredentials,
}

impl ProviderConfig {
    /// Creates a configuration with default parameters.
    pub fn new(credentials: ClientCredentials) -> Self {
        Self {
            params: ClientParams::default(),
            credentials,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.credentials.api_key.trim().is_empty() {
            return Err(Error::configuration().with_message("api_key must not be empty"));
        }

        if self.credentials.app_key.trim().is_empty() {
            return Err(Error::configuration().with_message("app_key must not be empty"));
        }

        let api_url = self.params.api_url()?;
        let scheme = api_url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(Error::configuration()
                .with_message(format!("api_url must use http or https, got `{scheme}`")));
        }

        Ok(())
    }
}

/// Builds a client from parameters and credentials.
///
/// # Example
///
/// ```ignore
/// #[async_trait::async_trait]
/// impl IntoClient for HttpClient {
///     async fn connect(params: ClientParams, credentials: ClientCredentials) -> Result<Self> {
///         // Build an authenticated HTTP client
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait IntoClient: IntegrationClient + Sized {
    /// Creates a new client from parameters and credentials.
    async fn connect(params: ClientParams, credentials: ClientCredentials) -> Result<Self>;
}
