//! Client configuration.

use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};

/// Default GraphQL endpoint.
pub const DEFAULT_GRAPHQL_URL: &str = "https://graphql.buildkite.com/v1";

/// Default REST endpoint. Paths passed to the client are appended verbatim.
pub const DEFAULT_REST_URL: &str = "https://api.buildkite.com";

/// Environment variable holding the organization slug.
pub const ENV_ORGANIZATION: &str = "BUILDKITE_ORGANIZATION_SLUG";
/// Environment variable holding the API token.
pub const ENV_API_TOKEN: &str = "BUILDKITE_API_TOKEN";
/// Environment variable overriding the GraphQL endpoint.
pub const ENV_GRAPHQL_URL: &str = "BUILDKITE_GRAPHQL_URL";
/// Environment variable overriding the REST endpoint.
pub const ENV_REST_URL: &str = "BUILDKITE_REST_URL";

/// Configuration for a [`BuildkiteClient`](crate::BuildkiteClient).
///
/// Built once, consumed by client construction, never mutated afterwards.
/// The API token is redacted in Debug output.
#[derive(Clone)]
pub struct ClientConfig {
    /// Organization slug, resolved to an id during construction.
    pub organization: String,
    /// Bearer token.
    pub api_token: String,
    /// GraphQL endpoint URL.
    pub graphql_url: String,
    /// REST endpoint URL, used as a literal prefix.
    pub rest_url: String,
    /// User-Agent header value.
    pub user_agent: String,
    /// Operation timeouts, stored for consumers of the client.
    pub timeouts: Timeouts,
    /// Settings for the default transport.
    pub transport: TransportConfig,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("organization", &self.organization)
            .field("api_token", &"[REDACTED]")
            .field("graphql_url", &self.graphql_url)
            .field("rest_url", &self.rest_url)
            .field("user_agent", &self.user_agent)
            .field("timeouts", &self.timeouts)
            .field("transport", &self.transport)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder(
        organization: impl Into<String>,
        api_token: impl Into<String>,
    ) -> ClientConfigBuilder {
        ClientConfigBuilder::new(organization, api_token)
    }

    /// Load configuration from `BUILDKITE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).filter(|v| !v.is_empty()).ok_or_else(|| {
                Error::new(ErrorKind::Config(format!("{key} environment variable not set")))
            })
        };

        let mut builder = Self::builder(required(ENV_ORGANIZATION)?, required(ENV_API_TOKEN)?);
        if let Some(url) = lookup(ENV_GRAPHQL_URL).filter(|v| !v.is_empty()) {
            builder = builder.with_graphql_url(url);
        }
        if let Some(url) = lookup(ENV_REST_URL).filter(|v| !v.is_empty()) {
            builder = builder.with_rest_url(url);
        }
        builder.build()
    }
}

/// Builder for ClientConfig.
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    fn new(organization: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            config: ClientConfig {
                organization: organization.into(),
                api_token: api_token.into(),
                graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
                rest_url: DEFAULT_REST_URL.to_string(),
                user_agent: crate::USER_AGENT.to_string(),
                timeouts: Timeouts::default(),
                transport: TransportConfig::default(),
            },
        }
    }

    /// Set the GraphQL endpoint.
    pub fn with_graphql_url(mut self, url: impl Into<String>) -> Self {
        self.config.graphql_url = url.into();
        self
    }

    /// Set the REST endpoint.
    pub fn with_rest_url(mut self, url: impl Into<String>) -> Self {
        self.config.rest_url = url.into();
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set operation timeouts.
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.config.timeouts = timeouts;
        self
    }

    /// Set transport configuration.
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.config.transport = transport;
        self
    }

    /// Validate and build the client configuration.
    pub fn build(self) -> Result<ClientConfig> {
        let config = self.config;
        let required = [
            ("organization", &config.organization),
            ("api_token", &config.api_token),
            ("graphql_url", &config.graphql_url),
            ("rest_url", &config.rest_url),
            ("user_agent", &config.user_agent),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::new(ErrorKind::Config(format!("{name} must not be empty"))));
            }
        }
        Ok(config)
    }
}

/// Per-operation timeouts handed to consumers of the client.
///
/// The client itself does not apply them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Option<Duration>,
    pub read: Option<Duration>,
    pub update: Option<Duration>,
    pub delete: Option<Duration>,
}

impl Timeouts {
    /// Create timeout, or `default` when unset.
    pub fn create_or(&self, default: Duration) -> Duration {
        self.create.unwrap_or(default)
    }

    /// Read timeout, or `default` when unset.
    pub fn read_or(&self, default: Duration) -> Duration {
        self.read.unwrap_or(default)
    }

    /// Update timeout, or `default` when unset.
    pub fn update_or(&self, default: Duration) -> Duration {
        self.update.unwrap_or(default)
    }

    /// Delete timeout, or `default` when unset.
    pub fn delete_or(&self, default: Duration) -> Duration {
        self.delete.unwrap_or(default)
    }
}

/// Settings for the default reqwest transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Pool idle timeout.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// Accept gzip/deflate encoded responses.
    pub accept_compressed: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            accept_compressed: true,
        }
    }
}
