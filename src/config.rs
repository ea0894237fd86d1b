use crate::error::{ClientError, ClientResult};
use std::time::Duration;
use url::Url;

/// Environment variable holding the gateway base URL
pub const ENV_GATEWAY_URL: &str = "PLATFORM_GATEWAY_URL";
/// Environment variable holding the overall request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "PLATFORM_HTTP_TIMEOUT_SECS";
/// Environment variable holding the connect timeout in seconds
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "PLATFORM_HTTP_CONNECT_TIMEOUT_SECS";

const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`PlatformClient`](crate::PlatformClient)
///
/// Timeouts are handed to the underlying HTTP transport; the client itself
/// has no notion of cancellation.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host prefix prepended to every request path
    pub gateway: Url,
    /// Overall request timeout
    pub timeout: Option<Duration>,
    /// Connect timeout
    pub connect_timeout: Option<Duration>,
    /// User agent sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration for the given gateway
    pub fn new(gateway: impl AsRef<str>) -> ClientResult<Self> {
        let gateway = Url::parse(gateway.as_ref())?;
        if gateway.cannot_be_a_base() {
            return Err(ClientError::invalid_argument(format!(
                "gateway must be an absolute http(s) URL: {}",
                gateway
            )));
        }

        Ok(Self {
            gateway,
            timeout: None,
            connect_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Load configuration from `PLATFORM_*` environment variables
    pub fn from_env() -> ClientResult<Self> {
        let gateway = std::env::var(ENV_GATEWAY_URL).map_err(|_| {
            ClientError::invalid_argument(format!("{} is not set", ENV_GATEWAY_URL))
        })?;

        let mut config = Self::new(gateway)?;
        if let Some(secs) = read_secs(ENV_TIMEOUT_SECS)? {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = read_secs(ENV_CONNECT_TIMEOUT_SECS)? {
            config = config.with_connect_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the reqwest client described by this configuration
    pub(crate) fn http_client(&self) -> ClientResult<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.as_str());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

fn read_secs(name: &str) -> ClientResult<Option<u64>> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Some(secs)),
        _ => Err(ClientError::invalid_argument(format!(
            "{} must be a positive number of seconds, got {:?}",
            name, raw
        ))),
    }
}
