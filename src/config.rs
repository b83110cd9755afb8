//! Pool and HTTP client configuration

use crate::errors::{PoolError, PoolResult};
use std::time::Duration;

/// Capacity settings for a client pool
///
/// # Examples
///
/// ```
/// use clientpool::PoolConfiguration;
///
/// let config = PoolConfiguration::new()
///     .with_initial_capacity(2)
///     .with_max_capacity(5);
///
/// assert_eq!(config.initial_capacity, 2);
/// assert_eq!(config.max_capacity, 5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfiguration {
    /// Number of clients created eagerly when the pool is built
    pub initial_capacity: usize,

    /// Maximum number of idle clients kept resident in the pool
    pub max_capacity: usize,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            max_capacity: 100,
        }
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of clients created up front
    pub fn with_initial_capacity(mut self, count: usize) -> Self {
        self.initial_capacity = count;
        self
    }

    /// Set the maximum number of resident clients
    pub fn with_max_capacity(mut self, count: usize) -> Self {
        self.max_capacity = count;
        self
    }

    /// Check `0 < max_capacity` and `initial_capacity <= max_capacity`
    ///
    /// # Examples
    ///
    /// ```
    /// use clientpool::{PoolConfiguration, PoolError};
    ///
    /// let config = PoolConfiguration::new().with_max_capacity(0);
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(PoolError::InvalidCapacity { initial: 0, max: 0 })
    /// );
    /// ```
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_capacity == 0 || self.initial_capacity > self.max_capacity {
            return Err(PoolError::InvalidCapacity {
                initial: self.initial_capacity,
                max: self.max_capacity,
            });
        }
        Ok(())
    }
}

/// Settings used to build `reqwest::Client` handles
///
/// Connection reuse itself is left to reqwest; these only shape how each
/// client is created.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HttpClientConfig {
    /// Total request timeout
    pub request_timeout: Option<Duration>,

    /// TCP connect timeout
    pub connect_timeout: Option<Duration>,

    /// Maximum idle connections kept per host by each client
    pub pool_max_idle_per_host: usize,

    /// How long an idle connection stays open
    pub pool_idle_timeout: Option<Duration>,

    /// TCP keepalive interval
    pub tcp_keepalive: Option<Duration>,

    /// Restrict clients to HTTP/1.1
    pub http1_only: bool,

    /// User-Agent header sent with every request
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            tcp_keepalive: Some(Duration::from_secs(60)),
            http1_only: false,
            user_agent: None,
        }
    }
}

impl HttpClientConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the per-host idle connection limit
    pub fn with_pool_max_idle_per_host(mut self, count: usize) -> Self {
        self.pool_max_idle_per_host = count;
        self
    }

    /// Set the idle connection timeout
    pub fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Set the TCP keepalive interval
    pub fn with_tcp_keepalive(mut self, interval: Duration) -> Self {
        self.tcp_keepalive = Some(interval);
        self
    }

    /// Force HTTP/1.1
    pub fn with_http1_only(mut self) -> Self {
        self.http1_only = true;
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }
}
