//! Factory for `reqwest::Client` handles

use crate::config::HttpClientConfig;
use crate::errors::{PoolError, PoolResult};
use reqwest::{Client, ClientBuilder};
use tracing::warn;

/// Builds `reqwest::Client` handles from an [`HttpClientConfig`].
///
/// The configuration is checked once, up front, by building a prototype
/// client. After that `create` cannot fail.
///
/// # Examples
///
/// ```
/// use clientpool::{HttpClientConfig, HttpClientFactory};
///
/// let factory = HttpClientFactory::new(HttpClientConfig::new().with_http1_only()).unwrap();
/// let _client = factory.create();
/// ```
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    config: HttpClientConfig,
    prototype: Client,
}

impl HttpClientFactory {
    /// Validate `config` and create a factory for it
    pub fn new(config: HttpClientConfig) -> PoolResult<Self> {
        let prototype = builder(&config)
            .build()
            .map_err(|err| PoolError::ClientBuild(err.to_string()))?;
        Ok(Self { config, prototype })
    }

    /// Build a client with its own connection pool
    pub fn create(&self) -> Client {
        match builder(&self.config).build() {
            Ok(client) => client,
            Err(err) => {
                // Shares the prototype's connections, but keeps `get` infallible.
                warn!("Falling back to shared client after build error: {}", err);
                self.prototype.clone()
            }
        }
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

fn builder(config: &HttpClientConfig) -> ClientBuilder {
    let mut builder = Client::builder()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(config.pool_idle_timeout)
        .tcp_keepalive(config.tcp_keepalive);

    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(timeout) = config.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    if config.http1_only {
        builder = builder.http1_only();
    }
    if let Some(agent) = config.user_agent.as_ref() {
        builder = builder.user_agent(agent.as_str());
    }
    builder
}
