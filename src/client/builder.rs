//! Client builder for constructing A2A clients with composable layers

use std::{collections::HashMap, sync::Arc, time::Duration};

use tower::ServiceBuilder;
use url::Url;

use crate::{
    client::{AgentClient, ClientConfig},
    codec::{Codec, JsonCodec},
    layer::{A2AValidationLayer, A2AValidationService, AuthCredentials, AuthLayer, AuthService},
    monitor::MonitorConfig,
    protocol::error::A2AError,
    service::A2AProtocolService,
    transport::{HttpTransport, Transport},
};

/// The service stack produced by [`A2AClientBuilder::build`]
///
/// Requests pass through validation, then credential injection, then the protocol service.
pub type ClientService<T> = A2AValidationService<AuthService<A2AProtocolService<T>>>;

/// Builder for constructing A2A clients
///
/// There is no implicit default transport: pick one explicitly with
/// [`A2AClientBuilder::new_http`] or [`A2AClientBuilder::with_transport`].
///
/// # Example
///
/// ```rust,no_run
/// use tower_a2a_monitor::prelude::*;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), A2AError> {
/// let url = "https://agents.example.com".parse().unwrap();
/// let monitor = A2AClientBuilder::new_http(url)
///     .with_bearer_auth("token123")
///     .with_poll_interval(Duration::from_secs(2))
///     .with_max_wait(Duration::from_secs(600))
///     .build()?
///     .into_monitor();
/// # Ok(())
/// # }
/// ```
pub struct A2AClientBuilder<T: Transport> {
    agent_url: Url,
    transport: Option<T>,
    codec: Option<Arc<dyn Codec>>,
    auth: Option<AuthCredentials>,
    timeout: Option<Duration>,
    headers: HashMap<String, String>,
    monitor: MonitorConfig,
}

impl<T: Transport> A2AClientBuilder<T> {
    /// Start a builder for the agent host at `agent_url`
    ///
    /// A transport must be supplied with [`with_transport`](Self::with_transport).
    pub fn new(agent_url: Url) -> Self {
        Self {
            agent_url,
            transport: None,
            codec: None,
            auth: None,
            timeout: Some(Duration::from_secs(30)),
            headers: HashMap::new(),
            monitor: MonitorConfig::default(),
        }
    }

    /// Use a custom transport
    pub fn with_transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom codec
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Enable bearer token authentication
    pub fn with_bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(AuthCredentials::bearer(token));
        self
    }

    /// Enable API key authentication
    ///
    /// # Arguments
    ///
    /// * `key` - The API key
    /// * `header` - The header name for the API key (e.g., "X-API-Key")
    pub fn with_api_key_auth(mut self, key: impl Into<String>, header: impl Into<String>) -> Self {
        self.auth = Some(AuthCredentials::api_key(key, header));
        self
    }

    /// Enable basic HTTP authentication
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = Some(AuthCredentials::basic(username, password));
        self
    }

    /// Set custom authentication credentials
    pub fn with_auth(mut self, credentials: AuthCredentials) -> Self {
        self.auth = Some(credentials);
        self
    }

    /// Set the timeout for a single protocol call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Let single protocol calls run until cancelled
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Send an extra header with every request, e.g. a tenant or trace id
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the pause between two polls of a monitored task
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.monitor = self.monitor.with_poll_interval(interval);
        self
    }

    /// Bound every monitoring session by `max_wait`
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.monitor = self.monitor.with_max_wait(max_wait);
        self
    }

    /// Build the A2A client
    ///
    /// # Errors
    ///
    /// Returns `A2AError::Config` if no transport has been configured
    pub fn build(self) -> Result<AgentClient<ClientService<T>>, A2AError> {
        let transport = self.transport.ok_or_else(|| {
            A2AError::Config("Transport not configured. Use new_http() or with_transport()".into())
        })?;

        let codec = self.codec.unwrap_or_else(|| Arc::new(JsonCodec));

        let service = ServiceBuilder::new()
            .layer(A2AValidationLayer::new())
            .layer(AuthLayer::optional(self.auth))
            .service(A2AProtocolService::new(transport, codec));

        let config = ClientConfig::new(self.agent_url)
            .with_timeout(self.timeout)
            .with_headers(self.headers)
            .with_monitor(self.monitor);

        Ok(AgentClient::new(service, config))
    }
}

impl A2AClientBuilder<HttpTransport> {
    /// Create a new client builder with HTTP transport (HTTP+JSON binding)
    ///
    /// # Arguments
    ///
    /// * `agent_url` - The base URL of the agent host (e.g., "<https://agents.example.com>")
    pub fn new_http(agent_url: Url) -> Self {
        let transport = HttpTransport::new(agent_url.clone());
        Self::new(agent_url)
            .with_transport(transport)
            .with_codec(Arc::new(JsonCodec))
    }
}
