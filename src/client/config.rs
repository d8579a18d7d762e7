//! Client configuration

use std::{collections::HashMap, time::Duration};

use crate::monitor::MonitorConfig;

/// Configuration for an A2A client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the agent host
    pub agent_url: String,

    /// Upper bound for a single protocol call, `None` for unbounded
    pub timeout: Option<Duration>,

    /// Extra headers sent with every request
    pub headers: HashMap<String, String>,

    /// Polling behaviour for task monitors built from this client
    pub monitor: MonitorConfig,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(agent_url: impl Into<String>) -> Self {
        Self {
            agent_url: agent_url.into(),
            timeout: Some(Duration::from_secs(30)),
            headers: HashMap::new(),
            monitor: MonitorConfig::default(),
        }
    }

    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a header sent with every request
    ///
    /// Protocol headers (content type, version, request id, credentials) cannot be
    /// replaced this way.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace the extra headers
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Set the monitor configuration
    pub fn with_monitor(mut self, monitor: MonitorConfig) -> Self {
        self.monitor = monitor;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("")
    }
}
