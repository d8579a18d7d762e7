//! A2A service request types

use std::{collections::HashMap, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{layer::auth::AuthCredentials, protocol::operation::A2AOperation};

/// A request to the A2A service
///
/// This wraps an A2A operation with additional context needed for execution
#[derive(Debug, Clone)]
pub struct A2ARequest {
    /// The A2A operation to execute
    pub operation: A2AOperation,

    /// Request context (auth, timeouts, cancellation, metadata)
    pub context: RequestContext,
}

impl A2ARequest {
    /// Create a new A2A request
    pub fn new(operation: A2AOperation, context: RequestContext) -> Self {
        Self { operation, context }
    }
}

/// Per-call execution context
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Authentication credentials, injected by `AuthLayer`
    pub auth: Option<AuthCredentials>,

    /// Upper bound for this single call
    pub timeout: Option<Duration>,

    /// Cancelling this token aborts the call with `A2AError::Cancelled`
    pub cancellation: CancellationToken,

    /// Additional metadata headers
    pub metadata: HashMap<String, String>,
}

impl RequestContext {
    /// Create a context governed by `cancellation`
    pub fn new(cancellation: CancellationToken) -> Self {
        Self {
            auth: None,
            timeout: Some(Duration::from_secs(30)),
            cancellation,
            metadata: HashMap::new(),
        }
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, auth: AuthCredentials) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set request timeout, `None` for unbounded
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a metadata header
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(CancellationToken::new())
    }
}
