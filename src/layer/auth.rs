//! Authentication layer for A2A protocol

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use base64::{engine::general_purpose, Engine as _};
use tower_layer::Layer;
use tower_service::Service;

use crate::{
    protocol::error::A2AError,
    service::{A2ARequest, A2AResponse},
};

/// Authentication credentials
#[derive(Clone)]
pub enum AuthCredentials {
    /// Bearer token authentication
    Bearer(String),

    /// API key authentication
    ApiKey { key: String, header: String },

    /// Basic HTTP authentication
    Basic { username: String, password: String },
}

impl AuthCredentials {
    /// Create bearer token credentials
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Create API key credentials
    pub fn api_key(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::ApiKey {
            key: key.into(),
            header: header.into(),
        }
    }

    /// Create basic auth credentials
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Get the header name and value for this credential
    pub fn to_header(&self) -> (String, String) {
        match self {
            AuthCredentials::Bearer(token) => {
                ("Authorization".to_string(), format!("Bearer {}", token))
            }
            AuthCredentials::ApiKey { key, header } => (header.clone(), key.clone()),
            AuthCredentials::Basic { username, password } => {
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                ("Authorization".to_string(), format!("Basic {}", encoded))
            }
        }
    }
}

// Secrets stay out of logs and panic messages
impl std::fmt::Debug for AuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthCredentials::Bearer(_) => f.write_str("Bearer(***)"),
            AuthCredentials::ApiKey { header, .. } => {
                f.debug_struct("ApiKey").field("header", header).finish()
            }
            AuthCredentials::Basic { username, .. } => {
                f.debug_struct("Basic").field("username", username).finish()
            }
        }
    }
}

/// Layer that attaches credentials to every request context
///
/// Without credentials the layer is a pass-through, so clients for anonymous agents
/// share the same service stack type.
#[derive(Clone, Debug, Default)]
pub struct AuthLayer {
    credentials: Option<AuthCredentials>,
}

impl AuthLayer {
    /// Create a new authentication layer
    pub fn new(credentials: AuthCredentials) -> Self {
        Self {
            credentials: Some(credentials),
        }
    }

    /// Create a layer that may or may not carry credentials
    pub fn optional(credentials: Option<AuthCredentials>) -> Self {
        Self { credentials }
    }

    /// Create a bearer authentication layer
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(AuthCredentials::bearer(token))
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            credentials: self.credentials.clone(),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    credentials: Option<AuthCredentials>,
}

impl<S> Service<A2ARequest> for AuthService<S>
where
    S: Service<A2ARequest, Response = A2AResponse, Error = A2AError> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = A2AResponse;
    type Error = A2AError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: A2ARequest) -> Self::Future {
        if let Some(credentials) = &self.credentials {
            req.context.auth = Some(credentials.clone());
        }

        // Take the instance that was driven to readiness, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(req).await })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tower::{service_fn, ServiceExt};

    use crate::{
        protocol::{operation::A2AOperation, task::Task},
        service::RequestContext,
    };

    use super::*;

    #[test]
    fn test_bearer_credentials() {
        let creds = AuthCredentials::bearer("test-token");
        let (header, value) = creds.to_header();

        assert_eq!(header, "Authorization");
        assert_eq!(value, "Bearer test-token");
    }

    #[test]
    fn test_api_key_credentials() {
        let creds = AuthCredentials::api_key("secret-key", "X-API-Key");
        let (header, value) = creds.to_header();

        assert_eq!(header, "X-API-Key");
        assert_eq!(value, "secret-key");
    }

    #[test]
    fn test_basic_credentials() {
        let creds = AuthCredentials::basic("user", "pass");
        let (_, value) = creds.to_header();

        assert_eq!(value, "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", AuthCredentials::bearer("hunter2"));
        assert!(!rendered.contains("hunter2"));
    }

    async fn seen_auth(layer: AuthLayer) -> Option<String> {
        let seen = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let inner = service_fn(move |req: A2ARequest| {
            *captured.lock().unwrap() = req.context.auth.map(|a| a.to_header().1);
            async { Ok::<_, A2AError>(A2AResponse::Task(Box::new(Task::new("t")))) }
        });

        let request = A2ARequest::new(
            A2AOperation::GetTask {
                agent_id: "agent-1".into(),
                task_id: "t".into(),
            },
            RequestContext::default(),
        );
        layer.layer(inner).oneshot(request).await.unwrap();

        let value = seen.lock().unwrap().clone();
        value
    }

    #[tokio::test]
    async fn test_layer_injects_credentials() {
        assert_eq!(
            seen_auth(AuthLayer::bearer("abc")).await,
            Some("Bearer abc".to_string())
        );
        assert_eq!(seen_auth(AuthLayer::optional(None)).await, None);
    }
}
