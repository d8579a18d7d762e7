//! Core A2A protocol service implementation

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use serde_json::{json, Value};
use tower_service::Service;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    codec::Codec,
    protocol::{
        error::{A2AError, ErrorCode, ProtocolError},
        operation::A2AOperation,
    },
    service::{A2ARequest, A2AResponse},
    transport::{Transport, TransportRequest, TransportResponse},
};

/// Core A2A protocol service that wraps a transport
///
/// Turns an [`A2ARequest`] into a transport call and maps every non-2xx outcome onto
/// exactly one [`ErrorCode`]. Calls are raced against the request's cancellation token.
pub struct A2AProtocolService<T> {
    transport: T,
    codec: Arc<dyn Codec>,
}

impl<T> A2AProtocolService<T>
where
    T: Transport,
{
    /// Create a new A2A protocol service
    ///
    /// # Arguments
    ///
    /// * `transport` - The underlying transport implementation
    /// * `codec` - The codec for serialization/deserialization
    pub fn new(transport: T, codec: Arc<dyn Codec>) -> Self {
        Self { transport, codec }
    }

    /// Build a transport request from an A2A operation
    fn build_transport_request(
        req: &A2ARequest,
        codec: &dyn Codec,
    ) -> Result<TransportRequest, A2AError> {
        let method = req.operation.method();

        let mut transport_req = TransportRequest::new(req.operation.endpoint(), method);

        // Extra headers first; protocol headers take precedence
        for (key, value) in &req.context.metadata {
            transport_req = transport_req.header(key.clone(), value.clone());
        }

        transport_req = transport_req
            .header("Content-Type", codec.content_type())
            .header("Accept", codec.content_type())
            .header("A2A-Version", "1.0")
            .header("X-Request-Id", Uuid::now_v7().to_string());

        // Card resolution is anonymous even when credentials are configured
        if req.operation.requires_auth() {
            if let Some(auth) = &req.context.auth {
                let (header, value) = auth.to_header();
                transport_req = transport_req.header(header, value);
            }
        }

        let body = codec.encode_request(&req.operation)?;
        if !body.is_empty() && method != "GET" {
            transport_req = transport_req.body(body);
        }

        Ok(transport_req)
    }

    async fn execute_with_timeout(
        transport: &T,
        request: TransportRequest,
        timeout: Option<Duration>,
    ) -> Result<TransportResponse, A2AError> {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, transport.execute(request))
                .await
                .map_err(|_| A2AError::Transport(format!("Request timed out after {:?}", limit)))?,
            None => transport.execute(request).await,
        }
    }

    /// Parse a transport response into an A2A response
    fn parse_transport_response(
        transport_resp: TransportResponse,
        codec: &dyn Codec,
        operation: &A2AOperation,
    ) -> Result<A2AResponse, A2AError> {
        if !transport_resp.is_success() {
            let error = Self::handle_error_response(&transport_resp, operation);
            warn!(
                operation = operation.name(),
                status = transport_resp.status,
                error = %error,
                "agent returned an error response"
            );
            return Err(error);
        }

        codec.decode_response(&transport_resp.body, operation)
    }

    /// Map a non-2xx response onto the error code registry
    ///
    /// A structured error in the body wins; otherwise the HTTP status decides.
    fn handle_error_response(
        transport_resp: &TransportResponse,
        operation: &A2AOperation,
    ) -> A2AError {
        let json = serde_json::from_slice::<Value>(&transport_resp.body).ok();

        if let Some(embedded) = json.as_ref().and_then(embedded_protocol_error) {
            return A2AError::Protocol(embedded);
        }

        let code = status_to_code(transport_resp.status, operation);
        let message = json
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!("HTTP {}: {}", transport_resp.status, code.default_message())
            });

        A2AError::Protocol(
            ProtocolError::new(code, message)
                .with_data(json!({ "httpStatus": transport_resp.status })),
        )
    }
}

/// Extract `{"error": {code, message, data}}` or a bare `{code, message, data}`
fn embedded_protocol_error(body: &Value) -> Option<ProtocolError> {
    let candidate = body.get("error").filter(|e| e.is_object()).unwrap_or(body);
    candidate.get("code")?.as_i64()?;
    serde_json::from_value(candidate.clone()).ok()
}

fn status_to_code(status: u16, operation: &A2AOperation) -> ErrorCode {
    match status {
        404 | 410 if operation.task_id().is_some() => ErrorCode::TaskNotFound,
        404 => ErrorCode::AgentNotFound,
        409 if matches!(operation, A2AOperation::CancelTask { .. }) => {
            ErrorCode::TaskNotCancelable
        }
        401 | 403 => ErrorCode::AuthenticationRequired,
        405 => ErrorCode::MethodNotFound,
        408 | 504 => ErrorCode::AgentTimeout,
        422 => ErrorCode::InvalidParams,
        429 => ErrorCode::ConcurrentExecutionLimit,
        400..=499 => ErrorCode::InvalidRequest,
        _ => ErrorCode::InternalError,
    }
}

impl<T> Service<A2ARequest> for A2AProtocolService<T>
where
    T: Transport + Clone,
{
    type Response = A2AResponse;
    type Error = A2AError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.transport.poll_ready(cx)
    }

    fn call(&mut self, req: A2ARequest) -> Self::Future {
        let transport = self.transport.clone();
        let codec = self.codec.clone();

        Box::pin(async move {
            let transport_req = Self::build_transport_request(&req, codec.as_ref())?;
            debug!(
                operation = req.operation.name(),
                method = %transport_req.method,
                endpoint = %transport_req.endpoint,
                request_id = transport_req.headers.get("X-Request-Id").map(String::as_str),
                "sending A2A request"
            );

            let cancellation = req.context.cancellation.clone();
            let timeout = req.context.timeout;
            let transport_resp = tokio::select! {
                biased;
                _ = cancellation.cancelled() => return Err(A2AError::Cancelled),
                resp = Self::execute_with_timeout(&transport, transport_req, timeout) => resp?,
            };

            Self::parse_transport_response(transport_resp, codec.as_ref(), &req.operation)
        })
    }
}

impl<T> Clone for A2AProtocolService<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            codec: self.codec.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;
    use tokio_util::sync::CancellationToken;

    use crate::{
        codec::JsonCodec,
        layer::AuthCredentials,
        protocol::task::{Task, TaskStatus},
        service::RequestContext,
        transport::mock::MockTransport,
    };

    use super::*;

    fn service_returning(status: u16, body: &'static str) -> A2AProtocolService<MockTransport> {
        let transport =
            MockTransport::new(move |_req| TransportResponse::new(status).body(Bytes::from(body)));
        A2AProtocolService::new(transport, Arc::new(JsonCodec))
    }

    fn get_task_request() -> A2ARequest {
        let operation = A2AOperation::GetTask {
            agent_id: "agent-1".to_string(),
            task_id: "task-123".to_string(),
        };
        A2ARequest::new(operation, RequestContext::default())
    }

    fn cancel_task_request() -> A2ARequest {
        let operation = A2AOperation::CancelTask {
            agent_id: "agent-1".to_string(),
            task_id: "task-123".to_string(),
        };
        A2ARequest::new(operation, RequestContext::default())
    }

    #[tokio::test]
    async fn test_service_get_task() {
        let transport = MockTransport::new(|req| {
            assert_eq!(req.method, "GET");
            assert_eq!(req.endpoint, "/agents/agent-1/v1/tasks/task-123");
            assert!(req.headers.contains_key("X-Request-Id"));
            let task = Task::new("task-123").with_status(TaskStatus::Running);
            TransportResponse::new(200).body(Bytes::from(serde_json::to_vec(&task).unwrap()))
        });
        let mut service = A2AProtocolService::new(transport, Arc::new(JsonCodec));

        let task = service.call(get_task_request()).await.unwrap().into_task().unwrap();
        assert_eq!(task.id, "task-123");
        assert_eq!(task.status, TaskStatus::Running);
    }

    #[tokio::test]
    async fn test_not_found_depends_on_operation() {
        let mut service = service_returning(404, "");
        let err = service.call(get_task_request()).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::TaskNotFound));

        let card_request = A2ARequest::new(
            A2AOperation::GetAgentCard {
                agent_id: "ghost".to_string(),
            },
            RequestContext::default(),
        );
        let err = service.call(card_request).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::AgentNotFound));
    }

    #[tokio::test]
    async fn test_expired_task_is_not_found() {
        let mut service = service_returning(410, r#"{"message": "task expired"}"#);
        let err = service.call(get_task_request()).await.unwrap_err();

        match err {
            A2AError::Protocol(ProtocolError { code, message, data }) => {
                assert_eq!(code, ErrorCode::TaskNotFound);
                assert_eq!(message, "task expired");
                assert_eq!(data.unwrap()["httpStatus"], 410);
            }
            other => panic!("Expected protocol error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_conflict_on_cancel() {
        let mut service = service_returning(409, "");
        let err = service.call(cancel_task_request()).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::TaskNotCancelable));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (400, ErrorCode::InvalidRequest),
            (401, ErrorCode::AuthenticationRequired),
            (403, ErrorCode::AuthenticationRequired),
            (405, ErrorCode::MethodNotFound),
            (408, ErrorCode::AgentTimeout),
            (422, ErrorCode::InvalidParams),
            (429, ErrorCode::ConcurrentExecutionLimit),
            (500, ErrorCode::InternalError),
            (503, ErrorCode::InternalError),
            (504, ErrorCode::AgentTimeout),
            (302, ErrorCode::InternalError),
        ];

        for (status, expected) in cases {
            let mut service = service_returning(status, "not json");
            let err = service.call(get_task_request()).await.unwrap_err();
            assert_eq!(err.code(), Some(expected), "HTTP {status}");
        }
    }

    #[tokio::test]
    async fn test_embedded_error_code_wins() {
        let mut service = service_returning(
            400,
            r#"{"error": {"code": -32603, "message": "database unavailable"}}"#,
        );
        let err = service.call(get_task_request()).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InternalError));
        assert!(err.is_transient());

        let mut service = service_returning(
            500,
            r#"{"code": -32015, "message": "redacted", "data": {"field": "ssn"}}"#,
        );
        let err = service.call(get_task_request()).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::SensitiveDataDetected));
    }

    #[tokio::test]
    async fn test_credentials_skip_card_resolution() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let transport = MockTransport::new(move |req| {
            captured
                .lock()
                .unwrap()
                .push(req.headers.contains_key("Authorization"));
            let card = crate::protocol::AgentCard::new("Agent", "test");
            TransportResponse::new(200).body(Bytes::from(serde_json::to_vec(&card).unwrap()))
        });
        let mut service = A2AProtocolService::new(transport, Arc::new(JsonCodec));
        let context = RequestContext::default().with_auth(AuthCredentials::bearer("secret"));

        for operation in [
            A2AOperation::GetAgentCard {
                agent_id: "agent-1".to_string(),
            },
            A2AOperation::ResolveAgentCard {
                agent_id: "agent-1".to_string(),
            },
        ] {
            service
                .call(A2ARequest::new(operation, context.clone()))
                .await
                .unwrap();
        }

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_extra_headers_do_not_override_protocol_headers() {
        let transport = MockTransport::new(|req| {
            assert_eq!(req.headers.get("X-Tenant").map(String::as_str), Some("acme"));
            assert_eq!(req.headers.get("A2A-Version").map(String::as_str), Some("1.0"));
            assert_ne!(req.headers.get("X-Request-Id").map(String::as_str), Some("fixed"));
            let task = Task::new("task-123");
            TransportResponse::new(200).body(Bytes::from(serde_json::to_vec(&task).unwrap()))
        });
        let mut service = A2AProtocolService::new(transport, Arc::new(JsonCodec));
        let mut request = get_task_request();
        request.context = request
            .context
            .with_metadata("X-Tenant", "acme")
            .with_metadata("A2A-Version", "0.1")
            .with_metadata("X-Request-Id", "fixed");

        service.call(request).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_aborts_in_flight_call() {
        let transport = MockTransport::ok().with_latency(Duration::from_secs(60));
        let mut service = A2AProtocolService::new(transport, Arc::new(JsonCodec));

        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let mut request = get_task_request();
        request.context = RequestContext::new(token).with_timeout(None);

        let started = tokio::time::Instant::now();
        let err = service.call(request).await.unwrap_err();
        assert!(matches!(err, A2AError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_timeout_is_transport_error() {
        let transport = MockTransport::ok().with_latency(Duration::from_secs(60));
        let mut service = A2AProtocolService::new(transport, Arc::new(JsonCodec));

        let mut request = get_task_request();
        request.context = RequestContext::default().with_timeout(Some(Duration::from_secs(2)));

        let err = service.call(request).await.unwrap_err();
        assert!(matches!(err, A2AError::Transport(_)));
        assert!(!err.is_transient());
    }
}
