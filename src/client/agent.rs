//! High-level A2A agent client

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tower_service::Service;

use crate::{
    client::{config::ClientConfig, protocol::ProtocolClient},
    monitor::TaskMonitor,
    protocol::{
        error::{A2AError, A2AResult},
        operation::TaskFilters,
        A2AOperation, AgentCard, Message, Task,
    },
    service::{A2ARequest, A2AResponse, RequestContext},
};

/// High-level A2A client for interacting with agents
///
/// This client wraps a Tower service and exposes the protocol operations. Every call
/// drives a fresh clone of the service, so one client can back many concurrent
/// monitoring sessions.
///
/// # Example
///
/// ```rust,no_run
/// use tower_a2a_monitor::prelude::*;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), A2AError> {
/// let url = "https://agents.example.com".parse().unwrap();
/// let client = A2AClientBuilder::new_http(url)
///     .with_bearer_auth("token123")
///     .build()?;
///
/// let cancel = CancellationToken::new();
/// let reply = client
///     .send_message(&cancel, "summarizer", Message::user("Hello, agent!"))
///     .await?;
/// println!("Task created: {:?}", reply.task_id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AgentClient<S> {
    service: S,
    config: ClientConfig,
}

impl<S> AgentClient<S>
where
    S: Service<A2ARequest, Response = A2AResponse, Error = A2AError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    /// Create a new agent client
    ///
    /// # Arguments
    ///
    /// * `service` - The Tower service that handles requests
    /// * `config` - Client configuration
    pub fn new(service: S, config: ClientConfig) -> Self {
        Self { service, config }
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a task monitor that polls through this client
    pub fn into_monitor(self) -> TaskMonitor<Self> {
        let monitor_config = self.config.monitor.clone();
        TaskMonitor::new(self, monitor_config)
    }

    /// Build a request context from the client configuration
    fn build_context(&self, cancel: &CancellationToken) -> RequestContext {
        let context = RequestContext::new(cancel.clone()).with_timeout(self.config.timeout);
        self.config
            .headers
            .iter()
            .fold(context, |context, (name, value)| context.with_metadata(name, value))
    }

    /// Run one operation through a fresh clone of the service
    async fn execute(
        &self,
        cancel: &CancellationToken,
        operation: A2AOperation,
    ) -> A2AResult<A2AResponse> {
        let request = A2ARequest::new(operation, self.build_context(cancel));
        self.service.clone().oneshot(request).await
    }

    /// Fetch the agent card through the authenticated API
    pub async fn get_agent_card(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
    ) -> A2AResult<AgentCard> {
        let operation = A2AOperation::GetAgentCard {
            agent_id: agent_id.to_string(),
        };

        self.execute(cancel, operation)
            .await?
            .into_agent_card()
            .ok_or_else(|| unexpected("agent card", "get_agent_card"))
    }

    /// Fetch the public agent card from the well-known path, without credentials
    pub async fn resolve_agent_card(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
    ) -> A2AResult<AgentCard> {
        let operation = A2AOperation::ResolveAgentCard {
            agent_id: agent_id.to_string(),
        };

        self.execute(cancel, operation)
            .await?
            .into_agent_card()
            .ok_or_else(|| unexpected("agent card", "resolve_agent_card"))
    }
}

fn unexpected(expected: &str, operation: &str) -> A2AError {
    A2AError::Validation(format!("Expected {expected} response from {operation}"))
}

#[async_trait]
impl<S> ProtocolClient for AgentClient<S>
where
    S: Service<A2ARequest, Response = A2AResponse, Error = A2AError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    async fn get_task(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
        task_id: &str,
    ) -> A2AResult<Task> {
        let operation = A2AOperation::GetTask {
            agent_id: agent_id.to_string(),
            task_id: task_id.to_string(),
        };

        self.execute(cancel, operation)
            .await?
            .into_task()
            .ok_or_else(|| unexpected("task", "get_task"))
    }

    async fn list_tasks(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
        filters: &TaskFilters,
    ) -> A2AResult<Vec<Task>> {
        let operation = A2AOperation::ListTasks {
            agent_id: agent_id.to_string(),
            filters: filters.clone(),
        };

        self.execute(cancel, operation)
            .await?
            .into_task_list()
            .ok_or_else(|| unexpected("task list", "list_tasks"))
    }

    async fn cancel_task(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
        task_id: &str,
    ) -> A2AResult<Task> {
        let operation = A2AOperation::CancelTask {
            agent_id: agent_id.to_string(),
            task_id: task_id.to_string(),
        };

        self.execute(cancel, operation)
            .await?
            .into_task()
            .ok_or_else(|| unexpected("task", "cancel_task"))
    }

    async fn send_message(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
        message: Message,
    ) -> A2AResult<Message> {
        let operation = A2AOperation::SendMessage {
            agent_id: agent_id.to_string(),
            message,
        };

        self.execute(cancel, operation)
            .await?
            .into_message()
            .ok_or_else(|| unexpected("message", "send_message"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;

    use crate::{
        codec::JsonCodec,
        protocol::{agent::AgentCard, error::ErrorCode, task::TaskStatus},
        service::A2AProtocolService,
        transport::{mock::MockTransport, TransportRequest, TransportResponse},
    };

    use super::*;

    fn client_with<F>(handler: F) -> AgentClient<A2AProtocolService<MockTransport>>
    where
        F: Fn(TransportRequest) -> TransportResponse + Send + Sync + 'static,
    {
        let service = A2AProtocolService::new(MockTransport::new(handler), Arc::new(JsonCodec));
        AgentClient::new(service, ClientConfig::new("mock://agents"))
    }

    fn json_response<T: serde::Serialize>(value: &T) -> TransportResponse {
        TransportResponse::new(200).body(Bytes::from(serde_json::to_vec(value).unwrap()))
    }

    #[tokio::test]
    async fn test_send_message() {
        let client = client_with(|req| {
            assert_eq!(req.endpoint, "/agents/agent-1/v1/message:send");
            json_response(&Message::agent("working on it").with_task_id("task-123"))
        });

        let reply = client
            .send_message(&CancellationToken::new(), "agent-1", Message::user("Hello"))
            .await
            .unwrap();

        assert_eq!(reply.task_id.as_deref(), Some("task-123"));
    }

    #[tokio::test]
    async fn test_get_task() {
        let client = client_with(|_req| json_response(&Task::new("task-456")));

        let task = client
            .get_task(&CancellationToken::new(), "agent-1", "task-456")
            .await
            .unwrap();

        assert_eq!(task.id, "task-456");
    }

    #[tokio::test]
    async fn test_list_tasks_forwards_filters() {
        let endpoints = Arc::new(Mutex::new(Vec::new()));
        let seen = endpoints.clone();
        let client = client_with(move |req| {
            seen.lock().unwrap().push(req.endpoint.clone());
            json_response(&serde_json::json!({
                "tasks": [Task::new("a").with_status(TaskStatus::Running)]
            }))
        });

        let mut filters = TaskFilters::new();
        filters.insert("status".into(), TaskStatus::Running.to_string());
        let tasks = client
            .list_tasks(&CancellationToken::new(), "agent-1", &filters)
            .await
            .unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(
            *endpoints.lock().unwrap(),
            vec!["/agents/agent-1/v1/tasks?status=running".to_string()]
        );
    }

    #[tokio::test]
    async fn test_cancel_terminal_task() {
        let client = client_with(|req| {
            assert_eq!(req.method, "POST");
            TransportResponse::new(409)
        });

        let err = client
            .cancel_task(&CancellationToken::new(), "agent-1", "task-1")
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::TaskNotCancelable));
    }

    #[tokio::test]
    async fn test_agent_cards() {
        let client =
            client_with(|_req| json_response(&AgentCard::new("Test Agent", "A test agent")));
        let cancel = CancellationToken::new();

        assert_eq!(
            client.get_agent_card(&cancel, "agent-1").await.unwrap().name,
            "Test Agent"
        );
        assert_eq!(
            client.resolve_agent_card(&cancel, "agent-1").await.unwrap().name,
            "Test Agent"
        );
    }

    #[tokio::test]
    async fn test_pre_cancelled_token() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let client = client_with(move |_req| {
            *counter.lock().unwrap() += 1;
            json_response(&Task::new("t"))
        });

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client.get_task(&cancel, "agent-1", "t").await.unwrap_err();
        assert!(matches!(err, A2AError::Cancelled));
        assert_eq!(*calls.lock().unwrap(), 0);
    }
}
