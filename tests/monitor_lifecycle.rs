//! End-to-end monitoring through the full client stack
//!
//! A scripted in-process agent stands in for the network; tokio's paused clock keeps
//! every poll interval instant.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    task::{Context, Poll},
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower_a2a_monitor::{
    client::ClientService,
    prelude::*,
    transport::{Transport, TransportRequest, TransportResponse},
};
use url::Url;

/// An agent that answers from a queue of canned responses and records every request
#[derive(Clone)]
struct ScriptedAgent {
    base_url: Url,
    responses: Arc<Mutex<VecDeque<TransportResponse>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl ScriptedAgent {
    fn new(responses: Vec<TransportResponse>) -> Self {
        Self {
            base_url: "https://agents.example.com".parse().unwrap(),
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedAgent {
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), A2AError>> {
        Poll::Ready(Ok(()))
    }

    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, A2AError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| A2AError::Transport("connection reset".into()))
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }
}

fn task_response(status: TaskStatus) -> TransportResponse {
    let task = Task::new("task-1").with_status(status);
    TransportResponse::new(200).body(Bytes::from(serde_json::to_vec(&task).unwrap()))
}

fn error_response(status: u16, body: serde_json::Value) -> TransportResponse {
    TransportResponse::new(status).body(Bytes::from(serde_json::to_vec(&body).unwrap()))
}

type ScriptedMonitor = TaskMonitor<AgentClient<ClientService<ScriptedAgent>>>;

fn monitor_for(agent: &ScriptedAgent) -> ScriptedMonitor {
    A2AClientBuilder::new(agent.base_url.clone())
        .with_transport(agent.clone())
        .with_bearer_auth("secret")
        .with_poll_interval(Duration::from_secs(2))
        .build()
        .unwrap()
        .into_monitor()
}

#[tokio::test(start_paused = true)]
async fn test_monitor_until_success() {
    let agent = ScriptedAgent::new(vec![
        task_response(TaskStatus::Created),
        task_response(TaskStatus::Running),
        task_response(TaskStatus::Succeeded),
    ]);
    let monitor = monitor_for(&agent);

    let task = monitor
        .wait_for_completion(&CancellationToken::new(), "summarizer", "task-1")
        .await
        .unwrap();

    assert_eq!(task.status, TaskStatus::Succeeded);

    let requests = agent.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert_eq!(request.method, "GET");
        assert_eq!(request.endpoint, "/agents/summarizer/v1/tasks/task-1");
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Bearer secret")
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_server_errors_are_retried() {
    let agent = ScriptedAgent::new(vec![
        TransportResponse::new(503),
        error_response(500, json!({"error": {"code": -32603, "message": "db timeout"}})),
        task_response(TaskStatus::Expired),
    ]);
    let monitor = monitor_for(&agent);

    let task = monitor
        .wait_for_completion(&CancellationToken::new(), "summarizer", "task-1")
        .await
        .unwrap();

    assert_eq!(task.status, TaskStatus::Expired);
    assert_eq!(agent.requests().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_missing_task_fails_fast() {
    let agent = ScriptedAgent::new(vec![TransportResponse::new(404)]);
    let monitor = monitor_for(&agent);

    let err = monitor
        .wait_for_completion(&CancellationToken::new(), "summarizer", "task-1")
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::TaskNotFound));
    assert_eq!(agent.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_embedded_error_wins_over_status() {
    let agent = ScriptedAgent::new(vec![error_response(
        400,
        json!({"code": -32015, "message": "prompt contains credentials"}),
    )]);
    let monitor = monitor_for(&agent);

    let err = monitor
        .wait_for_completion(&CancellationToken::new(), "summarizer", "task-1")
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::SensitiveDataDetected));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_through_full_stack() {
    let agent = ScriptedAgent::new(
        std::iter::repeat_with(|| task_response(TaskStatus::Running))
            .take(100)
            .collect(),
    );
    let monitor = monitor_for(&agent);

    let err = monitor
        .wait_for_completion_with_timeout(
            &CancellationToken::new(),
            "summarizer",
            "task-1",
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, A2AError::Timeout));
    // Polls at 0s, 2s and 4s; the deadline lands during the next pause
    assert_eq!(agent.requests().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_submit_then_monitor_in_background() {
    let reply = Message::agent("accepted").with_task_id("task-1");
    let agent = ScriptedAgent::new(vec![
        TransportResponse::new(200).body(Bytes::from(serde_json::to_vec(&reply).unwrap())),
        task_response(TaskStatus::Running),
        task_response(TaskStatus::Cancelled),
    ]);
    let client = A2AClientBuilder::new(agent.base_url.clone())
        .with_transport(agent.clone())
        .with_poll_interval(Duration::from_millis(500))
        .build()
        .unwrap();
    let cancel = CancellationToken::new();

    let reply = client
        .send_message(&cancel, "summarizer", Message::user("Summarize the quarterly report"))
        .await
        .unwrap();
    let task_id = reply.task_id.unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel();
    let handle = client
        .into_monitor()
        .monitor_async(cancel, "summarizer", task_id, move |result| {
            let _ = tx.send(result);
        });

    let task = rx.await.unwrap().unwrap();
    handle.await.unwrap();

    assert_eq!(task.status, TaskStatus::Cancelled);
    let requests = agent.requests();
    assert_eq!(requests[0].endpoint, "/agents/summarizer/v1/message:send");
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests.len(), 3);
}
