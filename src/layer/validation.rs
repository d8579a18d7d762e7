//! Validation layer for A2A protocol requests and responses

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower_layer::Layer;
use tower_service::Service;

use crate::{
    protocol::{error::A2AError, message::MessagePart, operation::A2AOperation, task::Task},
    service::{A2ARequest, A2AResponse},
};

/// Layer that validates A2A protocol requests and responses
#[derive(Clone, Debug, Default)]
pub struct A2AValidationLayer;

impl A2AValidationLayer {
    /// Create a new validation layer
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for A2AValidationLayer {
    type Service = A2AValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        A2AValidationService { inner }
    }
}

/// Validation service that wraps an inner service
#[derive(Clone)]
pub struct A2AValidationService<S> {
    inner: S,
}

/// Identifiers are interpolated into URL paths
fn validate_id(kind: &str, id: &str) -> Result<(), A2AError> {
    if id.is_empty() {
        return Err(A2AError::Validation(format!("{kind} ID cannot be empty")));
    }
    if id.contains(['/', '?', '#']) {
        return Err(A2AError::Validation(format!(
            "{kind} ID contains a reserved character: {id}"
        )));
    }
    Ok(())
}

fn validate_task(task: &Task) -> Result<(), A2AError> {
    if task.id.is_empty() {
        return Err(A2AError::Validation("Task ID cannot be empty".into()));
    }

    if let (Some(created), Some(modified)) = (task.created_at, task.modified_at) {
        if modified < created {
            return Err(A2AError::Validation(format!(
                "Task {} was modified ({modified}) before it was created ({created})",
                task.id
            )));
        }
    }

    Ok(())
}

impl<S> A2AValidationService<S> {
    /// Validate an A2A request
    fn validate_request(req: &A2ARequest) -> Result<(), A2AError> {
        validate_id("Agent", req.operation.agent_id())?;

        if let Some(task_id) = req.operation.task_id() {
            validate_id("Task", task_id)?;
        }

        if let A2AOperation::SendMessage { message, .. } = &req.operation {
            if message.parts.is_empty() {
                return Err(A2AError::Validation(
                    "Message must have at least one part".into(),
                ));
            }

            for part in &message.parts {
                match part {
                    MessagePart::Text { text } if text.is_empty() => {
                        return Err(A2AError::Validation("Text part cannot be empty".into()));
                    }
                    MessagePart::File { file } if file.name.is_empty() || file.uri.is_empty() => {
                        return Err(A2AError::Validation(
                            "File part needs both a name and a URI".into(),
                        ));
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Validate an A2A response
    fn validate_response(resp: &A2AResponse) -> Result<(), A2AError> {
        match resp {
            A2AResponse::Task(task) => validate_task(task),
            A2AResponse::TaskList(tasks) => tasks.iter().try_for_each(validate_task),
            A2AResponse::AgentCard(card) if card.name.is_empty() => {
                Err(A2AError::Validation("Agent name cannot be empty".into()))
            }
            _ => Ok(()),
        }
    }
}

impl<S> Service<A2ARequest> for A2AValidationService<S>
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

    fn call(&mut self, req: A2ARequest) -> Self::Future {
        if let Err(e) = Self::validate_request(&req) {
            return Box::pin(async move { Err(e) });
        }

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move {
            let response = inner.call(req).await?;
            Self::validate_response(&response)?;
            Ok(response)
        })
    }
}
