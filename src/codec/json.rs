//! JSON codec for HTTP+JSON binding

use bytes::Bytes;
use serde_json::json;

use crate::{
    codec::Codec,
    protocol::{
        agent::AgentCard,
        error::A2AError,
        message::Message,
        operation::A2AOperation,
        task::{Task, TaskListResponse},
    },
    service::response::A2AResponse,
};

/// JSON codec for the HTTP+JSON protocol binding
#[derive(Debug, Clone, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Create a new JSON codec
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JsonCodec {
    fn encode_request(&self, operation: &A2AOperation) -> Result<Bytes, A2AError> {
        match operation {
            A2AOperation::SendMessage { message, .. } => {
                let body = serde_json::to_vec(&json!({ "message": message }))?;
                Ok(Bytes::from(body))
            }
            // Everything else is addressed purely by path and query
            _ => Ok(Bytes::new()),
        }
    }

    fn decode_response(
        &self,
        body: &[u8],
        operation: &A2AOperation,
    ) -> Result<A2AResponse, A2AError> {
        if body.is_empty() {
            return Err(A2AError::Validation(format!(
                "Empty response body for {}",
                operation.name()
            )));
        }

        match operation {
            A2AOperation::GetTask { .. } | A2AOperation::CancelTask { .. } => {
                let task: Task = serde_json::from_slice(body)?;
                Ok(A2AResponse::Task(Box::new(task)))
            }
            A2AOperation::ListTasks { .. } => {
                let list: TaskListResponse = serde_json::from_slice(body)?;
                Ok(A2AResponse::TaskList(list.tasks))
            }
            A2AOperation::SendMessage { .. } => {
                let message: Message = serde_json::from_slice(body)?;
                Ok(A2AResponse::Message(Box::new(message)))
            }
            A2AOperation::GetAgentCard { .. } | A2AOperation::ResolveAgentCard { .. } => {
                let card: AgentCard = serde_json::from_slice(body)?;
                Ok(A2AResponse::AgentCard(Box::new(card)))
            }
        }
    }

    fn content_type(&self) -> &str {
        "application/a2a+json"
    }
}
