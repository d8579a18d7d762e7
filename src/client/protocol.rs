//! The protocol capability the task monitor depends on

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::protocol::{
    error::A2AResult,
    message::Message,
    operation::TaskFilters,
    task::Task,
};

/// Single remote protocol operations against an agent
///
/// Each call either returns a typed value or an [`A2AError`](crate::protocol::A2AError);
/// non-2xx outcomes are never discarded. When `cancel` fires, an in-flight call returns
/// `A2AError::Cancelled` promptly.
///
/// Implementations must be safe to share between concurrent monitoring sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProtocolClient: Send + Sync + 'static {
    /// Fetch the current snapshot of a task
    async fn get_task(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
        task_id: &str,
    ) -> A2AResult<Task>;

    /// List tasks matching attribute filters
    async fn list_tasks(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
        filters: &TaskFilters,
    ) -> A2AResult<Vec<Task>>;

    /// Ask the agent to cancel a task
    ///
    /// Cancelling an already terminal task fails with a task-not-cancelable error,
    /// whether or not it was cancelled before; the agent decides.
    async fn cancel_task(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
        task_id: &str,
    ) -> A2AResult<Task>;

    /// Send a message and return the agent's reply
    async fn send_message(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
        message: Message,
    ) -> A2AResult<Message>;
}
