//! A2A task types and lifecycle helpers

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    error::{A2AError, A2AResult},
    message::Message,
    Artifact,
};

/// A snapshot of one unit of remote asynchronous work
///
/// The remote agent owns the authoritative task. Every `get_task` call yields a fresh,
/// independently owned snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque task identifier
    pub id: String,

    /// Current status of the task
    pub status: TaskStatus,

    /// Messages exchanged so far, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Message>,

    /// Artifacts produced by the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<Artifact>>,

    /// When the task was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// When the task was last modified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,

    /// Optional context ID for grouping related tasks/messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

impl Task {
    /// Create a task in the `created` state, stamped now
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            status: TaskStatus::Created,
            history: Vec::new(),
            artifacts: None,
            created_at: Some(now),
            modified_at: Some(now),
            context_id: None,
        }
    }

    /// Move to `status`, bumping the modification time
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self.modified_at = Some(Utc::now());
        self
    }

    /// Append a message to the history
    pub fn with_history_message(mut self, message: Message) -> Self {
        self.history.push(message);
        self
    }

    /// Attach an artifact
    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.get_or_insert_with(Vec::new).push(artifact);
        self
    }

    /// Set the context ID
    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    /// Whether the task has reached a terminal status
    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Time between creation and last modification
    ///
    /// # Errors
    ///
    /// Returns `A2AError::TimestampsNotSet` if either timestamp is missing
    pub fn execution_time(&self) -> A2AResult<chrono::Duration> {
        match (self.created_at, self.modified_at) {
            (Some(created), Some(modified)) => Ok(modified - created),
            _ => Err(A2AError::TimestampsNotSet {
                task_id: self.id.clone(),
            }),
        }
    }

    /// The outcome of a finished task
    ///
    /// A task that finished unsuccessfully still has a result; its status says how it ended.
    ///
    /// # Errors
    ///
    /// Returns `A2AError::NotCompleted` while the task is still in flight
    pub fn result(&self) -> A2AResult<TaskResult> {
        if !self.is_completed() {
            return Err(A2AError::NotCompleted {
                task_id: self.id.clone(),
                status: self.status,
            });
        }

        Ok(TaskResult {
            task_id: self.id.clone(),
            status: self.status,
            artifacts: self.artifacts.clone().unwrap_or_default(),
            final_message: self.history.last().cloned(),
        })
    }
}

/// Outcome extracted from a completed task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    pub task_id: String,
    pub status: TaskStatus,
    pub artifacts: Vec<Artifact>,
    pub final_message: Option<Message>,
}

impl TaskResult {
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Succeeded
    }
}

/// Task status in the A2A lifecycle
///
/// created → running → succeeded/failed/cancelled/expired. Once terminal, never changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Accepted by the agent, not yet started
    Created,

    /// Being processed
    Running,

    /// Finished successfully
    Succeeded,

    /// Finished with an error
    Failed,

    /// Cancelled before finishing
    Cancelled,

    /// Dropped by the agent after its retention window
    Expired,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Created,
        TaskStatus::Running,
        TaskStatus::Succeeded,
        TaskStatus::Failed,
        TaskStatus::Cancelled,
        TaskStatus::Expired,
    ];

    /// Check if this is a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Cancelled | TaskStatus::Expired
        )
    }

    /// Wire name, also used as the `status` list filter value
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Created => "created",
            TaskStatus::Running => "running",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response from listing tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    /// List of tasks
    pub tasks: Vec<Task>,
}
