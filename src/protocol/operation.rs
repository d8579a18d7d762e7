//! A2A protocol operations

use std::collections::BTreeMap;

use url::form_urlencoded;

use super::message::Message;

/// Attribute filters for listing tasks, e.g. `status=running`
///
/// Keys the agent does not understand are ignored remotely, not validated locally.
pub type TaskFilters = BTreeMap<String, String>;

/// A2A protocol operations
///
/// Every operation addresses one agent behind the configured base URL.
#[derive(Debug, Clone)]
pub enum A2AOperation {
    /// Send a message to an agent
    SendMessage { agent_id: String, message: Message },

    /// Get a task by ID
    GetTask { agent_id: String, task_id: String },

    /// List tasks matching the filters
    ListTasks {
        agent_id: String,
        filters: TaskFilters,
    },

    /// Cancel a task
    CancelTask { agent_id: String, task_id: String },

    /// Fetch the agent card through the authenticated API
    GetAgentCard { agent_id: String },

    /// Fetch the public agent card from the well-known path
    ResolveAgentCard { agent_id: String },
}

impl A2AOperation {
    /// The agent this operation targets
    pub fn agent_id(&self) -> &str {
        match self {
            A2AOperation::SendMessage { agent_id, .. }
            | A2AOperation::GetTask { agent_id, .. }
            | A2AOperation::ListTasks { agent_id, .. }
            | A2AOperation::CancelTask { agent_id, .. }
            | A2AOperation::GetAgentCard { agent_id }
            | A2AOperation::ResolveAgentCard { agent_id } => agent_id,
        }
    }

    /// The task this operation targets, if any
    pub fn task_id(&self) -> Option<&str> {
        match self {
            A2AOperation::GetTask { task_id, .. } | A2AOperation::CancelTask { task_id, .. } => {
                Some(task_id)
            }
            _ => None,
        }
    }

    /// Get the HTTP endpoint path for this operation, including any query string
    pub fn endpoint(&self) -> String {
        match self {
            A2AOperation::SendMessage { agent_id, .. } => {
                format!("/agents/{}/v1/message:send", agent_id)
            }
            A2AOperation::GetTask { agent_id, task_id } => {
                format!("/agents/{}/v1/tasks/{}", agent_id, task_id)
            }
            A2AOperation::ListTasks { agent_id, filters } => {
                let path = format!("/agents/{}/v1/tasks", agent_id);
                if filters.is_empty() {
                    return path;
                }
                let query = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(filters.iter())
                    .finish();
                format!("{}?{}", path, query)
            }
            A2AOperation::CancelTask { agent_id, task_id } => {
                format!("/agents/{}/v1/tasks/{}:cancel", agent_id, task_id)
            }
            A2AOperation::GetAgentCard { agent_id } => format!("/agents/{}/v1/card", agent_id),
            A2AOperation::ResolveAgentCard { agent_id } => {
                format!("/agents/{}/.well-known/agent-card.json", agent_id)
            }
        }
    }

    /// Get the HTTP method for this operation
    pub fn method(&self) -> &'static str {
        match self {
            A2AOperation::SendMessage { .. } | A2AOperation::CancelTask { .. } => "POST",
            A2AOperation::GetTask { .. }
            | A2AOperation::ListTasks { .. }
            | A2AOperation::GetAgentCard { .. }
            | A2AOperation::ResolveAgentCard { .. } => "GET",
        }
    }

    /// Whether the request must carry credentials
    pub fn requires_auth(&self) -> bool {
        !matches!(self, A2AOperation::ResolveAgentCard { .. })
    }

    /// Short name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            A2AOperation::SendMessage { .. } => "send_message",
            A2AOperation::GetTask { .. } => "get_task",
            A2AOperation::ListTasks { .. } => "list_tasks",
            A2AOperation::CancelTask { .. } => "cancel_task",
            A2AOperation::GetAgentCard { .. } => "get_agent_card",
            A2AOperation::ResolveAgentCard { .. } => "resolve_agent_card",
        }
    }
}
