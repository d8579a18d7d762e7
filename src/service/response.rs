//! A2A service response types

use crate::protocol::{agent::AgentCard, message::Message, task::Task};

/// Response from an A2A service operation
#[derive(Debug, Clone)]
pub enum A2AResponse {
    /// Task response (from GetTask, CancelTask)
    Task(Box<Task>),

    /// Task list response (from ListTasks)
    TaskList(Vec<Task>),

    /// Reply message (from SendMessage)
    Message(Box<Message>),

    /// Agent card response (from GetAgentCard, ResolveAgentCard)
    AgentCard(Box<AgentCard>),
}

impl A2AResponse {
    /// Extract a task from the response, if present
    pub fn into_task(self) -> Option<Task> {
        match self {
            A2AResponse::Task(task) => Some(*task),
            _ => None,
        }
    }

    /// Extract a task list from the response, if present
    pub fn into_task_list(self) -> Option<Vec<Task>> {
        match self {
            A2AResponse::TaskList(tasks) => Some(tasks),
            _ => None,
        }
    }

    /// Extract a message from the response, if present
    pub fn into_message(self) -> Option<Message> {
        match self {
            A2AResponse::Message(message) => Some(*message),
            _ => None,
        }
    }

    /// Extract an agent card from the response, if present
    pub fn into_agent_card(self) -> Option<AgentCard> {
        match self {
            A2AResponse::AgentCard(card) => Some(*card),
            _ => None,
        }
    }
}
