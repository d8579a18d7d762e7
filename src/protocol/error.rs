//! Error types for A2A protocol operations
//!
//! Remote failures are carried as a [`ProtocolError`] whose [`ErrorCode`] is the only
//! thing callers should branch on. The message is advisory.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::task::TaskStatus;

/// Main error type for A2A protocol operations
#[derive(Debug, Error)]
pub enum A2AError {
    /// Network-level failure (connection refused, DNS, TLS, request timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Error reported by the remote agent, already mapped onto the code registry
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Request or response rejected by local validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Client construction or configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A monitoring deadline elapsed before the task reached a terminal state
    #[error("Monitoring deadline exceeded")]
    Timeout,

    /// The governing cancellation token fired
    #[error("Operation cancelled")]
    Cancelled,

    /// A result was requested from a task that has not finished
    #[error("Task {task_id} is not completed (status: {status})")]
    NotCompleted { task_id: String, status: TaskStatus },

    /// Execution time was requested from a task missing a timestamp
    #[error("Task {task_id} timestamps not set")]
    TimestampsNotSet { task_id: String },
}

impl A2AError {
    /// Build a protocol error from a registry code and message
    pub fn protocol(code: ErrorCode, message: impl Into<String>) -> Self {
        A2AError::Protocol(ProtocolError::new(code, message))
    }

    /// Shorthand for a task-not-found protocol error
    pub fn task_not_found(task_id: &str) -> Self {
        Self::protocol(
            ErrorCode::TaskNotFound,
            format!("Task not found: {task_id}"),
        )
    }

    /// The registry code, if this is a protocol error
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            A2AError::Protocol(err) => Some(err.code),
            _ => None,
        }
    }

    /// Whether retrying the same operation later could succeed
    ///
    /// Only opaque internal failures on the remote side qualify. Transport errors,
    /// well-defined protocol errors and unrecognized codes are all terminal.
    pub fn is_transient(&self) -> bool {
        matches!(self.code(), Some(ErrorCode::InternalError))
    }

    /// Whether this error came from cancellation or a deadline rather than the agent
    pub fn is_interrupted(&self) -> bool {
        matches!(self, A2AError::Timeout | A2AError::Cancelled)
    }
}

/// Result type alias for A2A operations
pub type A2AResult<T> = Result<T, A2AError>;

impl From<reqwest::Error> for A2AError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            A2AError::Transport(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            A2AError::Transport(format!("Connection error: {}", err))
        } else {
            A2AError::Transport(err.to_string())
        }
    }
}

/// Structured error returned by a remote agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message} (code {code})")]
pub struct ProtocolError {
    /// Registry code
    pub code: ErrorCode,

    /// Human-readable message, never parsed
    pub message: String,

    /// Optional auxiliary data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProtocolError {
    /// Create a new protocol error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attach auxiliary data
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Closed registry of error codes in a JSON-RPC style numeric space
///
/// Generic codes live in `-32768..=-32600`, protocol specific codes in `-32099..=-32001`.
/// Anything else decodes as [`ErrorCode::Unrecognized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    TaskNotFound,
    TaskNotCancelable,
    AgentNotFound,
    AgentExecutionFailed,
    AuthenticationRequired,
    ConcurrentExecutionLimit,
    AgentTimeout,
    SensitiveDataDetected,
    /// A code outside the registry, kept verbatim
    Unrecognized(i64),
}

impl ErrorCode {
    /// Numeric wire value
    pub fn as_i64(self) -> i64 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::TaskNotFound => -32001,
            ErrorCode::TaskNotCancelable => -32002,
            ErrorCode::AgentNotFound => -32010,
            ErrorCode::AgentExecutionFailed => -32011,
            ErrorCode::AuthenticationRequired => -32012,
            ErrorCode::ConcurrentExecutionLimit => -32013,
            ErrorCode::AgentTimeout => -32014,
            ErrorCode::SensitiveDataDetected => -32015,
            ErrorCode::Unrecognized(code) => code,
        }
    }

    /// Whether the code belongs to the generic JSON-RPC band
    pub fn is_generic(self) -> bool {
        matches!(
            self,
            ErrorCode::ParseError
                | ErrorCode::InvalidRequest
                | ErrorCode::MethodNotFound
                | ErrorCode::InvalidParams
                | ErrorCode::InternalError
        )
    }

    /// Canonical message for the code
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Invalid JSON payload",
            ErrorCode::InvalidRequest => "Request payload validation error",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid parameters",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::TaskNotFound => "Task not found",
            ErrorCode::TaskNotCancelable => "Task cannot be canceled",
            ErrorCode::AgentNotFound => "Agent not found",
            ErrorCode::AgentExecutionFailed => "Agent execution failed",
            ErrorCode::AuthenticationRequired => "Authentication required",
            ErrorCode::ConcurrentExecutionLimit => "Concurrent execution limit reached",
            ErrorCode::AgentTimeout => "Agent timed out",
            ErrorCode::SensitiveDataDetected => "Sensitive data detected",
            ErrorCode::Unrecognized(_) => "Unrecognized error",
        }
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        match code {
            -32700 => ErrorCode::ParseError,
            -32600 => ErrorCode::InvalidRequest,
            -32601 => ErrorCode::MethodNotFound,
            -32602 => ErrorCode::InvalidParams,
            -32603 => ErrorCode::InternalError,
            -32001 => ErrorCode::TaskNotFound,
            -32002 => ErrorCode::TaskNotCancelable,
            -32010 => ErrorCode::AgentNotFound,
            -32011 => ErrorCode::AgentExecutionFailed,
            -32012 => ErrorCode::AuthenticationRequired,
            -32013 => ErrorCode::ConcurrentExecutionLimit,
            -32014 => ErrorCode::AgentTimeout,
            -32015 => ErrorCode::SensitiveDataDetected,
            other => ErrorCode::Unrecognized(other),
        }
    }
}

impl From<ErrorCode> for i64 {
    fn from(code: ErrorCode) -> Self {
        code.as_i64()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}
