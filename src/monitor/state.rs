//! Monitoring state machine

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::protocol::{
    error::{A2AError, A2AResult},
    task::{Task, TaskStatus},
};

/// State of one monitoring session
///
/// `Polling` is the only non-terminal state.
#[derive(Debug)]
pub enum MonitorState {
    Polling,
    Succeeded(Task),
    Failed(A2AError),
    TimedOut,
    Cancelled,
}

impl MonitorState {
    /// Transition taken after one `get_task` call
    ///
    /// A terminal task ends the session whatever its status. Transient errors keep
    /// polling, every other error ends the session.
    pub fn after_poll(outcome: A2AResult<Task>) -> Self {
        match outcome {
            Ok(task) if task.status.is_terminal() => MonitorState::Succeeded(task),
            Ok(_) => MonitorState::Polling,
            Err(err) if err.is_transient() => MonitorState::Polling,
            Err(err) => MonitorState::Failed(err),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, MonitorState::Polling)
    }

    /// The session result, or `None` while still polling
    pub fn into_result(self) -> Option<A2AResult<Task>> {
        match self {
            MonitorState::Polling => None,
            MonitorState::Succeeded(task) => Some(Ok(task)),
            MonitorState::Failed(err) => Some(Err(err)),
            MonitorState::TimedOut => Some(Err(A2AError::Timeout)),
            MonitorState::Cancelled => Some(Err(A2AError::Cancelled)),
        }
    }
}

/// Bookkeeping for one wait-for-completion call
///
/// Lives only as long as the call; nothing is shared between sessions.
#[derive(Debug)]
pub struct MonitorSession {
    polls: u32,
    started: Instant,
    last_status: Option<TaskStatus>,
    last_error: Option<A2AError>,
}

impl MonitorSession {
    pub fn new() -> Self {
        Self {
            polls: 0,
            started: Instant::now(),
            last_status: None,
            last_error: None,
        }
    }

    /// Number of completed `get_task` calls
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Most recent transient error, if any
    pub fn last_error(&self) -> Option<&A2AError> {
        self.last_error.as_ref()
    }

    /// Fold one poll outcome into the session
    pub fn record(&mut self, outcome: A2AResult<Task>) -> MonitorState {
        self.polls += 1;

        match &outcome {
            Ok(task) => {
                self.last_status = Some(task.status);
                debug!(poll = self.polls, status = %task.status, "polled task");
            }
            Err(err) if err.is_transient() => {
                warn!(poll = self.polls, error = %err, "transient failure while polling task");
            }
            Err(_) => {}
        }

        match outcome {
            Err(err) if err.is_transient() => {
                self.last_error = Some(err);
                MonitorState::Polling
            }
            other => MonitorState::after_poll(other),
        }
    }

    /// Turn a state into the session result, logging how the session ended
    pub fn resolve(&self, state: MonitorState) -> Option<A2AResult<Task>> {
        let elapsed = self.started.elapsed();
        match &state {
            MonitorState::Polling => {}
            MonitorState::Succeeded(task) => {
                info!(
                    polls = self.polls,
                    ?elapsed,
                    status = %task.status,
                    "task reached terminal state"
                );
            }
            MonitorState::Failed(err) => {
                warn!(polls = self.polls, ?elapsed, error = %err, "monitoring failed");
            }
            MonitorState::TimedOut => {
                info!(
                    polls = self.polls,
                    ?elapsed,
                    last_status = ?self.last_status,
                    last_error = ?self.last_error.as_ref().map(ToString::to_string),
                    "monitoring deadline elapsed"
                );
            }
            MonitorState::Cancelled => {
                info!(polls = self.polls, ?elapsed, "monitoring cancelled");
            }
        }
        state.into_result()
    }
}

impl Default for MonitorSession {
    fn default() -> Self {
        Self::new()
    }
}
