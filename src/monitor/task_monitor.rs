//! Poll-until-terminal supervision of remote tasks

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info_span, Instrument};

use crate::{
    client::ProtocolClient,
    monitor::{
        config::MonitorConfig,
        state::{MonitorSession, MonitorState},
    },
    protocol::{error::A2AResult, task::Task},
};

/// Watches remote tasks until they reach a terminal status
///
/// One monitor can run any number of sessions concurrently; sessions share the
/// client and the configuration, nothing else. Within a session polls never
/// overlap: the next `get_task` starts `poll_interval` after the previous one
/// returned.
///
/// A task that ends `failed`, `cancelled` or `expired` is still a successful
/// result. Errors are reserved for failures to observe the task.
///
/// # Example
///
/// ```rust,no_run
/// use tower_a2a_monitor::prelude::*;
/// use tokio_util::sync::CancellationToken;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), A2AError> {
/// let url = "https://agents.example.com".parse().unwrap();
/// let monitor = A2AClientBuilder::new_http(url).build()?.into_monitor();
///
/// let cancel = CancellationToken::new();
/// let timeout = Duration::from_secs(300);
/// let task = monitor
///     .wait_for_completion_with_timeout(&cancel, "summarizer", "task-123", timeout)
///     .await?;
/// println!("Finished with status {}", task.status);
/// # Ok(())
/// # }
/// ```
pub struct TaskMonitor<C> {
    client: Arc<C>,
    config: MonitorConfig,
}

impl<C> Clone for TaskMonitor<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
        }
    }
}

impl<C: ProtocolClient> TaskMonitor<C> {
    pub fn new(client: C, config: MonitorConfig) -> Self {
        Self::from_shared(Arc::new(client), config)
    }

    /// Build a monitor around a client that is already shared
    pub fn from_shared(client: Arc<C>, config: MonitorConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Poll `task_id` until it is terminal
    ///
    /// Bounded by `max_wait` when configured, otherwise only by `cancel`.
    ///
    /// # Errors
    ///
    /// * `A2AError::Cancelled` once `cancel` fires
    /// * `A2AError::Timeout` once `max_wait` elapses
    /// * the first non-transient error returned by `get_task`
    pub async fn wait_for_completion(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
        task_id: &str,
    ) -> A2AResult<Task> {
        let deadline = deadline_after(Instant::now(), self.config.max_wait);
        self.run(cancel, agent_id, task_id, deadline).await
    }

    /// Like [`wait_for_completion`](Self::wait_for_completion) with an explicit deadline
    ///
    /// When `max_wait` is also configured the earlier of the two deadlines applies.
    pub async fn wait_for_completion_with_timeout(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
        task_id: &str,
        timeout: Duration,
    ) -> A2AResult<Task> {
        let now = Instant::now();
        let deadline = match (
            deadline_after(now, Some(timeout)),
            deadline_after(now, self.config.max_wait),
        ) {
            (Some(explicit), Some(configured)) => Some(explicit.min(configured)),
            (explicit, configured) => explicit.or(configured),
        };
        self.run(cancel, agent_id, task_id, deadline).await
    }

    /// Monitor in the background and hand the outcome to `callback`
    ///
    /// Returns immediately. The callback runs exactly once, on the spawned task,
    /// with the same result [`wait_for_completion`](Self::wait_for_completion)
    /// would have returned. Cancelling `cancel` resolves the session as cancelled
    /// and the callback still fires once with that error.
    pub fn monitor_async<F>(
        &self,
        cancel: CancellationToken,
        agent_id: impl Into<String>,
        task_id: impl Into<String>,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(A2AResult<Task>) + Send + 'static,
    {
        let monitor = self.clone();
        let agent_id = agent_id.into();
        let task_id = task_id.into();

        tokio::spawn(async move {
            let result = monitor
                .wait_for_completion(&cancel, &agent_id, &task_id)
                .await;
            callback(result);
        })
    }

    async fn run(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
        task_id: &str,
        deadline: Option<Instant>,
    ) -> A2AResult<Task> {
        let span = info_span!("monitor_task", agent_id, task_id);

        async move {
            let mut session = MonitorSession::new();

            loop {
                let state = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => MonitorState::Cancelled,
                    _ = deadline_elapsed(deadline) => MonitorState::TimedOut,
                    outcome = self.client.get_task(cancel, agent_id, task_id) => {
                        session.record(outcome)
                    }
                };
                if let Some(result) = session.resolve(state) {
                    return result;
                }

                let state = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => MonitorState::Cancelled,
                    _ = deadline_elapsed(deadline) => MonitorState::TimedOut,
                    _ = tokio::time::sleep(self.config.poll_interval) => MonitorState::Polling,
                };
                if let Some(result) = session.resolve(state) {
                    return result;
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// `now + bound`, or `None` when there is no bound or it is too large to represent
fn deadline_after(now: Instant, bound: Option<Duration>) -> Option<Instant> {
    bound.and_then(|bound| now.checked_add(bound))
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
