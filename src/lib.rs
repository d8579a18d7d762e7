//! # Tower A2A Monitor
//!
//! Supervision of long-running tasks on remote Agent2Agent (A2A) agents.
//!
//! Protocol operations go through a Tower service stack (validation, authentication,
//! then the HTTP+JSON binding). On top of it, a [`TaskMonitor`](monitor::TaskMonitor)
//! polls a task until it reaches a terminal status, a deadline elapses, or the caller
//! cancels.
//!
//! ## Features
//!
//! - **Transport Agnostic**: HTTP out of the box, custom transports via the `Transport` trait
//! - **Composable Middleware**: validation and auth as Tower layers
//! - **Cancellable**: every call and every monitoring session honours a `CancellationToken`
//! - **Async**: Built on tokio
//!
//! ## Example
//!
//! ```rust,no_run
//! use tower_a2a_monitor::prelude::*;
//! use tokio_util::sync::CancellationToken;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let url = "https://agents.example.com".parse().unwrap();
//!     let client = A2AClientBuilder::new_http(url)
//!         .with_bearer_auth("token123")
//!         .with_poll_interval(Duration::from_secs(2))
//!         .build()?;
//!
//!     let cancel = CancellationToken::new();
//!     let reply = client
//!         .send_message(&cancel, "summarizer", Message::user("Summarize the report"))
//!         .await?;
//!
//!     if let Some(task_id) = reply.task_id {
//!         let timeout = Duration::from_secs(300);
//!         let task = client
//!             .into_monitor()
//!             .wait_for_completion_with_timeout(&cancel, "summarizer", &task_id, timeout)
//!             .await?;
//!         println!("Task {} finished: {}", task.id, task.status);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod layer;
pub mod monitor;
pub mod protocol;
pub mod service;
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        client::{A2AClientBuilder, AgentClient, ProtocolClient},
        monitor::{MonitorConfig, TaskMonitor},
        protocol::error::{A2AError, A2AResult, ErrorCode},
        protocol::{
            A2AOperation, AgentCard, Message, MessagePart, Role, Task, TaskFilters, TaskStatus,
        },
    };
}
