//! Task monitoring
//!
//! A [`TaskMonitor`] polls a task through any [`ProtocolClient`](crate::client::ProtocolClient)
//! until it reaches a terminal status, a deadline elapses, or the caller cancels.

pub mod config;
pub mod state;
pub mod task_monitor;

pub use config::{MonitorConfig, DEFAULT_POLL_INTERVAL};
pub use state::{MonitorSession, MonitorState};
pub use task_monitor::TaskMonitor;
