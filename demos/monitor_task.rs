//! Submit a message to an agent and wait for the resulting task
//!
//! ```text
//! A2A_AGENT_URL=https://agents.example.com A2A_AGENT_ID=summarizer A2A_TOKEN=... \
//!     RUST_LOG=tower_a2a_monitor=debug cargo run --example monitor_task -- "Summarize the report"
//! ```
//!
//! Press Ctrl-C to stop waiting; the remote task keeps running.

use std::{env, time::Duration};

use anyhow::{bail, Context};
use tokio_util::sync::CancellationToken;
use tower_a2a_monitor::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let agent_url = env::var("A2A_AGENT_URL").context("A2A_AGENT_URL is not set")?;
    let agent_id = env::var("A2A_AGENT_ID").context("A2A_AGENT_ID is not set")?;
    let prompt = env::args().nth(1).unwrap_or_else(|| "Hello, agent!".to_string());

    let agent_url = agent_url
        .parse::<url::Url>()
        .context("invalid A2A_AGENT_URL")?;
    let mut builder =
        A2AClientBuilder::new_http(agent_url).with_poll_interval(Duration::from_secs(2));
    if let Ok(token) = env::var("A2A_TOKEN") {
        builder = builder.with_bearer_auth(token);
    }
    let client = builder.build()?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let card = client.resolve_agent_card(&cancel, &agent_id).await?;
    println!("Connected to {} ({})", card.name, card.description);

    let reply = client
        .send_message(&cancel, &agent_id, Message::user(prompt))
        .await?;
    let Some(task_id) = reply.task_id.clone() else {
        println!("{}", reply.text());
        return Ok(());
    };
    println!("Task {task_id} submitted, waiting for it to finish");

    let monitor = client.into_monitor();
    let task = match monitor
        .wait_for_completion_with_timeout(&cancel, &agent_id, &task_id, DEFAULT_TIMEOUT)
        .await
    {
        Ok(task) => task,
        Err(A2AError::Cancelled) => {
            println!("Stopped waiting; task {task_id} is still owned by the agent");
            return Ok(());
        }
        Err(A2AError::Timeout) => bail!("task {task_id} did not finish within {DEFAULT_TIMEOUT:?}"),
        Err(err) => return Err(err.into()),
    };

    let result = task.result()?;
    println!("Task {} finished: {}", result.task_id, result.status);
    if let Ok(elapsed) = task.execution_time() {
        println!("Execution time: {}s", elapsed.num_seconds());
    }
    for artifact in &result.artifacts {
        println!(
            "Artifact {} ({}) {}",
            artifact.id,
            artifact.artifact_type,
            artifact.uri.as_deref().unwrap_or("-")
        );
    }
    if let Some(message) = result.final_message {
        println!("{}", message.text());
    }

    Ok(())
}
