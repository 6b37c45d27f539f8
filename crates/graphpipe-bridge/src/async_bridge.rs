//! Tokio adapter for [`CommandBridge`].

use std::sync::Arc;

use graphpipe_command::Verb;
use tracing::warn;

use crate::bridge::CommandBridge;
use crate::channel::Ack;
use crate::config::BridgeConfig;
use crate::error::{ChannelError, Result};

/// Async handle to a shared [`CommandBridge`].
///
/// Each submission runs on tokio's blocking pool, so a request task awaiting a
/// slow or absent engine never stalls the executor. Cloning is cheap; all
/// clones share one submission gate. Order is fixed when a submission reaches
/// the gate, not when the future is created.
#[derive(Debug, Clone)]
pub struct AsyncCommandBridge {
    inner: Arc<CommandBridge>,
}

impl AsyncCommandBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self::from_shared(Arc::new(CommandBridge::new(config)))
    }

    /// Wrap a bridge that synchronous callers also use.
    pub fn from_shared(inner: Arc<CommandBridge>) -> Self {
        Self { inner }
    }

    pub fn bridge(&self) -> &Arc<CommandBridge> {
        &self.inner
    }

    /// Submit one command without blocking the calling task.
    pub async fn submit(&self, verb: Verb, label: impl Into<String>) -> Result<Ack> {
        let bridge = Arc::clone(&self.inner);
        let label = label.into();
        match tokio::task::spawn_blocking(move || bridge.submit(verb, &label)).await {
            Ok(result) => result,
            Err(join_err) => {
                warn!(error = %join_err, "submission task did not complete");
                Err(ChannelError::Io {
                    detail: format!("submission task failed: {join_err}"),
                }
                .into())
            }
        }
    }

    /// Submit one command given its verb as raw text.
    pub async fn submit_str(&self, verb: &str, label: impl Into<String>) -> Result<Ack> {
        let verb: Verb = verb.parse()?;
        self.submit(verb, label).await
    }
}

impl From<Arc<CommandBridge>> for AsyncCommandBridge {
    fn from(inner: Arc<CommandBridge>) -> Self {
        Self::from_shared(inner)
    }
}
