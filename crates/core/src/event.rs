//! Pipeline event system: decoupled observation of pipeline runs.
//!
//! Events are published as a run moves through its stages. Delivery layers
//! (CLI, gateway) subscribe to surface progress without coupling to the
//! orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All pipeline events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A validated payload entered the pipeline
    PayloadReceived {
        run_id: String,
        kind: String,
        action: String,
        user_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A run advanced to a new stage
    StageEntered {
        run_id: String,
        stage: String,
        timestamp: DateTime<Utc>,
    },

    /// A planned tool call was attempted
    ToolExecuted {
        run_id: String,
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A run reached SUMMARIZED
    RunCompleted {
        run_id: String,
        goals: usize,
        tool_calls: usize,
        failed_calls: usize,
        timestamp: DateTime<Utc>,
    },

    /// A run reached FAILED
    RunFailed {
        run_id: String,
        stage: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for pipeline events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<PipelineEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: PipelineEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PipelineEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
