//! Tool execution with per-call fault isolation.
//!
//! Every planned call produces exactly one [`CallResult`], in plan order.
//! Failures are recorded on the result and never abort the batch.

use std::sync::Arc;
use std::time::Instant;
use chrono::Utc;
use goalflow_core::error::CallError;
use goalflow_core::event::{EventBus, PipelineEvent};
use goalflow_core::tool::{CallResult, PlannedCall, ToolRegistry};
use tracing::{info, warn};

pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    event_bus: Option<Arc<EventBus>>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            event_bus: None,
        }
    }

    /// Publish a `ToolExecuted` event for every call.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Execute `calls` sequentially. Total: never fails, no retries.
    pub async fn execute(&self, run_id: &str, calls: Vec<PlannedCall>) -> Vec<CallResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.execute_one(run_id, call).await);
        }
        results
    }

    async fn execute_one(&self, run_id: &str, call: PlannedCall) -> CallResult {
        info!(tool = %call.tool, args = %call.args, "Executing planned call");
        let started = Instant::now();

        let outcome = match self.registry.get(&call.tool) {
            None => Err(CallError::UnknownTool(call.tool.clone())),
            Some(tool) => tool.execute(&call.args).await.map_err(CallError::from),
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        if let Err(e) = &outcome {
            warn!(tool = %call.tool, duration_ms, "Tool call failed: {e}");
        }

        if let Some(bus) = &self.event_bus {
            bus.publish(PipelineEvent::ToolExecuted {
                run_id: run_id.to_string(),
                tool_name: call.tool.clone(),
                success: outcome.is_ok(),
                duration_ms,
                timestamp: Utc::now(),
            });
        }

        match outcome {
            Ok(value) => CallResult::success(call, value),
            Err(e) => CallResult::failure(call, e),
        }
    }
}
