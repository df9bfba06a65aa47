//! Concurrent dispatch of payloads from a source.
//!
//! One pipeline run per payload, each on its own task. A semaphore bounds
//! how many runs are in flight; runs share nothing mutable.

use std::sync::Arc;
use goalflow_core::Payload;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::pipeline::{Pipeline, PipelineError, RunReport};

/// Called once per finished run, from the run's task.
pub type ReportHandler = Arc<dyn Fn(Result<RunReport, PipelineError>) + Send + Sync>;

/// Drain `rx`, running up to `max_concurrent` pipelines at once.
///
/// Returns when the source closes and every started run has finished.
/// Returns the number of payloads dispatched.
pub async fn dispatch(
    mut rx: mpsc::Receiver<Payload>,
    pipeline: Arc<Pipeline>,
    max_concurrent: usize,
    on_report: ReportHandler,
) -> usize {
    let permits = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut runs = JoinSet::new();
    let mut dispatched = 0usize;

    while let Some(payload) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        dispatched += 1;
        debug!(in_flight = runs.len() + 1, "Dispatching payload");

        let pipeline = pipeline.clone();
        let on_report = on_report.clone();
        runs.spawn(async move {
            let result = pipeline.run(payload).await;
            drop(permit);
            on_report(result);
        });

        // Reap finished runs so the set does not grow unbounded.
        while let Some(joined) = runs.try_join_next() {
            if let Err(e) = joined {
                warn!("Pipeline task panicked: {e}");
            }
        }
    }

    while let Some(joined) = runs.join_next().await {
        if let Err(e) = joined {
            warn!("Pipeline task panicked: {e}");
        }
    }
    dispatched
}
