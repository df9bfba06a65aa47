//! `goalflow listen`: Run the pipeline for every JSON line on stdin.

use std::path::Path;
use std::sync::Arc;
use goalflow_agent::{Pipeline, ReportHandler};
use goalflow_channels::StdinSource;
use goalflow_core::source::PayloadSource;
use tracing::info;

pub async fn run(config_path: Option<&Path>, report: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    super::require_api_key(&config)?;
    let pipeline = Arc::new(Pipeline::from_config(&config)?);

    let source = StdinSource::stdin();
    let rx = source.start().await?;
    info!(
        max_concurrent_runs = config.pipeline.max_concurrent_runs,
        "Listening for payloads on stdin"
    );

    let on_report: ReportHandler = Arc::new(move |result| match result {
        Ok(run) if report => match serde_json::to_string(&run) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("Could not serialize report {}: {e}", run.run_id),
        },
        Ok(run) => println!("[{}] {}", run.run_id, run.summary),
        // Already logged by the pipeline
        Err(_) => {}
    });

    let processed = goalflow_agent::dispatch(
        rx,
        pipeline,
        config.pipeline.max_concurrent_runs,
        on_report,
    )
    .await;

    source.stop().await?;
    info!(processed, "Input closed");
    Ok(())
}
