//! `goalflow run`: Process one payload and exit.

use std::path::{Path, PathBuf};
use goalflow_agent::Pipeline;
use goalflow_core::Payload;
use tokio::io::AsyncReadExt;

pub async fn run(
    config_path: Option<&Path>,
    file: Option<PathBuf>,
    payload: Option<String>,
    report: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = match (file, payload) {
        (Some(path), _) => tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        (None, Some(inline)) => inline,
        (None, None) => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    // Reject bad input before touching the provider
    let payload = Payload::from_json(&raw)?;

    let config = super::load_config(config_path)?;
    super::require_api_key(&config)?;
    let pipeline = Pipeline::from_config(&config)?;

    let result = pipeline.run(payload).await?;
    if report {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.summary);
    }

    Ok(())
}
