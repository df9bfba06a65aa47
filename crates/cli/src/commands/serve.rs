//! `goalflow serve`: Start the HTTP ingest gateway.

use std::path::Path;

pub async fn run(config_path: Option<&Path>, port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;
    super::require_api_key(&config)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("GoalFlow Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Signed pushes: {}", config.gateway.shared_secret.is_some());
    println!("   Goals: {}", config.pipeline.goals.len());

    goalflow_gateway::start(config).await?;

    Ok(())
}
