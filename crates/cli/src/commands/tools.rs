//! `goalflow tools`: List the backend tools the planner may propose.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let registry = goalflow_tools::default_registry(&config.backend)?;

    println!("Backend: {}", config.backend.base_url);
    println!();
    for def in registry.definitions() {
        println!("  {}", def.name);
        println!("      {}", def.description);
    }
    println!();
    println!("Candidate goals:");
    for goal in &config.pipeline.goals {
        println!("  - {goal}");
    }

    Ok(())
}
