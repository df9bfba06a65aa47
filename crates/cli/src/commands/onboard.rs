//! `goalflow onboard`: First-time setup.

use std::path::Path;
use goalflow_config::AppConfig;

pub async fn run(config_path: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => AppConfig::config_dir().join("config.toml"),
    };

    println!("GoalFlow — First-Time Setup");
    println!("===========================\n");

    if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("Created config directory: {}", dir.display());
        }
    }

    if config_path.exists() && !force {
        println!("Config already exists at: {}", config_path.display());
        println!("   Edit it manually or re-run with --force.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Created config.toml at: {}", config_path.display());
    println!("\nNext steps:");
    println!("   1. Set GEMINI_API_KEY (or add api_key to the config)");
    println!("   2. Point [backend] base_url at your tool backend");
    println!("   3. Run: echo '{{\"type\":\"EVENT\",\"action\":\"AIR_TRACK_UPDATE\",\"userId\":\"u1\"}}' | goalflow run\n");

    Ok(())
}
