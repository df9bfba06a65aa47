pub mod listen;
pub mod onboard;
pub mod run;
pub mod serve;
pub mod tools;

use std::path::Path;
use goalflow_config::AppConfig;

pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Fail early with setup instructions when no API key is available.
pub(crate) fn require_api_key(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_api_key() || config.default_provider == "ollama" {
        return Ok(());
    }
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    GEMINI_API_KEY=...     (default provider)");
    eprintln!("    OPENAI_API_KEY=...     (with GOALFLOW_PROVIDER=openai)");
    eprintln!("    GOALFLOW_API_KEY=...   (generic)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}
