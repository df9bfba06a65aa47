//! Backend tool implementations for GoalFlow.
//!
//! Tools give the pipeline the ability to act on the backend service:
//! check sensor coverage, run decision support, and send notifications.
//! All three share one [`BackendClient`].

pub mod backend;
pub mod decision_support;
pub mod notify;
pub mod sensor_gap;

use std::sync::Arc;
use goalflow_config::BackendConfig;
use goalflow_core::error::Error;
use goalflow_core::tool::ToolRegistry;

pub use backend::BackendClient;
pub use decision_support::DecisionSupportTool;
pub use notify::NotifyTool;
pub use sensor_gap::SensorGapTool;

/// Create the default tool registry with the three backend tools.
pub fn default_registry(config: &BackendConfig) -> Result<ToolRegistry, Error> {
    let backend = Arc::new(BackendClient::new(config)?);

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SensorGapTool::new(backend.clone())));
    registry.register(Box::new(DecisionSupportTool::new(backend.clone())));
    registry.register(Box::new(NotifyTool::new(backend)));
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_lists_backend_tools_in_order() {
        let registry = default_registry(&BackendConfig::default()).unwrap();
        assert_eq!(
            registry.names(),
            vec!["check_sensor_gap_tool", "call_dss_tool", "notify_tool"]
        );
        for def in registry.definitions() {
            assert!(def.description.contains("Arguments:"));
            assert_eq!(def.parameters["type"], "object");
        }
    }
}
