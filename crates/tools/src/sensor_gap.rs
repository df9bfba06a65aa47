//! Sensor gap check: asks the backend whether sensors cover an incident.

use async_trait::async_trait;
use goalflow_core::error::ToolError;
use goalflow_core::tool::{Tool, parse_arguments};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use crate::backend::BackendClient;

pub struct SensorGapTool {
    backend: Arc<BackendClient>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SensorGapArgs {
    user_id: String,
    incident_id: String,
}

impl SensorGapTool {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for SensorGapTool {
    fn name(&self) -> &str {
        "check_sensor_gap_tool"
    }

    fn description(&self) -> &str {
        "Check sensor coverage and detect any sensor gaps for a specific incident, user and in breach scenarios. \
         Arguments: user_id (string), incident_id (string)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": { "type": "string", "description": "The user the incident belongs to" },
                "incident_id": { "type": "string", "description": "The incident to check coverage for" }
            },
            "required": ["user_id", "incident_id"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: &Value) -> Result<Value, ToolError> {
        let args: SensorGapArgs = parse_arguments(arguments)?;
        self.backend
            .call(
                self.name(),
                &json!({ "userId": args.user_id, "incidentId": args.incident_id }),
            )
            .await
    }
}
