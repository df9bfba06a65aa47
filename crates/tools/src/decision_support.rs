//! Decision support (DSS): runs the backend's action plan for a scenario.

use async_trait::async_trait;
use goalflow_core::error::ToolError;
use goalflow_core::tool::{Tool, parse_arguments};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use crate::backend::BackendClient;

pub struct DecisionSupportTool {
    backend: Arc<BackendClient>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DecisionSupportArgs {
    user_id: String,
    scenario: String,
}

impl DecisionSupportTool {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for DecisionSupportTool {
    fn name(&self) -> &str {
        "call_dss_tool"
    }

    fn description(&self) -> &str {
        "Run the decision support system (DSS) for a given user and only when in breach scenario for execution purpose. \
         Arguments: user_id (string), scenario (string)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": { "type": "string", "description": "The user to run DSS for" },
                "scenario": { "type": "string", "description": "The breach scenario to act on" }
            },
            "required": ["user_id", "scenario"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: &Value) -> Result<Value, ToolError> {
        let args: DecisionSupportArgs = parse_arguments(arguments)?;
        self.backend
            .call(self.name(), &json!({ "userId": args.user_id, "scenario": args.scenario }))
            .await
    }
}
