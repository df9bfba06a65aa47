//! Notification tool: sends a notification or log entry for a user.

use async_trait::async_trait;
use goalflow_core::error::ToolError;
use goalflow_core::tool::{Tool, parse_arguments};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use crate::backend::BackendClient;

pub struct NotifyTool {
    backend: Arc<BackendClient>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NotifyArgs {
    user_id: String,
    message: String,
}

impl NotifyTool {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for NotifyTool {
    fn name(&self) -> &str {
        "notify_tool"
    }

    fn description(&self) -> &str {
        "Always monitor and send a notification or log entry associated with a user. \
         Arguments: user_id (string), message (string)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": { "type": "string", "description": "The user to notify" },
                "message": { "type": "string", "description": "Notification text" }
            },
            "required": ["user_id", "message"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: &Value) -> Result<Value, ToolError> {
        let args: NotifyArgs = parse_arguments(arguments)?;
        self.backend
            .call(self.name(), &json!({ "userId": args.user_id, "message": args.message }))
            .await
    }
}
