//! Shared test helpers for pipeline stage tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use async_trait::async_trait;
use goalflow_core::error::{ProviderError, ToolError};
use goalflow_core::message::Message;
use goalflow_core::provider::{
    Prompt, Provider, ProviderRequest, ProviderResponse, TextGenerator, Usage,
};
use goalflow_core::tool::{Tool, ToolRegistry};
use goalflow_core::Payload;
use serde_json::{Value, json};

/// A generator that returns a sequence of scripted responses.
///
/// Each call to `generate` pops the next response and records the prompt.
/// Panics if more calls are made than responses provided.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Script plain text responses.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Rendered text of every prompt received, in order.
    pub fn rendered_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().iter().map(Prompt::render).collect()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError> {
        let mut prompts = self.prompts.lock().unwrap();
        let mut responses = self.responses.lock().unwrap();
        let call = prompts.len();
        prompts.push(prompt.clone());
        match responses.pop_front() {
            Some(response) => response,
            None => panic!("ScriptedGenerator: no more responses (call #{call})"),
        }
    }
}

/// A mock provider that returns a sequence of scripted completions.
pub struct SequentialMockProvider {
    responses: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(make_text_response(t))).collect())
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("SequentialMockProvider: no more responses"))
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// An in-process stand-in for a backend tool. Requires a string `user_id`
/// and rejects anything else; fails when `user_id` is "unreachable".
pub struct StubTool {
    name: &'static str,
}

impl StubTool {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct StubArgs {
    user_id: String,
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Stub backend tool. Arguments: user_id (string), message (optional string)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": { "type": "string" },
                "message": { "type": "string" }
            },
            "required": ["user_id"]
        })
    }

    async fn execute(&self, arguments: &Value) -> Result<Value, ToolError> {
        let args: StubArgs = goalflow_core::tool::parse_arguments(arguments)?;
        if args.user_id == "unreachable" {
            return Err(ToolError::ExecutionFailed {
                tool_name: self.name.to_string(),
                reason: "connection refused".into(),
            });
        }
        Ok(json!({ "status": "ok", "userId": args.user_id, "message": args.message }))
    }
}

/// A registry with `check_sensor_gap_tool` and `notify_tool` stubs.
pub fn stub_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(StubTool::new("check_sensor_gap_tool")));
    registry.register(Box::new(StubTool::new("notify_tool")));
    registry
}

/// The air track payload used across stage tests.
pub fn air_track_payload() -> Payload {
    Payload::from_json(
        r#"{"type":"EVENT","action":"AIR_TRACK_UPDATE","userId":"u-42","data":{"trackId":"T-7","state":"WARNING"}}"#,
    )
    .unwrap()
}
