//! Tool trait: the abstraction over backend capabilities.
//!
//! Tools are what let the pipeline act on the world: check sensor coverage,
//! run decision support, send notifications. The registry is built once at
//! process start and shared read-only (`Arc<ToolRegistry>`) across runs.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use crate::error::{CallError, ToolError};

/// A tool definition shown to the planner so it knows what it may propose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: Value,
}

/// The core Tool trait.
///
/// Each backend tool implements this trait and declares its argument
/// contract twice: as a JSON schema for humans and models, and as a typed
/// argument struct decoded with [`parse_arguments`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "notify_tool").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the planner).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given keyword arguments.
    async fn execute(&self, arguments: &Value) -> std::result::Result<Value, ToolError>;

    /// Convert this tool into a ToolDefinition.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Decode keyword arguments into a typed argument struct.
///
/// Argument structs use `#[serde(deny_unknown_fields)]`, so wrong names,
/// missing arguments and wrong types all surface as
/// [`ToolError::InvalidArguments`].
pub fn parse_arguments<T: DeserializeOwned>(arguments: &Value) -> std::result::Result<T, ToolError> {
    if !arguments.is_object() {
        return Err(ToolError::InvalidArguments(format!(
            "arguments must be a JSON object, got {arguments}"
        )));
    }
    serde_json::from_value(arguments.clone()).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// A registry of available tools.
///
/// Iteration order is registration order, so planner prompts are stable.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Replaces any existing tool with the same name in place.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    /// Get all tool definitions.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A tool invocation proposed by the planner. Untrusted until executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedCall {
    /// Name of the tool to invoke
    pub tool: String,

    /// Keyword arguments
    #[serde(default = "empty_args")]
    pub args: Value,
}

fn empty_args() -> Value {
    Value::Object(serde_json::Map::new())
}

impl PlannedCall {
    pub fn new(tool: impl Into<String>, args: Value) -> Self {
        Self {
            tool: tool.into(),
            args,
        }
    }
}

/// The audited outcome of one planned call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    pub tool: String,
    pub args: Value,
    pub outcome: std::result::Result<Value, CallError>,
}

impl CallResult {
    pub fn success(call: PlannedCall, value: Value) -> Self {
        Self {
            tool: call.tool,
            args: call.args,
            outcome: Ok(value),
        }
    }

    pub fn failure(call: PlannedCall, error: CallError) -> Self {
        Self {
            tool: call.tool,
            args: call.args,
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&CallError> {
        self.outcome.as_ref().err()
    }

    /// The `result` field of the audit trail: the value, or `{"error": ...}`.
    pub fn result_value(&self) -> Value {
        match &self.outcome {
            Ok(value) => value.clone(),
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        }
    }
}

impl Serialize for CallResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CallResult", 3)?;
        state.serialize_field("tool", &self.tool)?;
        state.serialize_field("args", &self.args)?;
        state.serialize_field("result", &self.result_value())?;
        state.end()
    }
}
