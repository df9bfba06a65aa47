//! Tool planning: turns goals and modes into proposed tool calls.
//!
//! The planner does not validate tool names or arguments. Anything the
//! model proposes is passed on as a [`PlannedCall`] and judged by the
//! executor, so bad proposals show up in the audit trail rather than
//! failing the run.

use std::sync::Arc;
use goalflow_core::error::{Error, Result};
use goalflow_core::extract::extract_structured_object;
use goalflow_core::mode::Mode;
use goalflow_core::provider::{Prompt, TextGenerator};
use goalflow_core::tool::{PlannedCall, ToolRegistry};
use goalflow_core::Payload;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

pub struct ToolPlanner {
    generator: Arc<dyn TextGenerator>,
}

impl ToolPlanner {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Propose an ordered list of tool calls for the chosen goals.
    ///
    /// `goal_modes` pairs each chosen goal with its classified mode, in
    /// selection order.
    pub async fn plan_calls(
        &self,
        payload: &Payload,
        goal_modes: &[(String, Mode)],
        registry: &ToolRegistry,
    ) -> Result<Vec<PlannedCall>> {
        info!(goals = goal_modes.len(), tools = registry.len(), "Planning tool calls");
        let prompt = build_prompt(payload, goal_modes, registry);
        let raw = self.generator.generate(&prompt).await?;
        debug!(raw = %raw, "Plan raw response");

        let obj = extract_structured_object(&raw)?;
        let calls = parse_plan(&obj, &raw)?;
        info!(planned = calls.len(), "Plan ready");
        Ok(calls)
    }
}

fn build_prompt(payload: &Payload, goal_modes: &[(String, Mode)], registry: &ToolRegistry) -> Prompt {
    let tools: Vec<Value> = registry
        .definitions()
        .into_iter()
        .map(|d| json!({ "name": d.name, "description": d.description }))
        .collect();
    let tools_json = serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".into());

    let goals_text = goal_modes
        .iter()
        .map(|(goal, mode)| format!("- {goal}\n  MODE={mode}: {}", mode.policy_hint()))
        .collect::<Vec<_>>()
        .join("\n");

    Prompt::user()
        .part("You are a backend orchestration agent.")
        .blank()
        .section("PAYLOAD JSON", payload.to_json_pretty())
        .blank()
        .section("AVAILABLE TOOLS", tools_json)
        .blank()
        .section("CHOSEN GOALS AND MODES", goals_text)
        .blank()
        .part("Instructions:")
        .part("- Base your decision only on the payload, the chosen goals, and their modes.")
        .part("- Decide which tools to call (zero or more).")
        .part("- Use multiple tools if appropriate.")
        .part("- Do not invent fields not present in the payload.")
        .part("- If required fields are missing for a tool, omit that tool.")
        .blank()
        .part("Respond with ONLY JSON:")
        .part(r#"{ "tool_calls": [ { "tool": "<tool_name>", "args": { ... } } ] }"#)
}

fn parse_plan(obj: &Map<String, Value>, raw: &str) -> Result<Vec<PlannedCall>> {
    let malformed = |reason: String| Error::MalformedPlan {
        raw: raw.to_string(),
        reason,
    };

    let entries = match obj.get("tool_calls") {
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(malformed(format!("'tool_calls' must be a list, got {other}")));
        }
        None => return Err(malformed("response has no 'tool_calls' list".into())),
    };

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let Value::Object(call) = entry else {
                return Err(malformed(format!("tool_calls[{idx}] is not an object: {entry}")));
            };
            // Non-string names keep their JSON text for the audit trail.
            let tool = match call.get("tool") {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(name)) => name.clone(),
                Some(other) => other.to_string(),
            };
            let args = match call.get("args") {
                None | Some(Value::Null) => Value::Object(Map::new()),
                Some(args) => args.clone(),
            };
            Ok(PlannedCall::new(tool, args))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ScriptedGenerator, air_track_payload, stub_registry};

    fn goal_modes() -> Vec<(String, Mode)> {
        vec![("Monitor tracks and notify me".into(), Mode::MonitorInform)]
    }

    async fn plan(response: &str) -> Result<Vec<PlannedCall>> {
        let generator = Arc::new(ScriptedGenerator::texts(&[response]));
        ToolPlanner::new(generator)
            .plan_calls(&air_track_payload(), &goal_modes(), &stub_registry())
            .await
    }

    #[tokio::test]
    async fn parses_calls_in_order() {
        let calls = plan(
            r#"Here is the plan:
```json
{"tool_calls": [
  {"tool": "check_sensor_gap_tool", "args": {"user_id": "u-42", "incident_id": "T-7"}},
  {"tool": "notify_tool", "args": {"user_id": "u-42", "message": "Track T-7 is WARNING"}}
]}
```"#,
        )
        .await
        .unwrap();

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].tool, "check_sensor_gap_tool");
        assert_eq!(calls[1].args["message"], "Track T-7 is WARNING");
    }

    #[tokio::test]
    async fn empty_plan_is_valid() {
        assert!(plan(r#"{"tool_calls": []}"#).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unregistered_tools_pass_through() {
        let calls = plan(r#"{"tool_calls": [{"tool": "delete_everything", "args": {}}]}"#)
            .await
            .unwrap();
        assert_eq!(calls, vec![PlannedCall::new("delete_everything", json!({}))]);
    }

    #[tokio::test]
    async fn missing_args_default_and_bad_args_kept() {
        let calls = plan(
            r#"{"tool_calls": [{"tool": "notify_tool"}, {"tool": "notify_tool", "args": "u-42"}, {"args": {}}]}"#,
        )
        .await
        .unwrap();
        assert_eq!(calls[0].args, json!({}));
        assert_eq!(calls[1].args, json!("u-42"));
        assert_eq!(calls[2].tool, "");
    }

    #[tokio::test]
    async fn non_string_tool_name_kept_as_json_text() {
        let calls = plan(r#"{"tool_calls": [{"tool": 5}, {"tool": ["notify_tool"]}]}"#)
            .await
            .unwrap();
        assert_eq!(calls[0].tool, "5");
        assert_eq!(calls[1].tool, r#"["notify_tool"]"#);
    }

    #[tokio::test]
    async fn missing_tool_calls_is_malformed_plan() {
        let err = plan(r#"{"calls": []}"#).await.unwrap_err();
        assert!(matches!(err, Error::MalformedPlan { .. }));
        assert_eq!(err.raw_text(), Some(r#"{"calls": []}"#));
    }

    #[tokio::test]
    async fn non_list_tool_calls_is_malformed_plan() {
        let err = plan(r#"{"tool_calls": {"tool": "notify_tool"}}"#).await.unwrap_err();
        assert!(matches!(err, Error::MalformedPlan { .. }));
    }

    #[tokio::test]
    async fn non_object_entry_is_malformed_plan() {
        let err = plan(r#"{"tool_calls": ["notify_tool"]}"#).await.unwrap_err();
        assert!(matches!(err, Error::MalformedPlan { .. }));
    }

    #[tokio::test]
    async fn unparseable_response_is_malformed_response() {
        let err = plan("no plan today").await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn prompt_lists_tools_goals_and_hints() {
        let generator = Arc::new(ScriptedGenerator::texts(&[r#"{"tool_calls": []}"#]));
        ToolPlanner::new(generator.clone())
            .plan_calls(&air_track_payload(), &goal_modes(), &stub_registry())
            .await
            .unwrap();

        let prompt = &generator.rendered_prompts()[0];
        assert!(prompt.contains("=== AVAILABLE TOOLS ==="));
        assert!(prompt.contains("check_sensor_gap_tool"));
        assert!(prompt.contains("notify_tool"));
        assert!(prompt.contains("MODE=MONITOR_INFORM"));
        assert!(prompt.contains(Mode::MonitorInform.policy_hint()));
        assert!(prompt.contains("\"trackId\": \"T-7\""));
    }
}
