//! Goal selection: which candidate goals apply to a payload.

use std::sync::Arc;
use goalflow_core::error::{Error, Result};
use goalflow_core::extract::extract_structured_object;
use goalflow_core::provider::{Prompt, TextGenerator};
use goalflow_core::Payload;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Asks the model to pick the applicable subset of a candidate goal list.
pub struct GoalSelector {
    generator: Arc<dyn TextGenerator>,
}

impl GoalSelector {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Select the goals that apply to `payload`.
    ///
    /// The result is always a subsequence of `candidates` (order kept,
    /// duplicates collapsed). An empty result is valid.
    pub async fn select_goals(&self, payload: &Payload, candidates: &[String]) -> Result<Vec<String>> {
        if candidates.is_empty() {
            return Err(Error::InvalidInput(
                "candidate goal list must not be empty".into(),
            ));
        }

        info!(candidates = candidates.len(), "Selecting goals");
        let prompt = build_prompt(payload, candidates);
        let raw = self.generator.generate(&prompt).await?;
        debug!(raw = %raw, "Goal selection raw response");

        let obj = extract_structured_object(&raw)?;
        let chosen = read_chosen_goals(&obj, &raw)?;
        Ok(filter_candidates(chosen, candidates))
    }
}

fn build_prompt(payload: &Payload, candidates: &[String]) -> Prompt {
    let candidates_json =
        serde_json::to_string_pretty(candidates).unwrap_or_else(|_| "[]".into());

    Prompt::user()
        .part("You are a goal selector for a backend orchestration AI.")
        .blank()
        .part("You will receive:")
        .part("- A JSON payload representing a message from another system.")
        .part("- A list of possible goals (strings).")
        .blank()
        .part("Your job:")
        .part("- Choose zero or more goals from the list that apply to this specific payload.")
        .part("- Consider both the semantics of the payload and the wording of each goal.")
        .blank()
        .part("Important:")
        .part("- If it matches none of the goals, return an empty list.")
        .part("- Return the goals exactly as they appear in the list.")
        .part("- Do NOT modify the text.")
        .part("- Do NOT invent new goals.")
        .blank()
        .section("PAYLOAD JSON", payload.to_json_pretty())
        .blank()
        .section("CANDIDATE GOALS", candidates_json)
        .blank()
        .part("Respond with ONLY a JSON object:")
        .part(r#"{ "chosen_goals": ["<one_of_the_candidate_strings>", ...] }"#)
}

/// Read `chosen_goals` (list) or the single-goal `chosen_goal` (string).
fn read_chosen_goals(obj: &Map<String, Value>, raw: &str) -> Result<Vec<Value>> {
    let field = obj.get("chosen_goals").or_else(|| obj.get("chosen_goal"));
    match field {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![Value::String(s.clone())]),
        Some(other) => Err(Error::MalformedResponse {
            raw: raw.to_string(),
            reason: format!("'chosen_goals' must be a list of strings, got {other}"),
        }),
    }
}

fn filter_candidates(chosen: Vec<Value>, candidates: &[String]) -> Vec<String> {
    let mut selected: Vec<String> = Vec::new();
    for item in chosen {
        let Value::String(goal) = item else {
            debug!(entry = %item, "Discarding non-string goal entry");
            continue;
        };
        // Exact match first, so candidates with surrounding whitespace survive.
        let matched = candidates
            .iter()
            .find(|c| **c == goal)
            .or_else(|| candidates.iter().find(|c| c.as_str() == goal.trim()));
        let Some(candidate) = matched else {
            debug!(goal = %goal, "Discarding goal not in candidate list");
            continue;
        };
        if !selected.contains(candidate) {
            selected.push(candidate.clone());
        }
    }
    selected
}
