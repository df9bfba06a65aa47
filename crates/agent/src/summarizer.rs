//! Run summarization: a one-paragraph account of what happened.

use std::sync::Arc;
use goalflow_core::error::Result;
use goalflow_core::mode::Mode;
use goalflow_core::provider::{Prompt, TextGenerator};
use goalflow_core::tool::CallResult;
use goalflow_core::Payload;
use tracing::{debug, warn};

pub struct RunSummarizer {
    generator: Arc<dyn TextGenerator>,
}

impl RunSummarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Summarize a run. Always returns non-empty text on success.
    pub async fn summarize(
        &self,
        payload: &Payload,
        goal_modes: &[(String, Mode)],
        results: &[CallResult],
    ) -> Result<String> {
        let prompt = build_prompt(payload, goal_modes, results);
        let raw = self.generator.generate(&prompt).await?;
        debug!(raw = %raw, "Summary raw response");

        let summary = raw.trim();
        if summary.is_empty() {
            warn!("Model returned an empty summary, using local fallback");
            return Ok(fallback_summary(payload, goal_modes, results));
        }
        Ok(summary.to_string())
    }
}

fn build_prompt(payload: &Payload, goal_modes: &[(String, Mode)], results: &[CallResult]) -> Prompt {
    let goals: Vec<String> = goal_modes
        .iter()
        .map(|(goal, mode)| format!("{goal} (MODE={mode})"))
        .collect();
    let goals_json = serde_json::to_string_pretty(&goals).unwrap_or_else(|_| "[]".into());
    let results_json = serde_json::to_string_pretty(results).unwrap_or_else(|_| "[]".into());

    Prompt::user()
        .part("You are summarizing the result of a backend orchestration run.")
        .blank()
        .part("Original JSON payload:")
        .part(payload.to_json_pretty())
        .blank()
        .part("Goals for this run:")
        .part(goals_json)
        .blank()
        .part("Tool calls and results (as JSON):")
        .part(results_json)
        .blank()
        .part("In a concise paragraph:")
        .part("- Explain which tools were called and why.")
        .part("- Mention any important results or errors.")
        .part("- Mention if any goals could not be satisfied due to missing data.")
}

/// Rendered locally when the model has nothing to say.
pub(crate) fn fallback_summary(
    payload: &Payload,
    goal_modes: &[(String, Mode)],
    results: &[CallResult],
) -> String {
    let failed = results.iter().filter(|r| !r.is_success()).count();
    format!(
        "Processed {}/{} for user {}: {} goal(s) applied, {} tool call(s) made, {} failed.",
        payload.kind(),
        payload.action(),
        payload.user_id(),
        goal_modes.len(),
        results.len(),
        failed
    )
}
