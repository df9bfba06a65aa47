//! Mode classification: maps one goal to one of the four action modes.

use std::sync::Arc;
use goalflow_core::error::Result;
use goalflow_core::mode::Mode;
use goalflow_core::provider::{Prompt, TextGenerator};
use tracing::{debug, warn};

pub struct ModeClassifier {
    generator: Arc<dyn TextGenerator>,
}

impl ModeClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Classify `goal`. Unrecognized model output degrades to MONITOR;
    /// only a failed generation call is an error.
    pub async fn classify_mode(&self, goal: &str) -> Result<Mode> {
        let raw = self.generator.generate(&build_prompt(goal)).await?;
        debug!(goal, raw = %raw, "Mode classification raw response");

        match Mode::canonicalize(&raw) {
            Some(mode) => Ok(mode),
            None => {
                warn!(goal, raw = %raw.trim(), "Unrecognized mode, defaulting to MONITOR");
                Ok(Mode::Monitor)
            }
        }
    }
}

fn build_prompt(goal: &str) -> Prompt {
    let mut prompt = Prompt::user()
        .part("You are a goal interpreter for a backend orchestration AI.")
        .part("You will receive a single human-written goal.")
        .blank()
        .part("You must classify it into exactly one of these modes:");
    for mode in Mode::ALL {
        prompt = prompt.part(format!("- {mode}"));
    }
    prompt
        .blank()
        .part("Examples:")
        .part("- 'Monitor all sensor states' -> MONITOR")
        .part("- 'Change all Warning States to RED' -> EXECUTE")
        .part("- 'Check for sensor gap and if exist, change warning state to red' -> MONITOR_EXECUTE")
        .part("- 'Monitor tracks and notify me' -> MONITOR_INFORM")
        .blank()
        .part("Return ONLY the mode name.")
        .blank()
        .part("Goal:")
        .part(goal)
}
