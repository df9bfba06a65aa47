//! Action modes: how aggressively a plan may act for a goal.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the four closed action modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// The safe fallback for unrecognized classifications.
    #[default]
    Monitor,
    Execute,
    MonitorExecute,
    MonitorInform,
}

impl Mode {
    /// Every mode, in declaration order.
    pub const ALL: [Mode; 4] = [
        Mode::Monitor,
        Mode::Execute,
        Mode::MonitorExecute,
        Mode::MonitorInform,
    ];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Monitor => "MONITOR",
            Mode::Execute => "EXECUTE",
            Mode::MonitorExecute => "MONITOR_EXECUTE",
            Mode::MonitorInform => "MONITOR_INFORM",
        }
    }

    /// Natural-language policy hint handed to the planner.
    pub fn policy_hint(&self) -> &'static str {
        match self {
            Mode::Monitor => {
                "Analyze, assess, observe, validate or check information. \
                 Avoid heavy state-changing actions unless needed."
            }
            Mode::Execute => {
                "Perform direct actions that change system state or trigger backend functionality."
            }
            Mode::MonitorExecute => {
                "First analyze/monitor the situation, then execute appropriate actions based on results."
            }
            Mode::MonitorInform => {
                "Analyze/monitor and then produce a human-readable summary or notification \
                 (e.g., using notify_tool)."
            }
        }
    }

    /// Canonicalize raw model output into a mode.
    ///
    /// Trims whitespace, surrounding quotes/backticks and periods,
    /// then uppercases. Returns `None` when the result is not a known mode.
    pub fn canonicalize(raw: &str) -> Option<Mode> {
        let cleaned = raw
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, '`' | '"' | '\'' | '.'))
            .to_uppercase();
        cleaned.parse().ok()
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown mode '{s}'"))
    }
}
