//! The pipeline orchestrator: one strictly forward pass per payload.
//!
//! ```text
//! RECEIVED → GOALS_SELECTED → MODES_CLASSIFIED → PLANNED → EXECUTED → SUMMARIZED
//!     └──────────────┴──────────────┴──────────────┴──────────┴──→ FAILED
//! ```
//!
//! There is no backtracking: a malformed plan fails the run, it does not
//! trigger re-selection. An empty goal selection skips straight to
//! SUMMARIZED without further model calls.

use std::sync::Arc;
use chrono::Utc;
use goalflow_config::AppConfig;
use goalflow_core::error::Error;
use goalflow_core::event::{EventBus, PipelineEvent};
use goalflow_core::mode::Mode;
use goalflow_core::provider::TextGenerator;
use goalflow_core::tool::{CallResult, PlannedCall, ToolRegistry};
use goalflow_core::Payload;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use tracing::{Instrument, debug, error, info, info_span};

use crate::classifier::ModeClassifier;
use crate::executor::ToolExecutor;
use crate::generator::ProviderGenerator;
use crate::planner::ToolPlanner;
use crate::selector::GoalSelector;
use crate::summarizer::RunSummarizer;

/// Orchestrator states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Received,
    GoalsSelected,
    ModesClassified,
    Planned,
    Executed,
    Summarized,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "RECEIVED",
            Stage::GoalsSelected => "GOALS_SELECTED",
            Stage::ModesClassified => "MODES_CLASSIFIED",
            Stage::Planned => "PLANNED",
            Stage::Executed => "EXECUTED",
            Stage::Summarized => "SUMMARIZED",
            Stage::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal FAILED report: the last stage reached and what went wrong.
#[derive(Debug, thiserror::Error)]
#[error("Run {run_id} failed after {stage}: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    pub run_id: String,
    pub source: Error,
}

/// The audit trail of one successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub payload: Payload,
    #[serde(rename = "goals", serialize_with = "serialize_goal_modes")]
    pub goal_modes: Vec<(String, Mode)>,
    pub planned_calls: Vec<PlannedCall>,
    pub call_results: Vec<CallResult>,
    pub summary: String,
}

impl RunReport {
    pub fn failed_calls(&self) -> usize {
        self.call_results.iter().filter(|r| !r.is_success()).count()
    }
}

fn serialize_goal_modes<S: Serializer>(
    goal_modes: &[(String, Mode)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct GoalMode<'a> {
        goal: &'a str,
        mode: Mode,
    }

    let mut seq = serializer.serialize_seq(Some(goal_modes.len()))?;
    for (goal, mode) in goal_modes {
        seq.serialize_element(&GoalMode { goal, mode: *mode })?;
    }
    seq.end()
}

/// Composes the five stages into one request/response cycle per payload.
///
/// Holds no per-run state; share it across tasks with `Arc<Pipeline>`.
pub struct Pipeline {
    selector: GoalSelector,
    classifier: ModeClassifier,
    planner: ToolPlanner,
    executor: ToolExecutor,
    summarizer: RunSummarizer,
    registry: Arc<ToolRegistry>,
    goals: Vec<String>,
    event_bus: Arc<EventBus>,
}

impl Pipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        registry: Arc<ToolRegistry>,
        goals: Vec<String>,
    ) -> Self {
        Self::with_event_bus(generator, registry, goals, Arc::new(EventBus::default()))
    }

    pub fn with_event_bus(
        generator: Arc<dyn TextGenerator>,
        registry: Arc<ToolRegistry>,
        goals: Vec<String>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            selector: GoalSelector::new(generator.clone()),
            classifier: ModeClassifier::new(generator.clone()),
            planner: ToolPlanner::new(generator.clone()),
            executor: ToolExecutor::new(registry.clone()).with_event_bus(event_bus.clone()),
            summarizer: RunSummarizer::new(generator),
            registry,
            goals,
            event_bus,
        }
    }

    /// Wire the configured provider, the backend tools and the goal list.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let generator = ProviderGenerator::from_config(config)?;
        let registry = goalflow_tools::default_registry(&config.backend)?;
        Ok(Self::new(
            Arc::new(generator),
            Arc::new(registry),
            config.pipeline.goals.clone(),
        ))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn goals(&self) -> &[String] {
        &self.goals
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.event_bus.clone()
    }

    /// Run the pipeline against the configured candidate goals.
    pub async fn run(&self, payload: Payload) -> Result<RunReport, PipelineError> {
        self.run_with_goals(payload, &self.goals).await
    }

    /// Run the pipeline against an explicit candidate goal list.
    pub async fn run_with_goals(
        &self,
        payload: Payload,
        candidates: &[String],
    ) -> Result<RunReport, PipelineError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!(
            "run",
            run_id = %run_id,
            kind = payload.kind(),
            action = payload.action(),
        );

        let mut stage = Stage::Received;
        let result = self
            .drive(&run_id, payload, candidates, &mut stage)
            .instrument(span)
            .await;

        match result {
            Ok(report) => {
                info!(
                    run_id = %run_id,
                    goals = report.goal_modes.len(),
                    tool_calls = report.call_results.len(),
                    failed_calls = report.failed_calls(),
                    "Run summarized"
                );
                self.event_bus.publish(PipelineEvent::RunCompleted {
                    run_id: run_id.clone(),
                    goals: report.goal_modes.len(),
                    tool_calls: report.call_results.len(),
                    failed_calls: report.failed_calls(),
                    timestamp: Utc::now(),
                });
                Ok(report)
            }
            Err(source) => {
                error!(run_id = %run_id, stage = %stage, "Run failed: {source}");
                self.event_bus.publish(PipelineEvent::RunFailed {
                    run_id: run_id.clone(),
                    stage: stage.to_string(),
                    error_message: source.to_string(),
                    timestamp: Utc::now(),
                });
                Err(PipelineError {
                    stage,
                    run_id,
                    source,
                })
            }
        }
    }

    async fn drive(
        &self,
        run_id: &str,
        payload: Payload,
        candidates: &[String],
        stage: &mut Stage,
    ) -> Result<RunReport, Error> {
        self.event_bus.publish(PipelineEvent::PayloadReceived {
            run_id: run_id.to_string(),
            kind: payload.kind().to_string(),
            action: payload.action().to_string(),
            user_id: payload.user_id().to_string(),
            timestamp: Utc::now(),
        });
        self.enter(run_id, stage, Stage::Received);

        let goals = self.selector.select_goals(&payload, candidates).await?;
        info!(goals = ?goals, "Goals selected");
        self.enter(run_id, stage, Stage::GoalsSelected);

        if goals.is_empty() {
            let summary = format!(
                "No goals applied to this payload ({}/{} for user {}); no tools were called.",
                payload.kind(),
                payload.action(),
                payload.user_id()
            );
            self.enter(run_id, stage, Stage::Summarized);
            return Ok(RunReport {
                run_id: run_id.to_string(),
                payload,
                goal_modes: Vec::new(),
                planned_calls: Vec::new(),
                call_results: Vec::new(),
                summary,
            });
        }

        let mut goal_modes = Vec::with_capacity(goals.len());
        for goal in goals {
            let mode = self.classifier.classify_mode(&goal).await?;
            info!(goal = %goal, mode = %mode, "Goal classified");
            goal_modes.push((goal, mode));
        }
        self.enter(run_id, stage, Stage::ModesClassified);

        let planned_calls = self
            .planner
            .plan_calls(&payload, &goal_modes, &self.registry)
            .await?;
        self.enter(run_id, stage, Stage::Planned);

        let call_results = self.executor.execute(run_id, planned_calls.clone()).await;
        self.enter(run_id, stage, Stage::Executed);

        let summary = self
            .summarizer
            .summarize(&payload, &goal_modes, &call_results)
            .await?;
        self.enter(run_id, stage, Stage::Summarized);

        Ok(RunReport {
            run_id: run_id.to_string(),
            payload,
            goal_modes,
            planned_calls,
            call_results,
            summary,
        })
    }

    fn enter(&self, run_id: &str, current: &mut Stage, next: Stage) {
        debug!(from = %current, to = %next, "Stage transition");
        *current = next;
        self.event_bus.publish(PipelineEvent::StageEntered {
            run_id: run_id.to_string(),
            stage: next.to_string(),
            timestamp: Utc::now(),
        });
    }
}
