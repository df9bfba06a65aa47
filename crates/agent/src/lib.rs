//! The decision pipeline: the heart of GoalFlow.
//!
//! Each payload goes through five stages, strictly forward:
//!
//! 1. **Select** the candidate goals that apply to the payload
//! 2. **Classify** each goal into an action mode
//! 3. **Plan** tool calls consistent with the goals and modes
//! 4. **Execute** every planned call, isolating failures per call
//! 5. **Summarize** the run in one human-readable paragraph
//!
//! Stages 1, 2, 3 and 5 consult the model through [`TextGenerator`];
//! structure is always recovered with `extract_structured_object`, never
//! assumed.
//!
//! [`TextGenerator`]: goalflow_core::TextGenerator

pub mod classifier;
pub mod dispatcher;
pub mod executor;
pub mod generator;
pub mod pipeline;
pub mod planner;
pub mod selector;
pub mod summarizer;

pub use classifier::ModeClassifier;
pub use dispatcher::{ReportHandler, dispatch};
pub use executor::ToolExecutor;
pub use generator::ProviderGenerator;
pub use pipeline::{Pipeline, PipelineError, RunReport, Stage};
pub use planner::ToolPlanner;
pub use selector::GoalSelector;
pub use summarizer::RunSummarizer;

#[cfg(test)]
pub(crate) mod test_helpers;
