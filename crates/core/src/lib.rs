//! # GoalFlow Core
//!
//! Domain types, traits, and error definitions for the GoalFlow decision
//! pipeline. This crate has **zero framework dependencies**; it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (LLM provider, text generation, tool callable)
//! is defined as a trait here. Implementations live in their respective
//! crates. This enables:
//! - Swapping implementations via configuration
//! - Deterministic testing with scripted stubs
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod event;
pub mod extract;
pub mod message;
pub mod mode;
pub mod payload;
pub mod provider;
pub mod source;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{CallError, ChannelError, Error, PayloadError, ProviderError, Result, ToolError};
pub use event::{EventBus, PipelineEvent};
pub use extract::extract_structured_object;
pub use message::{Message, Role};
pub use mode::Mode;
pub use payload::Payload;
pub use provider::{Prompt, Provider, ProviderRequest, ProviderResponse, TextGenerator};
pub use source::PayloadSource;
pub use tool::{CallResult, PlannedCall, Tool, ToolDefinition, ToolRegistry};
