//! Error types for the GoalFlow domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; per-call tool failures
//! (`CallError`) are recorded in the audit trail and never fail a run.

use thiserror::Error;

/// The top-level error type for all GoalFlow operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Caller contract violations ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Model output that could not be recovered ---
    #[error("Malformed model response: {reason}\nRaw text:\n{raw}")]
    MalformedResponse { raw: String, reason: String },

    #[error("Malformed tool plan: {reason}\nRaw text:\n{raw}")]
    MalformedPlan { raw: String, reason: String },

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Inbound payload errors ---
    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    // --- Channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The raw model text attached to this error, if any.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Error::MalformedResponse { raw, .. } | Error::MalformedPlan { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Rejection of an inbound payload before it enters the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("Payload is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Payload field '{field}' is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not started: {0}")]
    NotStarted(String),

    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),

    #[error("Channel already started: {0}")]
    AlreadyStarted(String),
}

/// Failure reported by a tool callable.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },
}

/// Failure recorded by the executor for a single planned call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("Unknown tool '{0}'")]
    UnknownTool(String),

    #[error("Argument error: {0}")]
    ArgumentError(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),
}

impl From<ToolError> for CallError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::InvalidArguments(detail) => CallError::ArgumentError(detail),
            other => CallError::ExecutionError(other.to_string()),
        }
    }
}
