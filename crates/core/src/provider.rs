//! Provider and text-generation abstractions.
//!
//! A [`Provider`] knows how to send messages to an LLM backend and get a
//! response back. The pipeline itself never talks to a provider directly:
//! it depends on the narrower [`TextGenerator`] capability (prompt in, raw
//! text out), which keeps every stage testable with a scripted stub.
//!
//! Implementations: Gemini, OpenAI-compatible endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::{Message, Role};

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gemini-2.0-flash", "gpt-4o")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// Every LLM backend implements this trait. Callers invoke `complete()`
/// without knowing which provider is being used.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini", "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError>;

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

/// A structured prompt: a role plus ordered text parts.
///
/// Parts are rendered one per line, so a blank part yields a blank line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub role: Role,
    pub parts: Vec<String>,
}

impl Prompt {
    /// Start an empty user prompt.
    pub fn user() -> Self {
        Self {
            role: Role::User,
            parts: Vec::new(),
        }
    }

    /// Append one part.
    pub fn part(mut self, text: impl Into<String>) -> Self {
        self.parts.push(text.into());
        self
    }

    /// Append a blank separator line.
    pub fn blank(self) -> Self {
        self.part("")
    }

    /// Append a `=== TITLE ===` header followed by a body part.
    pub fn section(self, title: &str, body: impl Into<String>) -> Self {
        self.part(format!("=== {title} ===")).part(body)
    }

    /// Render the prompt as a single text block.
    pub fn render(&self) -> String {
        self.parts.join("\n")
    }

    /// Convert to a provider message.
    pub fn to_message(&self) -> Message {
        Message {
            role: self.role,
            content: self.render(),
        }
    }
}

/// The text-generation capability consumed by the pipeline stages.
///
/// Implementations must return the model's raw text; callers recover any
/// structure through `extract_structured_object`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> std::result::Result<String, ProviderError>;
}
