//! Provider-backed text generation.
//!
//! Adapts any [`Provider`] to the narrow [`TextGenerator`] capability the
//! pipeline stages consume: one prompt in, the model's raw text out.

use std::sync::Arc;
use async_trait::async_trait;
use goalflow_config::AppConfig;
use goalflow_core::error::ProviderError;
use goalflow_core::provider::{Prompt, Provider, ProviderRequest, TextGenerator};
use tracing::debug;

/// A [`TextGenerator`] that sends each prompt as a single-message request.
pub struct ProviderGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ProviderGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
        }
    }

    /// Set the max tokens per response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Build the generator for the configured default provider.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let router = goalflow_providers::build_from_config(config)?;
        let provider = router.default().ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "default provider '{}' is not registered",
                router.default_name()
            ))
        })?;
        let model = goalflow_providers::resolve_model(config);

        Ok(Self::new(provider, model, config.default_temperature)
            .with_max_tokens(config.default_max_tokens))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for ProviderGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![prompt.to_message()],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.provider.complete(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                provider = self.provider.name(),
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Generation complete"
            );
        }
        Ok(response.message.content)
    }
}
