//! Shared HTTP client for the backend service.
//!
//! Every backend tool issues exactly one `GET` to the configured base URL
//! with a JSON body and an `X-Service-Name` header. Any non-2xx status is a
//! failure; nothing is retried.

use goalflow_config::BackendConfig;
use goalflow_core::error::{Error, ToolError};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Header identifying this service to the backend.
pub const SERVICE_HEADER: &str = "X-Service-Name";

/// A reqwest client bound to one backend endpoint.
pub struct BackendClient {
    base_url: String,
    service_name: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl BackendClient {
    /// Build a client from the `[backend]` config section.
    pub fn new(config: &BackendConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to create backend HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url: config.base_url.clone(),
            service_name: config.service_name.clone(),
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `body` on behalf of `tool_name` and decode the response.
    ///
    /// A success body that is not JSON comes back as `{"raw": "<text>"}`.
    pub async fn call(&self, tool_name: &str, body: &Value) -> Result<Value, ToolError> {
        info!(tool = tool_name, url = %self.base_url, "Calling backend");
        debug!(tool = tool_name, body = %body, "Backend request body");

        let response = self
            .client
            .get(&self.base_url)
            .header(SERVICE_HEADER, &self.service_name)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ToolError::Timeout {
                        tool_name: tool_name.to_string(),
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    ToolError::ExecutionFailed {
                        tool_name: tool_name.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ToolError::ExecutionFailed {
            tool_name: tool_name.to_string(),
            reason: format!("Failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(ToolError::ExecutionFailed {
                tool_name: tool_name.to_string(),
                reason: format!("backend returned HTTP {}: {}", status.as_u16(), text.trim()),
            });
        }

        debug!(tool = tool_name, status = status.as_u16(), "Backend responded");
        Ok(serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "raw": text })))
    }
}
