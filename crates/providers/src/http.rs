//! Response handling shared by the HTTP providers.

use goalflow_core::error::ProviderError;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Seconds to back off when the API does not say.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

pub(crate) fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Map the status to a [`ProviderError`] or decode the JSON body.
pub(crate) async fn decode<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status().as_u16();
    match status {
        200 => response.json().await.map_err(|e| ProviderError::ApiError {
            status_code: 200,
            message: format!("Failed to parse response: {e}"),
        }),
        429 => {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            Err(ProviderError::RateLimited { retry_after_secs })
        }
        401 | 403 => Err(ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        )),
        _ => {
            let message = response.text().await.unwrap_or_default();
            warn!(provider, status, body = %message, "Provider returned error");
            Err(ProviderError::ApiError {
                status_code: status,
                message,
            })
        }
    }
}
